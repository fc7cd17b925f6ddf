// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Local finding representation.
//!
//! This is the shape the storage layer persists. The reconciler converts
//! backend reports into it and back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub function: String,
    pub source_file: String,
    pub line: u32,
    pub column: u32,
}

impl StackFrame {
    /// `file:line:column`
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.source_file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFinding {
    pub origin: String,
    pub name: String,
    pub error_type: String,
    #[serde(default)]
    pub input_data: Vec<u8>,
    #[serde(default)]
    pub human_readable_input: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub stack_trace: Vec<StackFrame>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub fuzz_test: String,
}

impl LocalFinding {
    /// Summary columns shown in finding tables.
    ///
    /// The first column is the short description: the details when present,
    /// otherwise the error type. The second is the innermost stack frame
    /// location, if any.
    pub fn short_description_columns(&self) -> Vec<String> {
        let description = if self.details.trim().is_empty() {
            self.error_type.clone()
        } else {
            self.details.trim().to_string()
        };

        let mut columns = vec![description];
        if let Some(frame) = self.stack_trace.first() {
            columns.push(frame.location());
        }
        columns
    }
}
