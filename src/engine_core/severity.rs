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

//! Severity levels and the error-id classifier.
//!
//! Levels form a closed, totally ordered enum. The default table covers the
//! error ids emitted by the common sanitizers and JVM detectors; deployments
//! can extend it with a YAML file of `error_id: LEVEL` pairs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::engine_core::errors::ControllerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 4] = [
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
        SeverityLevel::Critical,
    ];

    /// Level assigned when an error id cannot be classified.
    pub const UNRESOLVED_DEFAULT: SeverityLevel = SeverityLevel::Medium;

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "LOW",
            SeverityLevel::Medium => "MEDIUM",
            SeverityLevel::High => "HIGH",
            SeverityLevel::Critical => "CRITICAL",
        }
    }

    /// Inclusive-upward threshold check.
    pub fn meets(&self, threshold: SeverityLevel) -> bool {
        *self >= threshold
    }
}

impl FromStr for SeverityLevel {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SeverityLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ControllerError::InvalidSeverity(s.to_string()))
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result. `resolved == false` means the default was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Severity {
    pub level: SeverityLevel,
    pub resolved: bool,
}

/// Maps opaque error ids to severity levels.
pub trait SeverityClassifier: Send + Sync {
    fn classify(&self, error_id: &str) -> Option<SeverityLevel>;
}

/// Lookup table classifier.
#[derive(Debug, Clone, Default)]
pub struct SeverityTable {
    levels: HashMap<String, SeverityLevel>,
}

/// Illustrative defaults keyed by common sanitizer and detector error ids.
/// The backend's own error-id catalogue is not shipped with the client, so
/// deployments are expected to override or extend these through the YAML
/// table named by `FUZZRUN_SEVERITY_TABLE`.
const BUILTIN_LEVELS: &[(&str, SeverityLevel)] = &[
    ("heap_buffer_overflow", SeverityLevel::Critical),
    ("stack_buffer_overflow", SeverityLevel::Critical),
    ("global_buffer_overflow", SeverityLevel::Critical),
    ("heap_use_after_free", SeverityLevel::Critical),
    ("double_free", SeverityLevel::Critical),
    ("remote_code_execution", SeverityLevel::Critical),
    ("os_command_injection", SeverityLevel::Critical),
    ("sql_injection", SeverityLevel::Critical),
    ("ldap_injection", SeverityLevel::High),
    ("xpath_injection", SeverityLevel::High),
    ("server_side_request_forgery", SeverityLevel::High),
    ("path_traversal", SeverityLevel::High),
    ("regex_injection", SeverityLevel::High),
    ("stack_use_after_return", SeverityLevel::High),
    ("invalid_free", SeverityLevel::High),
    ("segmentation_fault", SeverityLevel::High),
    ("undefined_behavior", SeverityLevel::Medium),
    ("integer_overflow", SeverityLevel::Medium),
    ("null_dereference", SeverityLevel::Medium),
    ("uncaught_exception", SeverityLevel::Medium),
    ("memory_leak", SeverityLevel::Low),
    ("out_of_memory", SeverityLevel::Low),
    ("timeout", SeverityLevel::Low),
    ("slow_input", SeverityLevel::Low),
];

impl SeverityTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the built-in error ids.
    pub fn builtin() -> Self {
        let levels = BUILTIN_LEVELS
            .iter()
            .map(|(id, level)| (id.to_string(), *level))
            .collect();
        Self { levels }
    }

    pub fn insert(&mut self, error_id: impl Into<String>, level: SeverityLevel) {
        self.levels.insert(error_id.into(), level);
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Merge `error_id: LEVEL` entries from YAML, overriding existing ids.
    pub fn extend_from_yaml(&mut self, yaml: &str) -> Result<usize, ControllerError> {
        let entries: HashMap<String, String> = serde_yaml_ng::from_str(yaml).map_err(|e| {
            ControllerError::Configuration(format!("Invalid severity table: {}", e))
        })?;

        let count = entries.len();
        for (id, raw) in entries {
            let level = raw.parse::<SeverityLevel>()?;
            self.levels.insert(id, level);
        }
        Ok(count)
    }

    /// Built-in table extended with the entries of a YAML file.
    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let content = std::fs::read_to_string(path)?;
        let mut table = Self::builtin();
        let added = table.extend_from_yaml(&content)?;
        tracing::debug!(path = %path.display(), added, "Loaded severity table");
        Ok(table)
    }
}

impl SeverityClassifier for SeverityTable {
    fn classify(&self, error_id: &str) -> Option<SeverityLevel> {
        if error_id.is_empty() {
            return None;
        }
        self.levels.get(error_id).copied()
    }
}
