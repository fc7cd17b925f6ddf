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

//! Controller error types.
//!
//! Connectivity, authentication and generic request failures are kept apart
//! so the command layer can decide between lenient and strict handling.

use thiserror::Error;

/// Main error type for the run controller
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Backend unreachable
    #[error("No connection to backend: {0}")]
    NoConnection(String),

    /// Token rejected by the backend (HTTP 401/403)
    #[error("Invalid or expired API token")]
    InvalidToken,

    /// Any other failed request
    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    /// Response body did not match the wire model
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// Finding name is unknown in the project
    #[error("{name} not found in project: {project}")]
    NotFound { name: String, project: String },

    /// Reports for the finding exist but none carries a parseable timestamp
    #[error("No report of {name} in project {project} has a valid timestamp")]
    NoValidTimestamp { name: String, project: String },

    /// Backend record is missing structure needed for translation
    #[error("Malformed finding data: {0}")]
    MalformedData(String),

    /// Project reference in none of the accepted shapes
    #[error("Invalid project reference: {0:?}")]
    InvalidProject(String),

    /// Unknown severity level name
    #[error("Invalid severity level: {0:?} (expected LOW, MEDIUM, HIGH or CRITICAL)")]
    InvalidSeverity(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O Error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControllerError {
    /// True when the backend could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ControllerError::NoConnection(_))
    }

    /// Get user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ControllerError::NoConnection(_) => "No connection to the fuzzing backend".to_string(),
            ControllerError::InvalidToken => {
                "Please log in with a valid API access token".to_string()
            }
            ControllerError::Request { status, .. } => {
                format!("The fuzzing backend rejected the request (HTTP {})", status)
            }
            ControllerError::Decode(_) => "Unexpected response from the fuzzing backend".to_string(),
            ControllerError::NotFound { .. }
            | ControllerError::NoValidTimestamp { .. }
            | ControllerError::InvalidProject(_)
            | ControllerError::InvalidSeverity(_)
            | ControllerError::Configuration(_) => self.to_string(),
            ControllerError::MalformedData(_) => {
                "The finding returned by the backend is incomplete".to_string()
            }
            ControllerError::Io(_) => "Internal system error".to_string(),
        }
    }
}
