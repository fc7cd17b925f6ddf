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

//! Wire models for the fuzzing backend.
//!
//! Pure data structures mirroring the JSON documents exchanged with the
//! backend. They carry no I/O and no behaviour beyond classification helpers.

use serde::{Deserialize, Serialize};

use crate::engine_core::constants::status;

/// A fuzz test selected for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct FuzzTest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<Job>,
}

impl FuzzTest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Vec::new(),
        }
    }
}

/// Backend job spawned for a fuzz test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Job {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nid: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub job_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub config: String,
}

/// Run-creation request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RunRequest {
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fuzz_tests: Vec<FuzzTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
}

/// Navigation link returned alongside resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Link {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub href: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rel: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
}

/// A remote fuzzing execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Run {
    #[serde(default)]
    pub nid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fuzz_tests: Vec<FuzzTest>,
}

/// Response to a run-creation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RunResponse {
    #[serde(default)]
    pub run: Option<Run>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Minimal run record returned by the status endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatusRecord {
    #[serde(default)]
    pub nid: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatusResponse {
    #[serde(default)]
    pub run: RunStatusRecord,
}

/// Interpretation of the open-ended backend status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// `finished` or `SUCCEEDED`
    Finished,
    /// `cancelled`
    Cancelled,
    /// `STOPPED`: the backend ended the run before its configured duration
    Stopped,
    /// No terminal value yet; carries the raw status (possibly empty)
    Running(String),
}

impl RunStatus {
    pub fn classify(raw: &str) -> Self {
        match raw {
            status::FINISHED | status::SUCCEEDED => RunStatus::Finished,
            status::CANCELLED => RunStatus::Cancelled,
            status::STOPPED => RunStatus::Stopped,
            other => RunStatus::Running(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running(_))
    }
}

impl RunStatusResponse {
    pub fn status(&self) -> RunStatus {
        RunStatus::classify(&self.run.status)
    }
}

/// Project entry from the project listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_organization_name: String,
}

/// Envelope used by every finding listing endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingList {
    #[serde(default)]
    pub findings: Vec<RemoteFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// One backend report of a finding.
///
/// Several reports can share a `display_name`; the reconciler picks the
/// latest one by `timestamp`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RemoteFinding {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub fuzz_target: String,
    #[serde(default)]
    pub fuzzing_run: String,
    #[serde(default)]
    pub campaign_run: String,
    #[serde(default)]
    pub error_report: Option<ErrorReport>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fuzz_target_display_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_nid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub run_nid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_nid: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stacktrace: Vec<StacktraceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct StacktraceEntry {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub line: i64,
    #[serde(default)]
    pub column: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ErrorReport {
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub details: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub error_type: String,
    #[serde(
        default,
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub input_data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugging_info: Option<DebuggingInfo>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub human_readable_input: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DebuggingInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub executable_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run_arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub break_points: Vec<BreakPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct BreakPoint {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FindingLocation>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct FindingLocation {
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EnvironmentVariable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Byte payloads travel as standard base64 strings.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?;
        match encoded {
            None => Ok(Vec::new()),
            Some(s) => STANDARD.decode(s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_classification() {
        assert_eq!(RunStatus::classify("finished"), RunStatus::Finished);
        assert_eq!(RunStatus::classify("SUCCEEDED"), RunStatus::Finished);
        assert_eq!(RunStatus::classify("cancelled"), RunStatus::Cancelled);
        assert_eq!(RunStatus::classify("STOPPED"), RunStatus::Stopped);
        assert_eq!(
            RunStatus::classify("RUNNING"),
            RunStatus::Running("RUNNING".to_string())
        );
        assert!(!RunStatus::classify("").is_terminal());
        // status strings are case sensitive on the wire
        assert!(!RunStatus::classify("Finished").is_terminal());
    }

    #[test]
    fn test_finding_decodes_base64_input() {
        let json = serde_json::json!({
            "display_name": "noisy_bat",
            "timestamp": "2024-01-02T03:04:05Z",
            "error_report": {
                "logs": [],
                "details": "heap overflow",
                "input_data": "aGVsbG8="
            }
        });
        let finding: RemoteFinding = serde_json::from_value(json).unwrap();
        let report = finding.error_report.unwrap();
        assert_eq!(report.input_data, b"hello");
        assert!(report.debugging_info.is_none());
    }

    #[test]
    fn test_status_tolerates_missing_fields() {
        let status: RunStatusResponse =
            serde_json::from_str(r#"{"run":{"status":"RUNNING"}}"#).unwrap();
        assert!(status.run.nid.is_empty());
        assert_eq!(status.status(), RunStatus::Running("RUNNING".to_string()));

        let empty: RunStatusResponse = serde_json::from_str("{}").unwrap();
        assert!(!empty.status().is_terminal());
    }

    #[test]
    fn test_finding_tolerates_null_input() {
        let json = serde_json::json!({
            "display_name": "noisy_bat",
            "error_report": { "input_data": null }
        });
        let finding: RemoteFinding = serde_json::from_value(json).unwrap();
        assert!(finding.error_report.unwrap().input_data.is_empty());
    }

    #[test]
    fn test_run_request_omits_empty_revision() {
        let req = RunRequest {
            image: "registry/fuzz:abc".to_string(),
            fuzz_tests: vec![FuzzTest::named("com.example.FuzzTestCase::myFuzzTest")],
            git_commit: None,
            git_branch: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("git_commit").is_none());
        assert_eq!(
            value["fuzz_tests"][0]["name"],
            "com.example.FuzzTestCase::myFuzzTest"
        );
        assert!(value["fuzz_tests"][0].get("jobs").is_none());
    }
}
