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

//! Finding reconciliation.
//!
//! The backend may emit several reports under one display name (for example
//! after re-triage). Reconciliation keeps the report with the latest
//! parseable timestamp and converts between backend and local shapes.
//!
//! Reports with unparseable timestamps never win a comparison. When every
//! candidate for a name is undated, a lookup fails with
//! [`ControllerError::NoValidTimestamp`] instead of picking one by position.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::engine_core::constants::finding::REMOTE_ORIGIN;
use crate::engine_core::errors::ControllerError;
use crate::engine_core::finding::{LocalFinding, StackFrame};
use crate::engine_core::models::{
    BreakPoint, DebuggingInfo, ErrorReport, FindingLocation, RemoteFinding,
};
use crate::engine_core::traits::BackendTransport;
use crate::engine_core::types::ProjectId;
use crate::utils::time::{parse_rfc3339, to_rfc3339};

/// Outcome of selecting the latest report for one display name.
#[derive(Debug, PartialEq)]
pub enum LatestReport<'a> {
    Found(&'a RemoteFinding),
    /// No report carries the name.
    Missing,
    /// Reports exist but none has a parseable timestamp.
    Undated,
}

/// Latest dated report among `reports` named `name`. Ties keep the first.
pub fn latest_report<'a>(reports: &'a [RemoteFinding], name: &str) -> LatestReport<'a> {
    pick_latest(reports.iter().filter(|r| r.display_name == name))
}

fn pick_latest<'a, I>(candidates: I) -> LatestReport<'a>
where
    I: IntoIterator<Item = &'a RemoteFinding>,
{
    let mut best: Option<(DateTime<Utc>, &'a RemoteFinding)> = None;
    let mut seen = false;

    for report in candidates {
        seen = true;
        let Some(ts) = parse_rfc3339(&report.timestamp) else {
            debug!(
                name = %report.display_name,
                nid = %report.nid,
                timestamp = %report.timestamp,
                "Skipping finding report with unparseable timestamp"
            );
            continue;
        };
        match best {
            Some((current, _)) if ts <= current => {}
            _ => best = Some((ts, report)),
        }
    }

    match (best, seen) {
        (Some((_, report)), _) => LatestReport::Found(report),
        (None, true) => LatestReport::Undated,
        (None, false) => LatestReport::Missing,
    }
}

/// One report per display name, in order of first appearance.
///
/// A name whose reports are all undated keeps every report so that nothing
/// the backend found is hidden.
pub fn collapse(reports: Vec<RemoteFinding>) -> Vec<RemoteFinding> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<RemoteFinding>> = HashMap::new();

    for report in reports {
        let key = report.display_name.clone();
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(report);
    }

    let mut collapsed = Vec::with_capacity(order.len());
    for name in order {
        let Some(group) = groups.remove(&name) else {
            continue;
        };
        if group.len() == 1 {
            collapsed.extend(group);
            continue;
        }
        match pick_latest(group.iter()) {
            LatestReport::Found(latest) => collapsed.push(latest.clone()),
            LatestReport::Undated | LatestReport::Missing => {
                warn!(
                    name = %name,
                    reports = group.len(),
                    "No finding report has a valid timestamp, keeping all"
                );
                collapsed.extend(group);
            }
        }
    }
    collapsed
}

/// Convert a backend report to the local representation.
pub fn remote_to_local(report: &RemoteFinding) -> Result<LocalFinding, ControllerError> {
    let created_at = parse_rfc3339(&report.timestamp).ok_or_else(|| {
        ControllerError::MalformedData(format!(
            "Could not parse timestamp {:?} of {}",
            report.timestamp, report.display_name
        ))
    })?;

    let error_report = report.error_report.as_ref().ok_or_else(|| {
        ControllerError::MalformedData(format!("{} has no error report", report.display_name))
    })?;
    let debugging_info = error_report.debugging_info.as_ref().ok_or_else(|| {
        ControllerError::MalformedData(format!(
            "{} has no debugging info",
            report.display_name
        ))
    })?;

    let stack_trace = debugging_info
        .break_points
        .iter()
        .map(|bp| {
            let location = bp.location.unwrap_or_default();
            StackFrame {
                function: bp.function.clone(),
                source_file: bp.source_file_path.clone(),
                line: location.line,
                column: location.column,
            }
        })
        .collect();

    let human_readable_input = if error_report.human_readable_input.is_empty() {
        String::from_utf8_lossy(&error_report.input_data).into_owned()
    } else {
        error_report.human_readable_input.clone()
    };

    Ok(LocalFinding {
        origin: REMOTE_ORIGIN.to_string(),
        name: report.display_name.clone(),
        error_type: error_report.error_type.clone(),
        input_data: error_report.input_data.clone(),
        human_readable_input,
        logs: error_report.logs.clone(),
        details: error_report.details.clone(),
        tag: error_report.tag.clone(),
        stack_trace,
        created_at,
        fuzz_test: report.fuzz_target_display_name.clone(),
    })
}

/// Run identifiers attached to an uploaded finding.
#[derive(Debug, Clone, Default)]
pub struct UploadContext {
    pub fuzz_target: String,
    pub campaign_run: String,
    pub fuzzing_run: String,
}

/// Convert a local finding to the upload shape.
pub fn local_to_remote(
    finding: &LocalFinding,
    project: &ProjectId,
    context: &UploadContext,
    now: DateTime<Utc>,
) -> RemoteFinding {
    let break_points = finding
        .stack_trace
        .iter()
        .map(|frame| BreakPoint {
            source_file_path: frame.source_file.clone(),
            location: Some(FindingLocation {
                line: frame.line,
                column: frame.column,
            }),
            function: frame.function.clone(),
        })
        .collect();

    let short_description = finding
        .short_description_columns()
        .into_iter()
        .next()
        .unwrap_or_default();

    RemoteFinding {
        name: format!("{}/findings/{}", project.resource_name(), finding.name),
        display_name: finding.name.clone(),
        fuzz_target: context.fuzz_target.clone(),
        fuzzing_run: context.fuzzing_run.clone(),
        campaign_run: context.campaign_run.clone(),
        error_report: Some(ErrorReport {
            logs: finding.logs.clone(),
            details: finding.details.clone(),
            error_type: finding.error_type.clone(),
            input_data: finding.input_data.clone(),
            debugging_info: Some(DebuggingInfo {
                break_points,
                ..Default::default()
            }),
            human_readable_input: String::new(),
            tag: finding.tag.clone(),
            short_description,
        }),
        timestamp: to_rfc3339(now),
        ..Default::default()
    }
}

/// Project-level finding operations backed by the transport.
pub struct FindingReconciler {
    transport: Arc<dyn BackendTransport>,
}

impl FindingReconciler {
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }

    /// Download the project's findings and translate the latest report of
    /// `name`.
    pub async fn lookup(
        &self,
        project: &ProjectId,
        name: &str,
        token: &str,
    ) -> Result<LocalFinding, ControllerError> {
        let reports = self
            .transport
            .download_project_findings(project, token)
            .await?;
        debug!(project = %project, reports = reports.len(), "Downloaded project findings");

        match latest_report(&reports, name) {
            LatestReport::Found(report) => remote_to_local(report),
            LatestReport::Missing => Err(ControllerError::NotFound {
                name: name.to_string(),
                project: project.to_string(),
            }),
            LatestReport::Undated => Err(ControllerError::NoValidTimestamp {
                name: name.to_string(),
                project: project.to_string(),
            }),
        }
    }

    /// Translate and upload a local finding.
    pub async fn upload(
        &self,
        project: &ProjectId,
        finding: &LocalFinding,
        context: &UploadContext,
        token: &str,
    ) -> Result<(), ControllerError> {
        let remote = local_to_remote(finding, project, context, Utc::now());
        self.transport.upload_finding(project, &remote, token).await?;
        debug!(project = %project, name = %finding.name, "Uploaded finding");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, nid: &str, ts: &str) -> RemoteFinding {
        RemoteFinding {
            display_name: name.to_string(),
            nid: nid.to_string(),
            timestamp: ts.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_latest_report_picks_newest() {
        let reports = vec![
            report("X", "fdn-1", "2024-01-01T00:00:00Z"),
            report("X", "fdn-2", "2024-03-01T00:00:00Z"),
            report("Y", "fdn-3", "2025-01-01T00:00:00Z"),
            report("X", "fdn-4", "2024-02-01T00:00:00Z"),
        ];
        match latest_report(&reports, "X") {
            LatestReport::Found(r) => assert_eq!(r.nid, "fdn-2"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_latest_report_skips_bad_timestamps() {
        let reports = vec![
            report("X", "fdn-1", "garbage"),
            report("X", "fdn-2", "2024-01-01T00:00:00Z"),
            report("X", "fdn-3", "also garbage"),
        ];
        assert_eq!(latest_report(&reports, "X"), LatestReport::Found(&reports[1]));
    }

    #[test]
    fn test_latest_report_tie_keeps_first() {
        let reports = vec![
            report("X", "fdn-1", "2024-01-01T00:00:00Z"),
            report("X", "fdn-2", "2024-01-01T02:00:00+02:00"),
        ];
        assert_eq!(latest_report(&reports, "X"), LatestReport::Found(&reports[0]));
    }

    #[test]
    fn test_latest_report_missing_and_undated() {
        let reports = vec![report("X", "fdn-1", "nope")];
        assert_eq!(latest_report(&reports, "Y"), LatestReport::Missing);
        assert_eq!(latest_report(&reports, "X"), LatestReport::Undated);
    }

    #[test]
    fn test_collapse_keeps_order_and_latest() {
        let reports = vec![
            report("A", "fdn-1", "2024-01-01T00:00:00Z"),
            report("B", "fdn-2", "2024-01-01T00:00:00Z"),
            report("A", "fdn-3", "2024-06-01T00:00:00Z"),
        ];
        let nids: Vec<_> = collapse(reports).into_iter().map(|r| r.nid).collect();
        assert_eq!(nids, vec!["fdn-3", "fdn-2"]);
    }

    #[test]
    fn test_collapse_keeps_undated_groups() {
        let reports = vec![
            report("A", "fdn-1", "bad"),
            report("A", "fdn-2", "worse"),
            report("B", "fdn-3", "bad"),
        ];
        let nids: Vec<_> = collapse(reports).into_iter().map(|r| r.nid).collect();
        assert_eq!(nids, vec!["fdn-1", "fdn-2", "fdn-3"]);
    }

    fn full_report() -> RemoteFinding {
        RemoteFinding {
            display_name: "brave_turtle".to_string(),
            nid: "fdn-1".to_string(),
            timestamp: "2024-01-02T03:04:05Z".to_string(),
            fuzz_target_display_name: "com.example.FuzzTestCase::myFuzzTest".to_string(),
            error_report: Some(ErrorReport {
                logs: vec!["==1==ERROR".to_string()],
                details: "heap-buffer-overflow".to_string(),
                error_type: "CRASH".to_string(),
                input_data: b"FUZZ".to_vec(),
                debugging_info: Some(DebuggingInfo {
                    break_points: vec![
                        BreakPoint {
                            source_file_path: "src/explore.cpp".to_string(),
                            location: Some(FindingLocation { line: 18, column: 11 }),
                            function: "exploreMe".to_string(),
                        },
                        BreakPoint {
                            source_file_path: "src/main.cpp".to_string(),
                            location: None,
                            function: "main".to_string(),
                        },
                    ],
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_remote_to_local() {
        let local = remote_to_local(&full_report()).unwrap();
        assert_eq!(local.origin, REMOTE_ORIGIN);
        assert_eq!(local.name, "brave_turtle");
        assert_eq!(local.error_type, "CRASH");
        assert_eq!(local.human_readable_input, "FUZZ");
        assert_eq!(local.fuzz_test, "com.example.FuzzTestCase::myFuzzTest");
        assert_eq!(local.stack_trace.len(), 2);
        assert_eq!(local.stack_trace[0].function, "exploreMe");
        assert_eq!(local.stack_trace[0].line, 18);
        assert_eq!(local.stack_trace[1].line, 0);
    }

    #[test]
    fn test_remote_to_local_requires_debugging_info() {
        let mut r = full_report();
        r.error_report.as_mut().unwrap().debugging_info = None;
        assert!(matches!(
            remote_to_local(&r),
            Err(ControllerError::MalformedData(_))
        ));

        r.error_report = None;
        assert!(matches!(
            remote_to_local(&r),
            Err(ControllerError::MalformedData(_))
        ));
    }

    #[test]
    fn test_remote_to_local_rejects_bad_timestamp() {
        let mut r = full_report();
        r.timestamp = "soon".to_string();
        assert!(matches!(
            remote_to_local(&r),
            Err(ControllerError::MalformedData(_))
        ));
    }

    #[test]
    fn test_local_to_remote_rebuilds_breakpoints() {
        let local = remote_to_local(&full_report()).unwrap();
        let project: ProjectId = "prj-ow6h1UIwHXTr".parse().unwrap();
        let now = parse_rfc3339("2024-07-01T00:00:00Z").unwrap();
        let ctx = UploadContext {
            fuzz_target: "my_target".to_string(),
            ..Default::default()
        };

        let remote = local_to_remote(&local, &project, &ctx, now);
        let report = remote.error_report.as_ref().unwrap();
        let bps = &report.debugging_info.as_ref().unwrap().break_points;
        assert_eq!(bps.len(), 2);
        assert_eq!(bps[0].function, "exploreMe");
        assert_eq!(bps[0].location, Some(FindingLocation { line: 18, column: 11 }));
        assert_eq!(report.short_description, "heap-buffer-overflow");
        assert_eq!(remote.timestamp, "2024-07-01T00:00:00Z");
        assert_eq!(remote.display_name, "brave_turtle");
        assert_eq!(remote.fuzz_target, "my_target");
        assert_eq!(
            remote.name,
            "projects/prj-ow6h1UIwHXTr/findings/brave_turtle"
        );
    }
}
