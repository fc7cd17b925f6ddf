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

mod common;

use std::sync::Arc;

use common::{finding, ScriptedBackend};
use fuzzrun::engine::project::resolve_project;
use fuzzrun::engine::reconciler::{FindingReconciler, UploadContext};
use fuzzrun::engine_core::errors::ControllerError;
use fuzzrun::engine_core::models::{BreakPoint, DebuggingInfo, ErrorReport, RemoteFinding};

fn dated(nid: &str, timestamp: &str, details: &str) -> RemoteFinding {
    let mut report = finding("brave_turtle", nid, "", timestamp);
    report.error_report = Some(ErrorReport {
        details: details.to_string(),
        debugging_info: Some(DebuggingInfo {
            break_points: vec![BreakPoint {
                source_file_path: "src/explore.cpp".to_string(),
                location: None,
                function: "exploreMe".to_string(),
            }],
            ..Default::default()
        }),
        ..Default::default()
    });
    report
}

#[tokio::test]
async fn test_lookup_returns_latest_report() {
    let backend = Arc::new(ScriptedBackend::new().with_project_findings(vec![
        dated("fdn-1", "2024-01-01T00:00:00Z", "old"),
        dated("fdn-2", "2024-03-01T00:00:00Z", "newest"),
        dated("fdn-3", "not a date", "undated"),
        dated("fdn-4", "2024-02-01T00:00:00Z", "middle"),
    ]));
    let project = resolve_project("test-73d94c96").unwrap();

    let local = FindingReconciler::new(backend.clone())
        .lookup(&project, "brave_turtle", "token")
        .await
        .unwrap();

    assert_eq!(local.details, "newest");
    assert_eq!(local.stack_trace[0].location(), "src/explore.cpp:0:0");
    assert_eq!(backend.count("download"), 1);
}

#[tokio::test]
async fn test_lookup_skips_undated_report_listed_first() {
    let backend = Arc::new(ScriptedBackend::new().with_project_findings(vec![
        dated("fdn-1", "garbage", "undated"),
        dated("fdn-2", "2024-04-01T00:00:00Z", "dated"),
    ]));
    let project = resolve_project("prj-ow6h1UIwHXTr").unwrap();

    let local = FindingReconciler::new(backend)
        .lookup(&project, "brave_turtle", "token")
        .await
        .unwrap();

    assert_eq!(local.details, "dated");
}

#[tokio::test]
async fn test_lookup_unknown_name_reports_name_and_project() {
    let backend = Arc::new(ScriptedBackend::new().with_project_findings(vec![dated(
        "fdn-1",
        "2024-01-01T00:00:00Z",
        "x",
    )]));
    let project = resolve_project("projects/test-73d94c96").unwrap();

    let err = FindingReconciler::new(backend)
        .lookup(&project, "shy_owl", "token")
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::NotFound { .. }));
    assert_eq!(err.to_string(), "shy_owl not found in project: prj-000073d94c96");
}

#[tokio::test]
async fn test_lookup_all_undated_fails() {
    let backend = Arc::new(ScriptedBackend::new().with_project_findings(vec![
        dated("fdn-1", "", "a"),
        dated("fdn-2", "yesterday", "b"),
    ]));
    let project = resolve_project("prj-ow6h1UIwHXTr").unwrap();

    let err = FindingReconciler::new(backend)
        .lookup(&project, "brave_turtle", "token")
        .await
        .unwrap_err();

    assert!(matches!(err, ControllerError::NoValidTimestamp { .. }));
}

#[tokio::test]
async fn test_upload_round_trips_through_lookup_shape() {
    let backend = Arc::new(ScriptedBackend::new().with_project_findings(vec![dated(
        "fdn-1",
        "2024-01-01T00:00:00Z",
        "heap-buffer-overflow",
    )]));
    let project = resolve_project("prj-ow6h1UIwHXTr").unwrap();
    let reconciler = FindingReconciler::new(backend.clone());

    let local = reconciler
        .lookup(&project, "brave_turtle", "token")
        .await
        .unwrap();
    let context = UploadContext {
        fuzz_target: "my_fuzz_test".to_string(),
        campaign_run: "campaign-1".to_string(),
        fuzzing_run: "run-1".to_string(),
    };
    reconciler
        .upload(&project, &local, &context, "token")
        .await
        .unwrap();

    let uploaded = backend.uploaded.lock().unwrap();
    assert_eq!(uploaded.len(), 1);
    let (target, remote) = &uploaded[0];
    assert_eq!(target, &project);
    assert_eq!(remote.display_name, "brave_turtle");
    assert_eq!(remote.campaign_run, "campaign-1");
    assert_eq!(
        remote.error_report.as_ref().unwrap().short_description,
        "heap-buffer-overflow"
    );
}
