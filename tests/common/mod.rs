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

// Scripted in-memory backend shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use fuzzrun::engine_core::errors::ControllerError;
use fuzzrun::engine_core::models::{
    Project, RemoteFinding, Run, RunRequest, RunResponse, RunStatusRecord, RunStatusResponse,
};
use fuzzrun::engine_core::traits::BackendTransport;
use fuzzrun::engine_core::types::ProjectId;

/// Replays scripted statuses and per-tick findings.
///
/// The last status repeats once the script is exhausted; findings fall back
/// to an empty list.
#[derive(Default)]
pub struct ScriptedBackend {
    statuses: Mutex<VecDeque<String>>,
    run_findings: Mutex<VecDeque<Vec<RemoteFinding>>>,
    project_findings: Vec<RemoteFinding>,
    run_response: Option<RunResponse>,
    /// 1-based status call that fails with `NoConnection`
    fail_status_on: Option<usize>,
    /// Simulated latency of the run findings endpoint
    findings_delay: Option<Duration>,
    pub calls: Mutex<Vec<&'static str>>,
    pub created: Mutex<Vec<(RunRequest, ProjectId)>>,
    pub uploaded: Mutex<Vec<(ProjectId, RemoteFinding)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, statuses: &[&str]) -> Self {
        *self.statuses.lock().unwrap() = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_run_findings(self, ticks: Vec<Vec<RemoteFinding>>) -> Self {
        *self.run_findings.lock().unwrap() = ticks.into();
        self
    }

    pub fn with_project_findings(mut self, findings: Vec<RemoteFinding>) -> Self {
        self.project_findings = findings;
        self
    }

    pub fn with_run_response(mut self, response: RunResponse) -> Self {
        self.run_response = Some(response);
        self
    }

    pub fn failing_status_on(mut self, call: usize) -> Self {
        self.fail_status_on = Some(call);
        self
    }

    pub fn with_findings_delay(mut self, delay: Duration) -> Self {
        self.findings_delay = Some(delay);
        self
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.iter().filter(|c| **c == call).count()
    }
}

pub fn finding(name: &str, nid: &str, error_id: &str, timestamp: &str) -> RemoteFinding {
    RemoteFinding {
        display_name: name.to_string(),
        nid: nid.to_string(),
        error_id: error_id.to_string(),
        timestamp: timestamp.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl BackendTransport for ScriptedBackend {
    async fn create_run(
        &self,
        request: &RunRequest,
        project: &ProjectId,
        _token: &str,
    ) -> Result<RunResponse, ControllerError> {
        self.record("create_run");
        self.created
            .lock()
            .unwrap()
            .push((request.clone(), project.clone()));
        Ok(self.run_response.clone().unwrap_or_else(|| RunResponse {
            run: Some(Run {
                nid: "run-0001".to_string(),
                status: "INITIALIZED".to_string(),
                image: request.image.clone(),
                fuzz_tests: request.fuzz_tests.clone(),
            }),
            links: Vec::new(),
        }))
    }

    async fn get_run_status(
        &self,
        run_nid: &str,
        _token: &str,
    ) -> Result<RunStatusResponse, ControllerError> {
        let n = self.record("status");
        if self.fail_status_on == Some(n) {
            return Err(ControllerError::NoConnection("connection reset".to_string()));
        }

        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap_or_default()
        } else {
            statuses.front().cloned().unwrap_or_default()
        };
        Ok(RunStatusResponse {
            run: RunStatusRecord {
                nid: run_nid.to_string(),
                status,
            },
        })
    }

    async fn get_run_findings(
        &self,
        _run_nid: &str,
        _token: &str,
    ) -> Result<Vec<RemoteFinding>, ControllerError> {
        self.record("findings");
        if let Some(delay) = self.findings_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .run_findings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn list_projects(&self, _token: &str) -> Result<Vec<Project>, ControllerError> {
        self.record("list_projects");
        Ok(Vec::new())
    }

    async fn download_project_findings(
        &self,
        _project: &ProjectId,
        _token: &str,
    ) -> Result<Vec<RemoteFinding>, ControllerError> {
        self.record("download");
        Ok(self.project_findings.clone())
    }

    async fn upload_finding(
        &self,
        project: &ProjectId,
        finding: &RemoteFinding,
        _token: &str,
    ) -> Result<(), ControllerError> {
        self.record("upload");
        self.uploaded
            .lock()
            .unwrap()
            .push((project.clone(), finding.clone()));
        Ok(())
    }
}
