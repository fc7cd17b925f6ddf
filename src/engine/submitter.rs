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

//! Run submission.
//!
//! A single `create_run` request per submission; no retry, no polling.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::engine_core::errors::ControllerError;
use crate::engine_core::models::{FuzzTest, Link, Run, RunRequest};
use crate::engine_core::traits::BackendTransport;
use crate::engine_core::types::ProjectId;

/// Source revision recorded with a run. Supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitRevision {
    pub commit: Option<String>,
    pub branch: Option<String>,
}

/// A run accepted by the backend.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedRun {
    pub run: Run,
    pub links: Vec<Link>,
}

impl SubmittedRun {
    pub fn nid(&self) -> &str {
        &self.run.nid
    }

    /// Web page listing the project's runs.
    pub fn dashboard_url(&self, server: &str, project: &ProjectId) -> String {
        format!(
            "{}/app/projects/{}/runs",
            server.trim_end_matches('/'),
            project
        )
    }
}

pub struct RunSubmitter {
    transport: Arc<dyn BackendTransport>,
}

impl RunSubmitter {
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }

    pub fn build_request(
        image: &str,
        fuzz_tests: &[String],
        revision: Option<&GitRevision>,
    ) -> RunRequest {
        RunRequest {
            image: image.to_string(),
            fuzz_tests: fuzz_tests.iter().map(FuzzTest::named).collect(),
            git_commit: revision.and_then(|r| r.commit.clone()),
            git_branch: revision.and_then(|r| r.branch.clone()),
        }
    }

    /// Create a run for `image` on `project`.
    pub async fn submit(
        &self,
        image: &str,
        project: &ProjectId,
        fuzz_tests: &[String],
        revision: Option<&GitRevision>,
        token: &str,
    ) -> Result<SubmittedRun, ControllerError> {
        let request = Self::build_request(image, fuzz_tests, revision);
        let response = self.transport.create_run(&request, project, token).await?;

        let run = response.run.ok_or_else(|| {
            ControllerError::Decode("Run creation response carries no run".to_string())
        })?;
        if run.nid.is_empty() {
            return Err(ControllerError::Decode(
                "Run creation response carries no run NID".to_string(),
            ));
        }

        info!(
            run = %run.nid,
            project = %project,
            fuzz_tests = fuzz_tests.len(),
            "Started fuzzing run"
        );

        Ok(SubmittedRun {
            run,
            links: response.links,
        })
    }
}
