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

//! Backend Transport Trait.
//!
//! The controller talks to the backend only through this seam. Retries,
//! backoff and header injection belong to the implementation.

use async_trait::async_trait;

use crate::engine_core::errors::ControllerError;
use crate::engine_core::models::{
    Project, RemoteFinding, RunRequest, RunResponse, RunStatusResponse,
};
use crate::engine_core::types::ProjectId;

#[async_trait]
pub trait BackendTransport: Send + Sync {
    /// Create a run for `project`.
    async fn create_run(
        &self,
        request: &RunRequest,
        project: &ProjectId,
        token: &str,
    ) -> Result<RunResponse, ControllerError>;

    /// Current status of a run.
    async fn get_run_status(
        &self,
        run_nid: &str,
        token: &str,
    ) -> Result<RunStatusResponse, ControllerError>;

    /// Every finding reported for a run so far.
    async fn get_run_findings(
        &self,
        run_nid: &str,
        token: &str,
    ) -> Result<Vec<RemoteFinding>, ControllerError>;

    /// Projects visible to the token, names already normalized.
    async fn list_projects(&self, token: &str) -> Result<Vec<Project>, ControllerError>;

    /// Every finding report stored for a project. Bounded by a short timeout.
    async fn download_project_findings(
        &self,
        project: &ProjectId,
        token: &str,
    ) -> Result<Vec<RemoteFinding>, ControllerError>;

    /// Store a locally found finding on the backend.
    async fn upload_finding(
        &self,
        project: &ProjectId,
        finding: &RemoteFinding,
        token: &str,
    ) -> Result<(), ControllerError>;
}
