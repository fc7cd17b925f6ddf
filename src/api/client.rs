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

//! HTTP client for the fuzzing backend.
//!
//! Implements [`BackendTransport`] over `reqwest` with a pooled client,
//! bearer authentication and a correlation id per request.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::engine_core::constants::http::{
    CONNECT_TIMEOUT, DOWNLOAD_FINDINGS_TIMEOUT, POOL_IDLE_TIMEOUT, REQUEST_ID_HEADER,
    REQUEST_TIMEOUT,
};
use crate::engine_core::constants::project::FEATURED_PROJECTS_ORGANIZATION;
use crate::engine_core::errors::ControllerError;
use crate::engine_core::models::{
    FindingList, Project, RemoteFinding, RunRequest, RunResponse, RunStatusResponse,
};
use crate::engine_core::traits::BackendTransport;
use crate::engine_core::types::{resolve_project, ProjectId};

/// Check that `server` is an http(s) URL and drop trailing slashes.
pub fn normalize_server_url(server: &str) -> Result<String, ControllerError> {
    let trimmed = server.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| {
        ControllerError::Configuration(format!("Invalid server URL {:?}: {}", server, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ControllerError::Configuration(format!(
                "Unsupported server URL scheme {:?}",
                other
            )))
        }
    }
    if url.host_str().is_none() {
        return Err(ControllerError::Configuration(format!(
            "Server URL {:?} has no host",
            server
        )));
    }

    Ok(trimmed.to_string())
}

#[derive(Debug, Default, Deserialize)]
struct ProjectList {
    #[serde(default)]
    projects: Option<Vec<Project>>,
}

#[derive(Serialize)]
struct FindingUpload<'a> {
    findings: [&'a RemoteFinding; 1],
}

pub struct ApiClient {
    http_client: Client,
    base_url: Url,
    default_timeout: Duration,
}

impl ApiClient {
    /// Create a client for `server` with the default timeouts.
    pub fn new(server: &str) -> Result<Self, ControllerError> {
        Self::with_timeout(server, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(server: &str, timeout: Duration) -> Result<Self, ControllerError> {
        let normalized = normalize_server_url(server)?;
        let base_url = Url::parse(&format!("{}/", normalized))
            .map_err(|e| ControllerError::Configuration(format!("Invalid server URL: {}", e)))?;

        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_nodelay(true)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()
            .map_err(|e| {
                ControllerError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url,
            default_timeout: timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ControllerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ControllerError::Configuration("Server URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> (RequestBuilder, String) {
        let request_id = Uuid::new_v4().to_string();
        let builder = self
            .http_client
            .request(method, url)
            .bearer_auth(token)
            .header(REQUEST_ID_HEADER, &request_id);
        (builder, request_id)
    }

    /// Send a request and decode a JSON body, mapping failures onto the
    /// controller's error taxonomy.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        request_id: &str,
    ) -> Result<T, ControllerError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                ControllerError::NoConnection(e.to_string())
            } else if e.is_timeout() {
                ControllerError::NoConnection(format!("Request timed out: {}", e))
            } else {
                ControllerError::Request {
                    status: 0,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let url = response.url().clone();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(url = %url, request_id = %request_id, status = %status, "Token rejected");
            return Err(ControllerError::InvalidToken);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                url = %url,
                request_id = %request_id,
                error = %body,
                "Backend returned HTTP error"
            );
            return Err(ControllerError::Request {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| ControllerError::Request {
            status: status.as_u16(),
            message: format!("Failed to read response body: {}", e),
        })?;
        debug!(url = %url, request_id = %request_id, bytes = bytes.len(), "Backend request completed");

        // Some endpoints answer with an empty body on success.
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|e| {
            error!(error = %e, url = %url, request_id = %request_id, "Failed to parse backend response");
            ControllerError::Decode(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<T, ControllerError> {
        let url = self.url(segments)?;
        let (mut builder, request_id) = self.request(Method::GET, url, token);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        debug!(path = %segments.join("/"), request_id = %request_id, "GET");
        self.send(builder, &request_id).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        token: &str,
    ) -> Result<T, ControllerError> {
        let url = self.url(segments)?;
        let (builder, request_id) = self.request(Method::POST, url, token);
        debug!(path = %segments.join("/"), request_id = %request_id, "POST");
        self.send(builder.json(body), &request_id).await
    }
}

#[async_trait]
impl BackendTransport for ApiClient {
    async fn create_run(
        &self,
        request: &RunRequest,
        project: &ProjectId,
        token: &str,
    ) -> Result<RunResponse, ControllerError> {
        self.post(&["v3", "projects", project.as_str(), "runs"], request, token)
            .await
    }

    async fn get_run_status(
        &self,
        run_nid: &str,
        token: &str,
    ) -> Result<RunStatusResponse, ControllerError> {
        self.get(&["v3", "runs", run_nid, "status"], token, None)
            .await
    }

    async fn get_run_findings(
        &self,
        run_nid: &str,
        token: &str,
    ) -> Result<Vec<RemoteFinding>, ControllerError> {
        let list: FindingList = self
            .get(&["v3", "runs", run_nid, "findings"], token, None)
            .await?;
        Ok(list.findings)
    }

    async fn list_projects(&self, token: &str) -> Result<Vec<Project>, ControllerError> {
        let list: ProjectList = self.get(&["v1", "projects"], token, None).await?;

        // A missing field means the account has no projects yet
        let projects = list.projects.unwrap_or_default();
        let listed = projects
            .into_iter()
            .filter(|project| project.owner_organization_name != FEATURED_PROJECTS_ORGANIZATION)
            .filter_map(|mut project| match resolve_project(&project.name) {
                Ok(id) => {
                    project.name = id.into();
                    Some(project)
                }
                Err(e) => {
                    warn!(name = %project.name, error = %e, "Skipping project with unrecognized name");
                    None
                }
            })
            .collect();
        Ok(listed)
    }

    async fn download_project_findings(
        &self,
        project: &ProjectId,
        token: &str,
    ) -> Result<Vec<RemoteFinding>, ControllerError> {
        let list: FindingList = self
            .get(
                &["v1", "projects", project.as_str(), "findings"],
                token,
                Some(DOWNLOAD_FINDINGS_TIMEOUT),
            )
            .await?;
        Ok(list.findings)
    }

    async fn upload_finding(
        &self,
        project: &ProjectId,
        finding: &RemoteFinding,
        token: &str,
    ) -> Result<(), ControllerError> {
        let body = FindingUpload {
            findings: [finding],
        };
        let _: serde_json::Value = self
            .post(&["v1", "projects", project.as_str(), "findings"], &body, token)
            .await?;
        Ok(())
    }
}
