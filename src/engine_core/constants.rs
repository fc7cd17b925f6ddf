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

//! fuzzrun Constants - Single source of truth for all configuration values.
//!
//! This module centralizes backend paths, run status strings, timing
//! defaults and environment variable names.

/// Run status strings reported by the backend.
pub mod status {
    /// Run completed normally (v3 container runs)
    pub const FINISHED: &str = "finished";
    /// Run completed normally (job-level status)
    pub const SUCCEEDED: &str = "SUCCEEDED";
    /// Run was cancelled by a user
    pub const CANCELLED: &str = "cancelled";
    /// Run was ended early by the backend
    pub const STOPPED: &str = "STOPPED";
}

/// Monitoring cadence
pub mod monitor {
    use std::time::Duration;

    /// Poll period used when the monitor duration is shorter than the interval
    pub const SHORT_DURATION_POLL: Duration = Duration::from_secs(1);
    /// Default spacing between polls
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    /// Default monitor duration (zero = unbounded)
    pub const DEFAULT_DURATION: Duration = Duration::ZERO;
}

/// Project identifiers
pub mod project {
    /// Prefix of every canonical project identifier
    pub const NID_PREFIX: &str = "prj-";
    /// Resource prefix used by the v1 API and older configuration files
    pub const RESOURCE_PREFIX: &str = "projects/";
    /// URL-escaped form of `RESOURCE_PREFIX`
    pub const ESCAPED_RESOURCE_PREFIX: &str = "projects%2F";
    /// Width of the legacy hex suffix inside a canonical identifier
    pub const LEGACY_SUFFIX_WIDTH: usize = 12;
    /// Owner of the public showcase projects; never listed as the user's own
    pub const FEATURED_PROJECTS_ORGANIZATION: &str = "organizations/featured-projects";
}

/// Finding translation
pub mod finding {
    /// Origin tag stamped on findings downloaded from the backend
    pub const REMOTE_ORIGIN: &str = "remote";
}

/// HTTP transport settings
pub mod http {
    use std::time::Duration;

    /// Default whole-request timeout
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    /// Fail fast on connection
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Idle pooled connections are kept this long
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
    /// Bound for project finding downloads, which interactive callers await
    pub const DOWNLOAD_FINDINGS_TIMEOUT: Duration = Duration::from_secs(5);
    /// Header carrying the per-request correlation id
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_SERVER: &str = "FUZZRUN_SERVER";
    pub const ENV_API_TOKEN: &str = "FUZZRUN_API_TOKEN";
    pub const ENV_PROJECT: &str = "FUZZRUN_PROJECT";
    pub const ENV_MONITOR_DURATION: &str = "FUZZRUN_MONITOR_DURATION";
    pub const ENV_MONITOR_INTERVAL: &str = "FUZZRUN_MONITOR_INTERVAL";
    pub const ENV_MIN_FINDING_SEVERITY: &str = "FUZZRUN_MIN_FINDING_SEVERITY";
    pub const ENV_SEVERITY_TABLE: &str = "FUZZRUN_SEVERITY_TABLE";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

    pub const DEFAULT_SERVER: &str = "http://localhost:8080";
}
