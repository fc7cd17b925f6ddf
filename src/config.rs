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

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::monitor::MonitorOptions;
use crate::engine_core::constants::config as keys;
use crate::engine_core::constants::monitor::{DEFAULT_DURATION, DEFAULT_INTERVAL};
use crate::engine_core::errors::ControllerError;
use crate::engine_core::severity::{SeverityLevel, SeverityTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub project: Option<String>,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
    pub monitor_duration: Duration,
    pub monitor_interval: Duration,
    pub min_finding_severity: Option<SeverityLevel>,
    pub severity_table_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let monitor_duration = match non_empty(keys::ENV_MONITOR_DURATION) {
            Some(raw) => parse_duration(&raw)?,
            None => DEFAULT_DURATION,
        };
        let monitor_interval = match non_empty(keys::ENV_MONITOR_INTERVAL) {
            Some(raw) => parse_duration(&raw)?,
            None => DEFAULT_INTERVAL,
        };
        let min_finding_severity = non_empty(keys::ENV_MIN_FINDING_SEVERITY)
            .map(|raw| raw.parse::<SeverityLevel>())
            .transpose()?;

        Ok(Self {
            server: non_empty(keys::ENV_SERVER).unwrap_or_else(|| keys::DEFAULT_SERVER.to_string()),
            api_token: non_empty(keys::ENV_API_TOKEN),
            project: non_empty(keys::ENV_PROJECT),
            log_level: non_empty(keys::ENV_LOG_LEVEL).unwrap_or_else(|| "info".to_string()),
            log_format: non_empty(keys::ENV_LOG_FORMAT).unwrap_or_else(|| "text".to_string()),
            monitor_duration,
            monitor_interval,
            min_finding_severity,
            severity_table_path: non_empty(keys::ENV_SEVERITY_TABLE).map(PathBuf::from),
        })
    }

    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            duration: self.monitor_duration,
            interval: self.monitor_interval,
            min_severity: self.min_finding_severity,
        }
    }

    /// Built-in table, extended from `severity_table_path` when set.
    pub fn severity_table(&self) -> Result<SeverityTable, ControllerError> {
        match &self.severity_table_path {
            Some(path) => SeverityTable::load(path),
            None => Ok(SeverityTable::builtin()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: keys::DEFAULT_SERVER.to_string(),
            api_token: None,
            project: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            monitor_duration: DEFAULT_DURATION,
            monitor_interval: DEFAULT_INTERVAL,
            min_finding_severity: None,
            severity_table_path: None,
        }
    }
}

/// Parse `300`, `300s`, `5m` or `1h`. Bare numbers are seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, ControllerError> {
    let invalid = || ControllerError::Configuration(format!("Invalid duration: {:?}", raw));

    let trimmed = raw.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => return Err(invalid()),
    };
    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}
