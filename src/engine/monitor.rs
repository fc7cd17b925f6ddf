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

//! Run monitoring loop.
//!
//! A single task waits on two time sources: a periodic poll interval and a
//! one-shot deadline. Each tick fetches the run status, then the run's
//! findings, then decides. The loop ends on the first of:
//!
//! - qualifying findings (these win over any status seen on the same tick)
//! - `finished` / `SUCCEEDED`, also checked once before the first tick
//! - `cancelled`
//! - `STOPPED`, the backend ending the run early
//! - the deadline
//!
//! Transport errors abort the loop unchanged. The deadline preempts waiting
//! between ticks but never a fetch that is already in flight.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::engine::reconciler::collapse;
use crate::engine::severity_filter::filter_by_severity;
use crate::engine_core::constants::monitor::{
    DEFAULT_DURATION, DEFAULT_INTERVAL, SHORT_DURATION_POLL,
};
use crate::engine_core::errors::ControllerError;
use crate::engine_core::models::{RemoteFinding, RunStatus, RunStatusResponse};
use crate::engine_core::severity::{SeverityClassifier, SeverityLevel};
use crate::engine_core::traits::BackendTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Total monitoring time; zero means unbounded.
    pub duration: Duration,
    /// Spacing between polls.
    pub interval: Duration,
    /// Findings below this level are ignored; `None` keeps everything.
    pub min_severity: Option<SeverityLevel>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            interval: DEFAULT_INTERVAL,
            min_severity: None,
        }
    }
}

impl MonitorOptions {
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.interval.is_zero() {
            return Err(ControllerError::Configuration(
                "Monitor interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective poll period. A duration shorter than the interval polls every
    /// second so the end of the run is not missed.
    pub fn poll_period(&self) -> Duration {
        if !self.duration.is_zero() && self.duration < self.interval {
            SHORT_DURATION_POLL
        } else {
            self.interval
        }
    }

    fn deadline(&self) -> Option<Duration> {
        (!self.duration.is_zero()).then_some(self.duration)
    }
}

/// Terminal state of a monitored run.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    FindingsReported(Vec<RemoteFinding>),
    RunFinished,
    RunCancelled,
    EarlyStop,
    TimedOut,
}

impl MonitorOutcome {
    pub fn findings(&self) -> &[RemoteFinding] {
        match self {
            MonitorOutcome::FindingsReported(findings) => findings,
            _ => &[],
        }
    }
}

pub struct RunMonitor {
    transport: Arc<dyn BackendTransport>,
    classifier: Arc<dyn SeverityClassifier>,
    options: MonitorOptions,
}

impl RunMonitor {
    pub fn new(
        transport: Arc<dyn BackendTransport>,
        classifier: Arc<dyn SeverityClassifier>,
        options: MonitorOptions,
    ) -> Self {
        Self {
            transport,
            classifier,
            options,
        }
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Watch `run_nid` until one of the stop conditions holds.
    pub async fn monitor(
        &self,
        run_nid: &str,
        token: &str,
    ) -> Result<MonitorOutcome, ControllerError> {
        self.options.validate()?;

        if let Some(duration) = self.options.deadline() {
            info!("Max monitor duration is {} seconds.", duration.as_secs());
        }
        if let Some(level) = self.options.min_severity {
            info!("Monitoring for findings of severity {} or higher.", level);
        }
        info!("Monitoring will automatically stop when the run finishes, times out, or a finding is reported.");

        let status = self.transport.get_run_status(run_nid, token).await?;
        if status.status() == RunStatus::Finished {
            info!(run = %run_nid, "Run finished!");
            return Ok(MonitorOutcome::RunFinished);
        }

        let period = self.options.poll_period();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let bounded = self.options.deadline().is_some();
        let deadline = sleep(self.options.deadline().unwrap_or_default());
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;

                _ = &mut deadline, if bounded => {
                    info!(run = %run_nid, "Run finished or timed out.");
                    return Ok(MonitorOutcome::TimedOut);
                }
                _ = ticker.tick() => {
                    if let Some(outcome) = self.poll_once(run_nid, token).await? {
                        return Ok(outcome);
                    }
                }
            }
        }
    }

    async fn poll_once(
        &self,
        run_nid: &str,
        token: &str,
    ) -> Result<Option<MonitorOutcome>, ControllerError> {
        let status = self.transport.get_run_status(run_nid, token).await?;
        let findings = self.transport.get_run_findings(run_nid, token).await?;
        debug!(
            run = %run_nid,
            status = %status.run.status,
            reports = findings.len(),
            "Polled run"
        );
        Ok(self.decide(&status, findings))
    }

    /// Decision for one tick. Findings take priority over status.
    pub fn decide(
        &self,
        status: &RunStatusResponse,
        findings: Vec<RemoteFinding>,
    ) -> Option<MonitorOutcome> {
        let findings = filter_by_severity(
            collapse(findings),
            self.options.min_severity,
            self.classifier.as_ref(),
        );

        if !findings.is_empty() {
            for finding in &findings {
                info!("Finding found: {}, NID: {}", finding.display_name, finding.nid);
            }
            return Some(MonitorOutcome::FindingsReported(findings));
        }

        match status.status() {
            RunStatus::Cancelled => {
                warn!(run = %status.run.nid, "Run cancelled.");
                Some(MonitorOutcome::RunCancelled)
            }
            RunStatus::Stopped => {
                info!(run = %status.run.nid, "Run stopped early by the backend.");
                Some(MonitorOutcome::EarlyStop)
            }
            RunStatus::Finished => {
                info!(run = %status.run.nid, "Run finished!");
                Some(MonitorOutcome::RunFinished)
            }
            RunStatus::Running(_) => None,
        }
    }
}
