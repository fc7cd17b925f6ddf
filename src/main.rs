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

// Main entry point for fuzzrun
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use fuzzrun::api::ApiClient;
use fuzzrun::config::{parse_duration, Config};
use fuzzrun::engine::monitor::{MonitorOutcome, RunMonitor};
use fuzzrun::engine::project::resolve_project;
use fuzzrun::engine::reconciler::FindingReconciler;
use fuzzrun::engine::submitter::{GitRevision, RunSubmitter};
use fuzzrun::engine_core::errors::ControllerError;
use fuzzrun::engine_core::severity::SeverityLevel;
use fuzzrun::engine_core::traits::BackendTransport;
use fuzzrun::engine_core::types::ProjectId;

#[derive(Parser, Debug)]
#[command(version, about = "Submit and monitor remote fuzzing runs", long_about = None)]
struct Cli {
    /// Backend URL (overrides FUZZRUN_SERVER)
    #[arg(long, global = true)]
    server: Option<String>,

    /// API access token (overrides FUZZRUN_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a fuzzing run for an already pushed image
    Submit {
        /// Image reference, e.g. registry/cifuzz/abc:sha256-...
        #[arg(long)]
        image: String,

        /// Project reference (overrides FUZZRUN_PROJECT)
        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        git_commit: Option<String>,

        #[arg(long)]
        git_branch: Option<String>,

        /// Print the backend response as JSON on stdout
        #[arg(long)]
        print_json: bool,

        /// Monitor the run after starting it
        #[arg(long)]
        monitor: bool,

        #[command(flatten)]
        monitor_args: MonitorArgs,

        /// Fuzz tests to run
        #[arg(required = true)]
        fuzz_tests: Vec<String>,
    },
    /// Monitor an existing run
    Monitor {
        run_nid: String,

        #[command(flatten)]
        monitor_args: MonitorArgs,
    },
    /// Download the latest report of a finding as JSON
    Finding {
        name: String,

        #[arg(long)]
        project: Option<String>,
    },
    /// List the projects visible to the token
    Projects,
    /// Print the canonical identifier of a project reference
    ResolveProject { reference: String },
}

#[derive(Args, Debug)]
struct MonitorArgs {
    /// Maximum monitoring time, e.g. 300, 10s, 5m (0 = unbounded)
    #[arg(long, value_parser = parse_duration)]
    monitor_duration: Option<Duration>,

    /// Time between polls, e.g. 10s
    #[arg(long, value_parser = parse_duration)]
    monitor_interval: Option<Duration>,

    /// Only report findings of this severity or higher
    #[arg(long)]
    min_finding_severity: Option<SeverityLevel>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    install_panic_hook();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };

    if let Some(server) = &cli.server {
        config.server = server.clone();
    }
    if let Some(token) = &cli.token {
        config.api_token = Some(token.clone());
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    if let Err(err) = run(cli.command, config).await {
        match err.downcast_ref::<ControllerError>() {
            Some(controller_err) => eprintln!("Error: {}", controller_err.user_message()),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}

async fn run(command: Command, mut config: Config) -> anyhow::Result<()> {
    match command {
        Command::ResolveProject { reference } => {
            let id = resolve_project(&reference)?;
            println!("{}", id);
            Ok(())
        }
        Command::Projects => {
            let (client, token) = connect(&config)?;
            for project in client.list_projects(&token).await? {
                println!("{}\t{}", project.name, project.display_name);
            }
            Ok(())
        }
        Command::Finding { name, project } => {
            let project = project_id(project, &config)?;
            let (client, token) = connect(&config)?;
            let finding = FindingReconciler::new(client)
                .lookup(&project, &name, &token)
                .await?;
            println!("{}", serde_json::to_string_pretty(&finding)?);
            Ok(())
        }
        Command::Monitor {
            run_nid,
            monitor_args,
        } => {
            monitor_args.apply(&mut config);
            let (client, token) = connect(&config)?;
            monitor_run(client, &config, &run_nid, &token).await
        }
        Command::Submit {
            image,
            project,
            git_commit,
            git_branch,
            print_json,
            monitor,
            monitor_args,
            fuzz_tests,
        } => {
            monitor_args.apply(&mut config);
            let project = project_id(project, &config)?;
            let (client, token) = connect(&config)?;

            let revision = GitRevision {
                commit: git_commit,
                branch: git_branch,
            };
            let submitted = RunSubmitter::new(client.clone())
                .submit(&image, &project, &fuzz_tests, Some(&revision), &token)
                .await?;

            if print_json {
                println!("{}", serde_json::to_string_pretty(&submitted)?);
            }
            info!(
                "Successfully started fuzzing run. To view findings and coverage, open:\n    {}",
                submitted.dashboard_url(&config.server, &project)
            );

            if monitor {
                monitor_run(client, &config, submitted.nid(), &token).await?;
            }
            Ok(())
        }
    }
}

impl MonitorArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(duration) = self.monitor_duration {
            config.monitor_duration = duration;
        }
        if let Some(interval) = self.monitor_interval {
            config.monitor_interval = interval;
        }
        if let Some(level) = self.min_finding_severity {
            config.min_finding_severity = Some(level);
        }
    }
}

fn connect(config: &Config) -> anyhow::Result<(Arc<dyn BackendTransport>, String)> {
    let token = config
        .api_token
        .clone()
        .ok_or_else(|| anyhow!("Missing API token: set FUZZRUN_API_TOKEN or pass --token"))?;
    let client = ApiClient::new(&config.server)?;
    Ok((Arc::new(client), token))
}

fn project_id(flag: Option<String>, config: &Config) -> anyhow::Result<ProjectId> {
    let reference = flag
        .or_else(|| config.project.clone())
        .ok_or_else(|| anyhow!("Flag 'project' must be set."))?;
    Ok(resolve_project(&reference)?)
}

async fn monitor_run(
    client: Arc<dyn BackendTransport>,
    config: &Config,
    run_nid: &str,
    token: &str,
) -> anyhow::Result<()> {
    let classifier = Arc::new(
        config
            .severity_table()
            .context("Failed to load severity table")?,
    );
    let monitor = RunMonitor::new(client, classifier, config.monitor_options());

    match monitor.monitor(run_nid, token).await? {
        MonitorOutcome::FindingsReported(findings) => {
            info!(count = findings.len(), "Monitoring stopped: findings reported")
        }
        MonitorOutcome::RunFinished => info!("Monitoring stopped: run finished"),
        MonitorOutcome::RunCancelled => info!("Monitoring stopped: run cancelled"),
        MonitorOutcome::EarlyStop => info!("Monitoring stopped: run stopped early"),
        MonitorOutcome::TimedOut => info!("Monitoring stopped: duration elapsed"),
    }
    Ok(())
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("fuzzrun=debug,info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
