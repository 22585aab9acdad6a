// ABOUTME: Entry point for the mintwatch CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use mintwatch::config::{self, Config};
use mintwatch::error::Result;
use mintwatch::lifecycle::{DeploymentStatus, StateTransitionGuard};
use mintwatch::output::{Output, OutputMode};
use mintwatch::retry::{DeploymentErrorCategory, RetryClassifier, RetryPolicy};
use serde::Serialize;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Normal
    });

    if let Err(e) = run(cli.command, &output) {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(command: Commands, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match command {
        Commands::Init { force } => {
            let path = config::init_config(&cwd, force)?;
            output.message(&format!("Wrote {}", path.display()));
            Ok(())
        }
        Commands::Classify { code, category } => {
            let classifier = load_classifier(&cwd)?;
            let category = category
                .map(|c| c.parse::<DeploymentErrorCategory>())
                .transpose()?;
            let decision = classifier.classify_error(&code, category);

            output.result(
                &decision,
                &[
                    ("code", code.trim().to_uppercase()),
                    ("policy", decision.policy.to_string()),
                    ("max attempts", decision.max_retry_attempts.to_string()),
                    ("delay", format!("{}s", decision.suggested_delay_seconds)),
                    ("backoff", decision.use_exponential_backoff.to_string()),
                    ("explanation", decision.explanation.clone()),
                    (
                        "remediation",
                        decision
                            .remediation_guidance
                            .clone()
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                ],
            );
            Ok(())
        }
        Commands::Transitions { status } => {
            let status = status.parse::<DeploymentStatus>()?;
            let guard = StateTransitionGuard::new();
            let next: Vec<DeploymentStatus> = guard.valid_next_states(status).into_iter().collect();
            let report = TransitionsReport {
                status,
                terminal: guard.is_terminal_state(status),
                valid_next_states: next.clone(),
            };

            output.result(
                &report,
                &[
                    ("status", status.to_string()),
                    ("terminal", report.terminal.to_string()),
                    ("next", join_statuses(&next)),
                ],
            );
            Ok(())
        }
        Commands::Check { from, to } => {
            let from = from.parse::<DeploymentStatus>()?;
            let to = to.parse::<DeploymentStatus>()?;
            let result = StateTransitionGuard::new().validate_transition(from, to, None);

            output.result(
                &result,
                &[
                    ("transition", format!("{from} -> {to}")),
                    ("allowed", result.is_allowed.to_string()),
                    ("reason", result.reason_code.to_string()),
                    ("explanation", result.explanation.clone()),
                ],
            );
            Ok(())
        }
        Commands::Backoff {
            policy,
            attempts,
            linear,
        } => {
            let classifier = load_classifier(&cwd)?;
            let policy = policy.parse::<RetryPolicy>()?;
            let schedule: Vec<BackoffStep> = (1..=attempts)
                .map(|attempt| BackoffStep {
                    attempt,
                    delay_seconds: classifier.calculate_retry_delay(policy, attempt, !linear),
                })
                .collect();

            let lines: Vec<(&str, String)> = schedule
                .iter()
                .map(|step| ("attempt", format!("{} -> {}s", step.attempt, step.delay_seconds)))
                .collect();
            output.result(&schedule, &lines);
            if !policy.is_automatic() {
                output.message(&format!("{policy} is never retried automatically"));
            }
            Ok(())
        }
    }
}

fn load_classifier(cwd: &std::path::Path) -> Result<RetryClassifier> {
    let config = Config::discover_or_default(cwd)?;
    Ok(RetryClassifier::new(config.retry))
}

fn join_statuses(statuses: &[DeploymentStatus]) -> String {
    if statuses.is_empty() {
        return "(none)".to_string();
    }
    statuses
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionsReport {
    status: DeploymentStatus,
    terminal: bool,
    valid_next_states: Vec<DeploymentStatus>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackoffStep {
    attempt: u32,
    delay_seconds: u64,
}
