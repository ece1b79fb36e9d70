//! stackmond — keeps synthetic monitoring in line with Terraform state.
//!
//! Runs as an AWS Lambda function subscribed to S3 notifications on the
//! state bucket. Each `ObjectCreated:Put` on a state object reconciles
//! that stack's vendor tests:
//! - State fetched from S3
//! - Vendor credentials from Secrets Manager
//! - Desired endpoints diffed against the vendor inventory
//! - Missing tests created, stale tests deleted
//!
//! # Usage
//!
//! ```text
//! stackmond                              # Lambda runtime (default)
//! stackmond replay event.json --dry-run  # one stored notification, locally
//! ```

mod handler;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lambda_runtime::{LambdaEvent, service_fn};
use tracing::info;
use tracing_subscriber::EnvFilter;

use stackmon_core::{ReconcilerConfig, S3Event};

use crate::handler::{EventHandler, load_event};

const DEFAULT_LOG_FILTER: &str = "info,stackmon=debug,stackmond=debug";
const ENV_CONFIG: &str = "STACKMON_CONFIG";
const ENV_LOG_FORMAT: &str = "STACKMON_LOG_FORMAT";

#[derive(Parser)]
#[command(name = "stackmond", about = "Terraform state to synthetic monitoring reconciler")]
struct Cli {
    /// Path to stackmon.toml. Falls back to $STACKMON_CONFIG.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Plan and log vendor actions without sending them.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve S3 notifications from the Lambda runtime.
    Lambda,

    /// Handle one S3 notification read from a JSON file.
    Replay {
        /// S3 event notification document.
        event: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));
    let mut config = ReconcilerConfig::load(config_path.as_deref()).context("failed to load configuration")?;
    if cli.dry_run {
        config.dry_run = true;
    }
    info!(config = ?config_path, dry_run = config.dry_run, "configuration loaded");

    match cli.command.unwrap_or(Command::Lambda) {
        Command::Lambda => run_lambda(config).await,
        Command::Replay { event } => run_replay(config, event).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var(ENV_LOG_FORMAT).is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_lambda(config: ReconcilerConfig) -> anyhow::Result<()> {
    info!("stackmond starting in Lambda mode");
    let handler = Arc::new(EventHandler::from_env(config).await);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Event>| {
        let handler = Arc::clone(&handler);
        async move {
            info!(request_id = %event.context.request_id, records = event.payload.records.len(), "invocation");
            let reports = handler.handle(&event.payload).await?;
            Ok::<_, lambda_runtime::Error>(reports)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}

async fn run_replay(config: ReconcilerConfig, path: PathBuf) -> anyhow::Result<()> {
    let event = load_event(&path)?;
    info!(path = %path.display(), records = event.records.len(), "replaying stored event");

    let handler = EventHandler::from_env(config).await;
    let reports = handler.handle(&event).await?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
