//! Handoff - deliver a freshly captured image to a waiting editor
//!
//! The editor side runs `handoff <DESTINATION>` and blocks until one capture
//! arrives. The capture tool runs `handoff --send <PATH>` and exits.

mod cli;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Role, EXIT_USAGE, PROGRAM_NAME};
use handoff_core::report::{headline, FailureReporter, StderrReporter};
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let level = level.as_str().to_lowercase();
    let filter = EnvFilter::try_new(format!("handoff={},handoff_core={}", level, level))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    debug!("Handoff v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = cli.config();
    let reporter = StderrReporter::new(PROGRAM_NAME);

    let code = match cli.role() {
        Ok(Role::Serve(destination)) => cli::serve::handle(&config, destination, &reporter).await,
        Ok(Role::Send(source)) => cli::send::handle(&config, &source, &reporter).await,
        Err(e) => {
            reporter.report(&headline(e.class(), config.port), &e);
            eprintln!("{}", Cli::command().render_usage());
            EXIT_USAGE
        }
    };

    Ok(ExitCode::from(code))
}
