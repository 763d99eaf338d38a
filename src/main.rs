//! `notebook-harness` application entry point.
//!
//! This binary exercises the harness outside a behaviour-test run. It uses
//! `eyre` for opaque error handling at the application boundary, converting
//! domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/notebook-harness/config.yaml` or path from
//!    `NOTEBOOK_HARNESS_CONFIG_PATH`)
//! 3. Environment variables (`NOTEBOOK_HARNESS_*`)
//! 4. Command-line arguments

use std::collections::BTreeMap;

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use notebook_harness::config::{Cli, Commands, HarnessConfig, ProbeArgs, load_config};
use notebook_harness::error::Result as HarnessResult;
use notebook_harness::http::{BearerToken, HttpExecutor, assert_status};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor `log_level` is set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Application entry point.
///
/// Loads configuration with layered precedence via `OrthoConfig`, installs the
/// log subscriber, then dispatches to the appropriate subcommand handler.
fn main() -> EyreResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;
    init_tracing(&config);

    run(&cli, &config).map_err(Report::from)
}

/// Install a stderr subscriber filtered by `RUST_LOG` or the configured level.
fn init_tracing(config: &HarnessConfig) {
    let level = config.log_level.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Execute the CLI command, returning domain-specific errors.
///
/// Keeps semantic errors inside the run loop so the CLI boundary owns
/// conversion to `eyre::Report`.
fn run(cli: &Cli, config: &HarnessConfig) -> HarnessResult<()> {
    match &cli.command {
        Commands::Settings => show_settings(config),
        Commands::Probe(args) => probe(config, args),
    }
}

/// Print the resolved server location and client limits.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn show_settings(config: &HarnessConfig) -> HarnessResult<()> {
    let server = config.server.validate()?;
    println!("Base URL: {}", server.base_url());
    println!("Timeout: {} ms", config.client.timeout_ms);
    Ok(())
}

/// Send one GET request and check its status code.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn probe(config: &HarnessConfig, args: &ProbeArgs) -> HarnessResult<()> {
    let server = config.server.validate()?;
    let executor = HttpExecutor::new(&server, &config.client)?;
    let params: BTreeMap<String, String> = args.params.iter().cloned().collect();
    let token = args.token.as_deref().map(BearerToken::new);

    let response = executor.send_get(&args.endpoint, &params, token.as_ref())?;
    info!(status = response.status, "probe completed");
    assert_status(&response, args.expect)?;
    println!("GET {} -> {}", args.endpoint, response.status);
    Ok(())
}
