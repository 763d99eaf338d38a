//! Command-line argument definitions for the notebook harness.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for the notebook harness.
#[derive(Debug, Parser)]
#[command(name = "notebook-harness")]
#[command(
    author,
    version,
    about = "Behaviour-driven HTTP checks for the training-notebook API"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Host of the API server under test.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port of the API server under test.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Default log filter, such as `debug` or `notebook_harness=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resolved server settings.
    Settings,

    /// Send one GET request and check its status code.
    Probe(ProbeArgs),
}

/// Arguments for the `probe` subcommand.
#[derive(Debug, Parser)]
pub struct ProbeArgs {
    /// Endpoint template, such as `/users/_user_id`.
    #[arg(required = true)]
    pub endpoint: String,

    /// Status code the server must respond with.
    #[arg(long)]
    pub expect: u16,

    /// Bearer token to authenticate with.
    #[arg(long)]
    pub token: Option<String>,

    /// Placeholder binding in `KEY=VALUE` form. May be repeated.
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

/// Parse a `KEY=VALUE` placeholder binding.
fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("placeholder name is empty in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
