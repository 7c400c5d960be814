//! # DonationHub CLI
//!
//! Operator tooling over the platform: inspect the registered gateways, push a donation or a
//! legacy purchase through them, and evaluate conditional fields of a form document.
//!
//! Every command prints JSON on stdout; logs go to stderr.
//!
//! ## Example
//! ```no_run
//! use clap::Parser;
//! use dhub::domain::config::PlatformConfig;
//! use dhub_cli::{Cli, run};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["dhub-cli", "gateways"]);
//!     let platform = dhub::bootstrap(&PlatformConfig::default())?;
//!     run(cli.command, &platform, &mut std::io::stdout()).await
//! }
//! ```

mod commands;

pub use crate::commands::{FormsReport, GatewayEntry, gateway_list, replay_forms};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dhub::Platform;
use dhub::domain::config::LoggingConfig;
use dhub_logger::{LevelFilter, Logger};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "dhub-cli", version, about = "DonationHub gateway and form tooling")]
pub struct Cli {
    /// Configuration file; without it an optional `dhub.toml` is read from the working directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered gateways with their legacy labels.
    Gateways,
    /// Dispatch a payment request (JSON file) to a gateway.
    Donate {
        #[arg(short, long)]
        gateway: String,
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Run a legacy purchase (JSON file) through the legacy gateway list.
    Legacy {
        #[arg(short, long)]
        gateway: String,
        #[arg(short, long)]
        purchase: PathBuf,
    },
    /// Print the legacy form-field markup of a gateway.
    Markup {
        #[arg(short, long)]
        gateway: String,
        #[arg(short, long)]
        form: u64,
    },
    /// Evaluate field visibility of a document, then replay form events against it.
    Forms {
        #[arg(short, long)]
        document: PathBuf,
        #[arg(short, long)]
        events: Option<PathBuf>,
    },
}

/// Runs one command against a bootstrapped platform and writes its JSON result to `out`.
///
/// # Errors
/// Unreadable or malformed input files, and any gateway or visibility error of the command.
pub async fn run(command: Command, platform: &Platform, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Gateways => write_json(out, &gateway_list(platform)),
        Command::Donate { gateway, request } => {
            let request = read_json(&request)?;
            let outcome = platform.dispatcher().dispatch(&gateway, &request)?;
            write_json(out, &outcome)
        },
        Command::Legacy { gateway, purchase } => {
            let purchase = read_json(&purchase)?;
            let outcome = platform.legacy.dispatch(&gateway, &purchase)?;
            write_json(out, &outcome)
        },
        Command::Markup { gateway, form } => {
            let markup = platform.legacy.adapter(&gateway)?.form_field_markup(form)?;
            write_json(out, &markup)
        },
        Command::Forms { document, events } => {
            let document = read_json(&document)?;
            let events = events.map(|path| read_json(&path)).transpose()?.unwrap_or_default();
            let report = replay_forms(platform, document, events).await?;
            write_json(out, &report)
        },
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
/// An unknown level name or any [`dhub_logger::LoggerError`].
pub fn init_logger(config: &LoggingConfig) -> Result<Logger> {
    let level: LevelFilter =
        config.level.parse().with_context(|| format!("Invalid log level {:?}", config.level))?;

    let mut builder =
        Logger::builder().name(&config.name).console(config.console).ansi(config.ansi).level(level);
    if let Some(filter) = &config.filter {
        builder = builder.env_filter(filter);
    }

    let logger = match &config.file {
        Some(file) => builder
            .path(file.directory.clone())
            .max_files(file.max_files)
            .json(file.json)
            .init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed JSON in {}", path.display()))
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
