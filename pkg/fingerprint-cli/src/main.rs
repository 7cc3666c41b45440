#![warn(clippy::pedantic)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use fingerprint::FingerprintLog;
use mmr::storage::Persistent;

use crate::{
    command::Command,
    config::{Config, LogFormat, Overrides},
};

mod command;
mod config;
mod logging;

/// Record document fingerprints in an append-only Merkle Mountain Range
#[derive(Debug, Parser)]
#[command(name = "fingerprint", version)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, short, env = "FINGERPRINT_CONFIG", default_value = "fingerprint.toml")]
    config: PathBuf,

    /// Location of the rocksdb database holding the log
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Output format for log lines
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Log filter directives, e.g. `debug` or `fingerprint=trace`
    #[arg(long)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            db_path: self.db_path.clone(),
            log_format: self.log_format,
            log_filter: self.log_filter.clone(),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = Config::load(&cli.config, &cli.overrides())?;
    logging::init(&config)?;

    tracing::debug!(?config, "loaded config");

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let persistent = Persistent::load(&config.db_path)?;
    let mut log = FingerprintLog::from_accumulator(persistent)?;

    let stdout = std::io::stdout();
    cli.command.run(&mut log, &mut stdout.lock())
}
