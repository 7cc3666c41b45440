use std::path::{Path, PathBuf};

use clap::ValueEnum;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Prefix for environment variables that override config values
pub const ENV_PREFIX: &str = "FINGERPRINT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Location of the rocksdb database holding the log
    pub db_path: PathBuf,
    /// Output format for log lines
    pub log_format: LogFormat,
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("fingerprint-db"),
            log_format: LogFormat::Pretty,
            log_filter: String::from("info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Values from command line flags, which take priority over everything else
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Config {
    /// Layer defaults, then `file` (if it exists), then `FINGERPRINT_*` environment variables,
    /// then `overrides`
    pub fn figment(file: &Path, overrides: &Overrides) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
    }

    pub fn load(file: &Path, overrides: &Overrides) -> Result<Self, figment::Error> {
        Self::figment(file, overrides).extract()
    }
}
