// Dashboard configuration loaded from `kakeibo.toml`.
// Every key is optional. A missing default config file means defaults;
// a config file named explicitly on the command line must exist.

use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::domain::Yen;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "kakeibo.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Directory holding the `YYYY-MM.toml` month files. Relative paths are
    /// resolved against the directory of the config file.
    pub data_dir: PathBuf,
    /// Account balance immediately before the earliest transaction.
    pub seed_balance: Yen,
    /// IANA zone used to decide which calendar day a transaction falls on.
    pub timezone: Tz,
    /// Printed after every amount.
    pub currency_suffix: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            seed_balance: 0,
            timezone: chrono_tz::Asia::Tokyo,
            currency_suffix: "円".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_seed_balance(mut self, seed_balance: Yen) -> Self {
        self.seed_balance = seed_balance;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Parse configuration from TOML text.
pub fn parse_config(text: &str) -> Result<DashboardConfig, toml::de::Error> {
    toml::from_str(text)
}

/// Load configuration from `path`.
pub fn load_config(path: &Path) -> Result<DashboardConfig, ConfigError> {
    debug!(path = %path.display(), "Loading configuration");

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = parse_config(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    if config.data_dir.is_relative() {
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.data_dir = base.join(&config.data_dir);
        }
    }

    Ok(config)
}

/// Load `path` if given, else the default config file if it exists, else defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                load_config(default_path)
            } else {
                debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                Ok(DashboardConfig::default())
            }
        }
    }
}
