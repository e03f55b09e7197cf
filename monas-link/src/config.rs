//! Link client configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const KEYS_DB_ENV: &str = "MONAS_LINK_KEYS_DB";
pub const IDENTITY_ENV: &str = "MONAS_LINK_IDENTITY";
pub const NO_COLOR_ENV: &str = "MONAS_LINK_NO_COLOR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration for the link client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// sled database holding the keys linked to the account
    pub keys_db_path: PathBuf,
    /// SSH identity used by the transport
    pub identity_path: Option<PathBuf>,
    /// Colour key listings
    pub color: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            keys_db_path: PathBuf::from("data/linked_keys"),
            identity_path: None,
            color: true,
        }
    }
}

impl LinkConfig {
    /// Reads a TOML config file. Missing fields fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = var(KEYS_DB_ENV).filter(|v| !v.is_empty()) {
            self.keys_db_path = PathBuf::from(path);
        }
        if let Some(path) = var(IDENTITY_ENV).filter(|v| !v.is_empty()) {
            self.identity_path = Some(PathBuf::from(path));
        }
        if var(NO_COLOR_ENV).is_some() {
            self.color = false;
        }
        self
    }
}
