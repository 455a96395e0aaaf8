//! Settings file (`epimap.toml`).
//!
//! Every field has a default, so an absent file or an empty one is valid.
//! Command-line flags are applied on top by the binary.

use crate::scale::ScaleOptions;
use crate::types::MetricFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "epimap.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// National dataset: one row per province per day.
    pub data: String,
    /// Directory holding the per-province city datasets.
    pub province_data_dir: PathBuf,
    pub metric: MetricFilter,
    pub scale: ScaleOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: "data/provinces.csv".to_string(),
            province_data_dir: PathBuf::from("data/provinces"),
            metric: MetricFilter::default(),
            scale: ScaleOptions::default(),
        }
    }
}

impl Config {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] for malformed TOML or unknown keys.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Read `path` if given, else `epimap.toml` if it exists, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit or existing file is invalid.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            log::debug!("Using {}", default_path.display());
            return Self::load(default_path);
        }
        Ok(Self::default())
    }
}
