//! Batch configuration file.
//!
//! A config file lists several competitions and one filter to apply to all
//! of them. YAML and JSON are both accepted:
//!
//! ```yaml
//! competitions:
//!   - https://reggiebeer.com/ReggieWeb.php?Web=1000882
//!   - https://beerawardsplatform.com/2025-ash-copper-state-cup/results
//! brewers: ["Donald Schneider", "Jane Roe"]
//! club: Lakewood Fermentation Club
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::Filter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config format: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub competitions: Vec<String>,
    #[serde(default)]
    pub brewers: Vec<String>,
    #[serde(default)]
    pub club: Option<String>,
}

impl BatchConfig {
    /// Parse config text. JSON is valid YAML, so one parser covers both.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: BatchConfig = serde_yaml::from_str(text)?;
        if config.competitions.is_empty() {
            return Err(ConfigError::Invalid(
                "`competitions` must list at least one url".to_string(),
            ));
        }
        Ok(config)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = Self::parse(&text)?;
        info!(competitions = config.competitions.len(), "Loaded batch config");
        Ok(config)
    }

    /// The filter implied by `brewers` and `club`.
    pub fn filter(&self) -> Filter {
        let brewers = self
            .brewers
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Filter::new(Some(brewers), self.club.clone())
    }
}
