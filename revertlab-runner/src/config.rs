//! TOML run configuration.
//!
//! ```toml
//! [backtest]
//! symbol = "PETR4.SA"
//! prices = "data/PETR4.SA.csv"
//! start_date = "2015-01-02"   # optional
//! end_date = "2024-12-31"     # optional
//!
//! [strategy]                  # every field optional
//! window = 22
//! entry_threshold = 30.0
//! exit_threshold = 40.0
//! max_holding = 10
//! ```

use chrono::NaiveDate;
use revertlab_core::{EngineError, StrategyParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Strategy(#[from] EngineError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    /// CSV price file. Relative paths resolve against the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Serializable configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategyParams,
}

impl BacktestConfig {
    /// Default configuration for a symbol, reading prices from `prices`.
    pub fn for_symbol(symbol: impl Into<String>, prices: Option<PathBuf>) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.into(),
                prices,
                start_date: None,
                end_date: None,
            },
            strategy: StrategyParams::default(),
        }
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(prices), Some(dir)) = (config.backtest.prices.as_mut(), path.parent()) {
            if prices.is_relative() {
                *prices = dir.join(&*prices);
            }
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("backtest.symbol must not be empty".into()));
        }
        if let (Some(start), Some(end)) = (self.backtest.start_date, self.backtest.end_date) {
            if start > end {
                return Err(ConfigError::Invalid(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        self.strategy.validate()?;
        Ok(())
    }
}
