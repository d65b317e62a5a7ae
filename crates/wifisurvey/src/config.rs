//! Configuration management for wifisurvey.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::room::RequiredPolicy;
use crate::view::{ChartOptions, TableOptions, DEFAULT_EMPTY_MESSAGE, DEFAULT_PLACEHOLDER};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "wifisurvey";

/// Environment variable prefix.
const ENV_PREFIX: &str = "WIFISURVEY_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WIFISURVEY_`, sections split on `__`)
/// 2. TOML config file at `~/.config/wifisurvey/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Form configuration.
    pub form: FormConfig,
    /// Table configuration.
    pub table: TableConfig,
    /// Chart configuration.
    pub chart: ChartConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Form-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Which fields a submission may leave empty.
    pub required_policy: RequiredPolicy,
}

/// Table-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Text shown in empty cells.
    pub placeholder: String,
    /// Text shown when no rooms are recorded.
    pub empty_message: String,
}

/// Chart-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Lower end of the signal axis, in dBm.
    pub signal_min_dbm: f64,
    /// Upper end of the signal axis, in dBm.
    pub signal_max_dbm: f64,
    /// Length of a full-scale bar in characters.
    pub bar_width: usize,
}

/// Output-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default rendering of tables and charts.
    pub format: OutputFormat,
    /// Print the table after every change to the store.
    pub render_on_change: bool,
}

/// How projections are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Aligned text.
    #[default]
    Table,
    /// JSON documents.
    Json,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            signal_min_dbm: -90.0,
            signal_max_dbm: 0.0,
            bar_width: 40,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            render_on_change: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `WIFISURVEY_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.chart.signal_min_dbm.is_finite() || !self.chart.signal_max_dbm.is_finite() {
            return Err(Error::ConfigValidation {
                message: "signal axis bounds must be finite numbers".to_string(),
            });
        }

        if self.chart.signal_min_dbm >= self.chart.signal_max_dbm {
            return Err(Error::ConfigValidation {
                message: format!(
                    "signal_min_dbm ({}) must be less than signal_max_dbm ({})",
                    self.chart.signal_min_dbm, self.chart.signal_max_dbm
                ),
            });
        }

        if self.chart.bar_width == 0 {
            return Err(Error::ConfigValidation {
                message: "bar_width must be greater than 0".to_string(),
            });
        }

        if self.table.placeholder.is_empty() {
            return Err(Error::ConfigValidation {
                message: "placeholder must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Table options derived from this configuration.
    #[must_use]
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            placeholder: self.table.placeholder.clone(),
            empty_message: self.table.empty_message.clone(),
        }
    }

    /// Chart options derived from this configuration.
    #[must_use]
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            signal_domain: (self.chart.signal_min_dbm, self.chart.signal_max_dbm),
            bar_width: self.chart.bar_width,
        }
    }
}
