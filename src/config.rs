//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.prepcast.toml` files.

use crate::cli::OutputFormat;
use crate::forecast::PrepRules;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".prepcast.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Management service settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Prep item filtering.
    #[serde(default)]
    pub prep: PrepConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Watch mode settings.
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Where forecasts and stock are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the management service API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path of the forecast endpoint, relative to `api_url`.
    #[serde(default = "default_forecast_path")]
    pub forecast_path: String,

    /// Path of the stock endpoint, relative to `api_url`.
    #[serde(default = "default_stock_path")]
    pub stock_path: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Honor HTTP_PROXY / HTTPS_PROXY from the environment.
    #[serde(default = "default_true")]
    pub use_proxy: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            forecast_path: default_forecast_path(),
            stock_path: default_stock_path(),
            timeout_seconds: default_timeout(),
            use_proxy: true,
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_forecast_path() -> String {
    "/forecast".to_string()
}

fn default_stock_path() -> String {
    "/stocks".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Which prep items are worth showing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Items need strictly more than this quantity.
    #[serde(default = "default_min_quantity")]
    pub min_quantity: f64,

    /// Maximum items per notification.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            min_quantity: default_min_quantity(),
            max_items: default_max_items(),
        }
    }
}

fn default_min_quantity() -> f64 {
    0.8
}

fn default_max_items() -> usize {
    5
}

impl From<&PrepConfig> for PrepRules {
    fn from(config: &PrepConfig) -> Self {
        Self {
            min_quantity: config.min_quantity,
            max_items: config.max_items,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Include the top-ingredients table in Markdown reports.
    #[serde(default = "default_true")]
    pub include_top_ingredients: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            include_top_ingredients: true,
        }
    }
}

/// Watch mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between fetches of each source.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.prepcast.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref api_url) = args.api_url {
            self.source.api_url = api_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(min_quantity) = args.min_quantity {
            self.prep.min_quantity = min_quantity;
        }
        if let Some(max_items) = args.max_items {
            self.prep.max_items = max_items;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        if let Some(interval) = args.interval {
            self.watch.interval_seconds = interval;
        }
    }

    /// Check the merged configuration. File values get the same limits as
    /// the matching CLI flags.
    pub fn validate(&self) -> Result<()> {
        let url = &self.source.api_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("source.api_url must start with 'http://' or 'https://': {}", url);
        }

        if self.source.timeout_seconds == 0 {
            anyhow::bail!("source.timeout_seconds must be at least 1");
        }

        let min_quantity = self.prep.min_quantity;
        if !min_quantity.is_finite() || min_quantity < 0.0 {
            anyhow::bail!("prep.min_quantity must be a non-negative number, got {}", min_quantity);
        }

        if self.prep.max_items == 0 {
            anyhow::bail!("prep.max_items must be at least 1");
        }

        if self.watch.interval_seconds == 0 {
            anyhow::bail!("watch.interval_seconds must be at least 1");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
