//! Command-line flags for `prepcast`, parsed with clap and checked before
//! anything is fetched.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// PrepCast - prep notifications and traffic outlooks from forecast feeds
///
/// Fetches forecasts and stock levels from the management service, keeps
/// upcoming forecasts, and renders what to prep and when to expect a rush.
///
/// Examples:
///   prepcast
///   prepcast --api-url http://localhost:4000/api --format json
///   prepcast --forecast-file forecast.json --stock-file stocks.json
///   prepcast --dismiss-prep 12,14 --output dashboard.md
///   prepcast --watch --interval 30
///   prepcast --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the management service API
    ///
    /// Defaults to the config file value, then http://localhost:4000/api.
    #[arg(long, value_name = "URL", env = "PREPCAST_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .prepcast.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Read the forecast response from a file instead of the service
    #[arg(long, value_name = "FILE", requires = "stock_file")]
    pub forecast_file: Option<PathBuf>,

    /// Read the stock response from a file instead of the service
    #[arg(long, value_name = "FILE", requires = "forecast_file")]
    pub stock_file: Option<PathBuf>,

    /// Treat this day as today (YYYY-MM-DD); defaults to the local date
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Prep notification ids to hide (comma-separated)
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub dismiss_prep: Vec<i64>,

    /// Traffic forecast ids to hide (comma-separated)
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub dismiss_traffic: Vec<i64>,

    /// Minimum prep quantity; items must exceed it
    #[arg(long, value_name = "QTY")]
    pub min_quantity: Option<f64>,

    /// Maximum prep items per notification
    #[arg(long, value_name = "COUNT")]
    pub max_items: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Keep polling both sources and re-render on every change
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between polls in watch mode
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .prepcast.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.forecast_file.is_some() != self.stock_file.is_some() {
            return Err("--forecast-file and --stock-file must be used together".to_string());
        }

        for path in [&self.forecast_file, &self.stock_file].into_iter().flatten() {
            if !path.is_file() {
                return Err(format!("Input file does not exist: {}", path.display()));
            }
        }

        if let Some(min_quantity) = self.min_quantity {
            if !min_quantity.is_finite() || min_quantity < 0.0 {
                return Err("Minimum quantity must be a non-negative number".to_string());
            }
        }

        if self.max_items == Some(0) {
            return Err("Max items must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.interval == Some(0) {
            return Err("Interval must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
