//! Offline source reading saved JSON responses from disk.

use crate::source::SourceError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads the forecast and stock payloads from two files.
#[derive(Debug, Clone)]
pub struct FileSource {
    forecast_path: PathBuf,
    stock_path: PathBuf,
}

impl FileSource {
    pub fn new(forecast_path: PathBuf, stock_path: PathBuf) -> Self {
        Self {
            forecast_path,
            stock_path,
        }
    }

    pub async fn fetch_forecasts(&self) -> Result<Value, SourceError> {
        read_json(&self.forecast_path).await
    }

    pub async fn fetch_stock(&self) -> Result<Value, SourceError> {
        read_json(&self.stock_path).await
    }

    pub fn describe(&self) -> String {
        format!(
            "{} + {}",
            self.forecast_path.display(),
            self.stock_path.display()
        )
    }
}

async fn read_json(path: &Path) -> Result<Value, SourceError> {
    debug!("Reading {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    serde_json::from_str(&content).map_err(|e| SourceError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}
