//! Data sources for forecasts and stock.
//!
//! Both payloads come either from the management service over HTTP or from
//! local JSON files (offline mode). Fetch errors are typed so callers can
//! tell a service that is down from one that answered with garbage.

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::models::StockRecord;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Errors raised while fetching a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("cannot connect to {url}: is the management service running?")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("{url} returned a body that is not JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where forecasts and stock are read from.
pub enum ForecastSource {
    Http(HttpSource),
    Files(FileSource),
}

impl ForecastSource {
    /// Fetch the raw forecast response. Its shape is not checked here.
    pub async fn fetch_forecasts(&self) -> Result<Value, SourceError> {
        match self {
            ForecastSource::Http(source) => source.fetch_forecasts().await,
            ForecastSource::Files(source) => source.fetch_forecasts().await,
        }
    }

    /// Fetch and decode the stock list.
    pub async fn fetch_stock(&self) -> Result<Vec<StockRecord>, SourceError> {
        let raw = match self {
            ForecastSource::Http(source) => source.fetch_stock().await?,
            ForecastSource::Files(source) => source.fetch_stock().await?,
        };
        Ok(decode_stock(&raw))
    }

    /// Fetch both payloads concurrently.
    pub async fn fetch_both(
        &self,
    ) -> (
        Result<Value, SourceError>,
        Result<Vec<StockRecord>, SourceError>,
    ) {
        tokio::join!(self.fetch_forecasts(), self.fetch_stock())
    }

    /// Human-readable origin for report metadata.
    pub fn describe(&self) -> String {
        match self {
            ForecastSource::Http(source) => source.base_url().to_string(),
            ForecastSource::Files(source) => source.describe(),
        }
    }
}

/// A completed fetch of one source.
#[derive(Debug)]
pub enum SourceUpdate {
    Forecasts(Result<Value, SourceError>),
    Stock(Result<Vec<StockRecord>, SourceError>),
}

/// Poll both sources every `period`, each on its own task, sending every
/// result to `tx`. Tasks stop once the receiver is dropped.
pub fn spawn_pollers(
    source: Arc<ForecastSource>,
    period: Duration,
    tx: mpsc::Sender<SourceUpdate>,
) -> Vec<JoinHandle<()>> {
    let forecasts = {
        let source = Arc::clone(&source);
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let update = SourceUpdate::Forecasts(source.fetch_forecasts().await);
                if tx.send(update).await.is_err() {
                    debug!("Forecast poller stopping");
                    break;
                }
            }
        })
    };

    let stock = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let update = SourceUpdate::Stock(source.fetch_stock().await);
            if tx.send(update).await.is_err() {
                debug!("Stock poller stopping");
                break;
            }
        }
    });

    vec![forecasts, stock]
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StockPayload {
    List(Vec<Value>),
    Wrapped { stock: Box<StockPayload> },
    Single(Value),
}

/// Decode a stock response: `{ stock: [..] }`, `{ stock: {..} }` or a bare
/// array. Unreadable rows are skipped.
pub fn decode_stock(raw: &Value) -> Vec<StockRecord> {
    let rows = match StockPayload::deserialize(raw) {
        Ok(payload) => flatten_stock(payload),
        Err(e) => {
            warn!("Unrecognized stock response: {}", e);
            return Vec::new();
        }
    };

    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<StockRecord>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable stock record: {}", e);
                None
            }
        })
        .collect()
}

fn flatten_stock(payload: StockPayload) -> Vec<Value> {
    match payload {
        StockPayload::List(rows) => rows,
        StockPayload::Wrapped { stock } => flatten_stock(*stock),
        StockPayload::Single(row) if row.is_object() => vec![row],
        StockPayload::Single(other) => {
            warn!("Unrecognized stock response: {}", other);
            Vec::new()
        }
    }
}
