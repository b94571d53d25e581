//! HTTP client for the management service.

use crate::config::SourceConfig;
use crate::source::SourceError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Fetches `/forecast` and `/stocks` from the management service.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    forecast_url: String,
    stock_url: String,
    timeout_seconds: u64,
}

impl HttpSource {
    /// Create a client for the service described by `config`.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let mut builder =
            reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_seconds));
        if !config.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(SourceError::Client)?;

        let base_url = config.api_url.trim_end_matches('/').to_string();
        info!("Using management service at {}", base_url);

        Ok(Self {
            forecast_url: join_url(&base_url, &config.forecast_path),
            stock_url: join_url(&base_url, &config.stock_path),
            base_url,
            client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_forecasts(&self) -> Result<Value, SourceError> {
        self.get_json(&self.forecast_url).await
    }

    pub async fn fetch_stock(&self) -> Result<Value, SourceError> {
        self.get_json(&self.stock_url).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout_seconds,
                }
            } else if e.is_connect() {
                SourceError::Connect {
                    url: url.to_string(),
                    source: e,
                }
            } else {
                SourceError::Request {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| SourceError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response per connection.
    async fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/api", addr)
    }

    fn config(api_url: String) -> SourceConfig {
        SourceConfig {
            api_url,
            use_proxy: false,
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://x/api", "/forecast"), "http://x/api/forecast");
        assert_eq!(join_url("http://x/api", "stocks"), "http://x/api/stocks");
    }

    #[tokio::test]
    async fn test_fetch_forecasts() {
        let url = serve(vec![(200, r#"{"forecast": []}"#)]).await;
        let source = HttpSource::new(&config(url)).unwrap();

        let value = source.fetch_forecasts().await.unwrap();
        assert!(value["forecast"].is_array());
    }

    #[tokio::test]
    async fn test_error_status() {
        let url = serve(vec![(500, r#"{"error": "Internal server error"}"#)]).await;
        let source = HttpSource::new(&config(url)).unwrap();

        let err = source.fetch_stock().await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_body_not_json() {
        let url = serve(vec![(200, "<html>")]).await;
        let source = HttpSource::new(&config(url)).unwrap();

        let err = source.fetch_forecasts().await.unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpSource::new(&config(format!("http://{}", addr))).unwrap();
        let err = source.fetch_forecasts().await.unwrap_err();
        assert!(matches!(err, SourceError::Connect { .. }));
    }
}
