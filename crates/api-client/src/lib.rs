use async_trait::async_trait;
use configuration::{MarketDataConfig, PROVIDER_MAX_PER_PAGE};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;

pub mod error;
pub mod responses;
pub mod transform;

// --- Public API ---
pub use error::{ApiError, TransformError};
pub use responses::{ApiErrorResponse, RawRecord};
pub use transform::{transform, Clock, RecordTransformer};

/// Quote currency for every price, cap and volume the tracker publishes.
pub const VS_CURRENCY: &str = "usd";

/// The abstract interface for a market data provider.
/// The tracker loop depends on this trait only, so the underlying
/// implementation (live or scripted) can be swapped out.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Fetches the first page of `n` assets ordered by market cap, descending.
    ///
    /// All-or-nothing: either every record of the page is returned or an error.
    async fn fetch(&self, n: u32) -> Result<Vec<RawRecord>, ApiError>;
}

/// A concrete implementation of the `MarketDataClient` for the CoinGecko API.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("crypto-tracker/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataClient for CoinGeckoClient {
    async fn fetch(&self, n: u32) -> Result<Vec<RawRecord>, ApiError> {
        if n == 0 || n > PROVIDER_MAX_PER_PAGE {
            return Err(ApiError::InvalidRequest(format!(
                "page size must be between 1 and {PROVIDER_MAX_PER_PAGE}, got {n}"
            )));
        }

        let url = format!("{}/coins/markets", self.base_url);
        let per_page = n.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", VS_CURRENCY),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_error) => format!(
                    "{} (code {})",
                    api_error.status.error_message, api_error.status.error_code
                ),
                Err(_) => text.chars().take(200).collect(),
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let records = serde_json::from_str::<Vec<RawRecord>>(&text)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        if records.len() > n as usize {
            return Err(ApiError::InvalidData(format!(
                "requested {n} records, received {}",
                records.len()
            )));
        }

        tracing::debug!(count = records.len(), "Fetched market records.");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves exactly one canned HTTP response and hands back the request line.
    async fn serve_once(status: &str, body: &str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8_lossy(&buf[..read]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (format!("http://{addr}"), rx)
    }

    fn client_for(base_url: String) -> CoinGeckoClient {
        CoinGeckoClient::new(&MarketDataConfig {
            base_url,
            top_n: 50,
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_sends_fixed_query_and_parses_records() {
        let body = r#"[
            {"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":67000.5,
             "market_cap":1320000000000,"total_volume":25000000000,
             "price_change_percentage_24h":-1.5,"image":"ignored"},
            {"id":"ethereum","symbol":"eth","name":"Ethereum","current_price":3500,
             "market_cap":420000000000,"total_volume":12000000000,
             "price_change_percentage_24h":null}
        ]"#;
        let (base_url, request_rx) = serve_once("200 OK", body).await;

        let records = client_for(base_url).fetch(2).await.unwrap();

        let request_line = request_rx.await.unwrap();
        assert!(request_line.starts_with("GET /coins/markets?"));
        for param in [
            "vs_currency=usd",
            "order=market_cap_desc",
            "per_page=2",
            "page=1",
            "sparkline=false",
        ] {
            assert!(request_line.contains(param), "missing {param} in {request_line}");
        }

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol.as_deref(), Some("btc"));
        assert_eq!(records[0].current_price, Some(dec!(67000.5)));
        assert_eq!(records[0].market_cap, Some(dec!(1320000000000)));
        assert_eq!(records[1].price_change_percentage_24h, None);
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let body = r#"{"status":{"error_code":429,"error_message":"You've exceeded the Rate Limit."}}"#;
        let (base_url, _rx) = serve_once("429 Too Many Requests", body).await;

        let err = client_for(base_url).fetch(50).await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate Limit"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_fetch_error() {
        let (base_url, _rx) = serve_once("200 OK", r#"{"not":"an array"}"#).await;
        let err = client_for(base_url).fetch(50).await.unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[tokio::test]
    async fn over_long_page_is_rejected() {
        let body = r#"[{"id":"a"},{"id":"b"}]"#;
        let (base_url, _rx) = serve_once("200 OK", body).await;
        let err = client_for(base_url).fetch(1).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidData(_)));
    }

    #[tokio::test]
    async fn page_size_out_of_range_never_hits_the_network() {
        // Nothing listens on this port; a request would surface as RequestBuild.
        let client = client_for("http://127.0.0.1:9".to_string());
        assert!(matches!(client.fetch(0).await, Err(ApiError::InvalidRequest(_))));
        assert!(matches!(
            client.fetch(PROVIDER_MAX_PER_PAGE + 1).await,
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
