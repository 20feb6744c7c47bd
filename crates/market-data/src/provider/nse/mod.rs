//! National Stock Exchange of India option-chain provider.
//!
//! NSE serves option chains from its public website API. The API rejects
//! requests that do not carry the session cookies set by the website, so
//! every fetch first visits the option-chain page with a cookie-enabled
//! client and then calls the JSON endpoint.
//!
//! # API Endpoints
//!
//! - Indices: `https://www.nseindia.com/api/option-chain-indices?symbol={symbol}`
//! - Equities: `https://www.nseindia.com/api/option-chain-equities?symbol={symbol}`
//!
//! # Response Format
//!
//! A nested object with `records` (all expiries: `expiryDates`, `data`,
//! `strikePrices`, `underlyingValue`, `timestamp`) and `filtered` (nearest
//! expiry with CE/PE totals). An empty object means the session was refused.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client};
use serde_json::Value;
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::provider::OptionChainProvider;

const BASE_URL: &str = "https://www.nseindia.com";
const PROVIDER_ID: &str = "NSE";

/// Timeout of each NSE request; a fetch makes two (session page, then API).
pub const NSE_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Underlyings served by the indices endpoint; everything else is an equity.
pub const NSE_INDEX_SYMBOLS: &[&str] = &[
    "NIFTY",
    "BANKNIFTY",
    "FINNIFTY",
    "MIDCPNIFTY",
    "NIFTYNXT50",
];

/// Which NSE option-chain endpoint serves a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NseSegment {
    Indices,
    Equities,
}

impl NseSegment {
    pub fn for_symbol(symbol: &str) -> Self {
        if NSE_INDEX_SYMBOLS
            .iter()
            .any(|index| index.eq_ignore_ascii_case(symbol))
        {
            Self::Indices
        } else {
            Self::Equities
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::Indices => "/api/option-chain-indices",
            Self::Equities => "/api/option-chain-equities",
        }
    }
}

/// NSE option-chain provider.
///
/// # Example
///
/// ```ignore
/// let provider = NseProvider::new().unwrap();
/// let chain = provider.fetch_option_chain("NIFTY").await?;
/// ```
pub struct NseProvider {
    client: Client,
    base_url: String,
}

impl NseProvider {
    /// Create a provider pointed at the public NSE website.
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_base_url(BASE_URL)
    }

    /// Create a provider pointed at an alternative host (mirrors, test servers).
    ///
    /// Fails if the HTTP client cannot be built; a client without the cookie
    /// store is useless against NSE.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(NSE_REQUEST_TIMEOUT)
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the JSON endpoint URL for a symbol.
    pub fn option_chain_url(&self, symbol: &str) -> String {
        format!(
            "{}{}?symbol={}",
            self.base_url,
            NseSegment::for_symbol(symbol).path(),
            encode(symbol)
        )
    }

    /// Visit the option-chain page so the cookie store holds a valid session.
    async fn prime_session(&self) {
        let url = format!("{}/option-chain", self.base_url);
        match self
            .client
            .get(&url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
        {
            Ok(response) => debug!("NSE session primed: {}", response.status()),
            // The API call below reports the real failure if the session is unusable.
            Err(e) => warn!("Failed to prime NSE session: {}", e),
        }
    }

    fn map_request_error(error: reqwest::Error) -> MarketDataError {
        if error.is_timeout() {
            MarketDataError::Timeout {
                provider: PROVIDER_ID.to_string(),
            }
        } else {
            MarketDataError::Network(error)
        }
    }

    /// Fetch and decode the JSON endpoint.
    async fn fetch(&self, symbol: &str) -> Result<Value, MarketDataError> {
        let url = self.option_chain_url(symbol);
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(header::REFERER, format!("{}/option-chain", self.base_url))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Check for other HTTP errors
        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP error: {}", response.status()),
            });
        }

        let body = response.text().await.map_err(Self::map_request_error)?;
        let payload: Value =
            serde_json::from_str(&body).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        if payload.as_object().is_some_and(|map| map.is_empty()) {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        Ok(payload)
    }
}

#[async_trait]
impl OptionChainProvider for NseProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_option_chain(&self, symbol: &str) -> Result<Value, MarketDataError> {
        self.prime_session().await;
        self.fetch(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_provider_id() {
        let provider = NseProvider::new().unwrap();
        assert_eq!(provider.id(), "NSE");
    }

    #[test]
    fn test_index_symbols_use_indices_endpoint() {
        assert_eq!(NseSegment::for_symbol("NIFTY"), NseSegment::Indices);
        assert_eq!(NseSegment::for_symbol("banknifty"), NseSegment::Indices);
        assert_eq!(NseSegment::for_symbol("RELIANCE"), NseSegment::Equities);
    }

    #[test]
    fn test_option_chain_url() {
        let provider = NseProvider::new().unwrap();
        assert_eq!(
            provider.option_chain_url("FINNIFTY"),
            "https://www.nseindia.com/api/option-chain-indices?symbol=FINNIFTY"
        );
        assert_eq!(
            provider.option_chain_url("M&M"),
            "https://www.nseindia.com/api/option-chain-equities?symbol=M%26M"
        );
    }

    #[test]
    fn test_custom_base_url_drops_trailing_slash() {
        let provider = NseProvider::with_base_url("http://127.0.0.1:9000/").unwrap();
        assert_eq!(
            provider.option_chain_url("TCS"),
            "http://127.0.0.1:9000/api/option-chain-equities?symbol=TCS"
        );
    }

    /// Serve one canned reply for every API call; the session page always answers 200.
    async fn canned_nse(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    while read < buf.len() {
                        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let head = String::from_utf8_lossy(&buf[..read]);
                    let (status, body) = if head.starts_with("GET /option-chain ") {
                        ("200 OK", "<html></html>")
                    } else {
                        (status, body)
                    };
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_returns_payload() {
        let provider =
            NseProvider::with_base_url(canned_nse("200 OK", r#"{"records":{}}"#).await).unwrap();

        let payload = provider.fetch_option_chain("NIFTY").await.unwrap();
        assert_eq!(payload, serde_json::json!({"records": {}}));
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let provider =
            NseProvider::with_base_url(canned_nse("429 Too Many Requests", "").await).unwrap();

        let err = provider.fetch_option_chain("NIFTY").await.unwrap_err();
        assert!(matches!(err, MarketDataError::RateLimited { ref provider } if provider == "NSE"));
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let provider =
            NseProvider::with_base_url(canned_nse("401 Unauthorized", "").await).unwrap();

        let err = provider.fetch_option_chain("RELIANCE").await.unwrap_err();
        match err {
            MarketDataError::ProviderError { provider, message } => {
                assert_eq!(provider, "NSE");
                assert_eq!(message, "HTTP error: 401 Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_object_is_symbol_not_found() {
        let provider = NseProvider::with_base_url(canned_nse("200 OK", "{}").await).unwrap();

        let err = provider.fetch_option_chain("NIFTY").await.unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(ref s) if s == "NIFTY"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_provider_error() {
        let provider =
            NseProvider::with_base_url(canned_nse("200 OK", "<html>blocked</html>").await)
                .unwrap();

        let err = provider.fetch_option_chain("TCS").await.unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = NseProvider::with_base_url(format!("http://{addr}")).unwrap();
        let err = provider.fetch_option_chain("NIFTY").await.unwrap_err();
        assert!(matches!(err, MarketDataError::Network(_)));
        assert!(err.is_provider_failure());
    }
}
