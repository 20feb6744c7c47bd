use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::provider::OptionChainProvider;

const PROVIDER_ID: &str = "STATIC";

/// In-memory provider that always returns the same payload (or the same failure).
///
/// Counts how often it is called so callers can observe cache behaviour.
pub struct StaticOptionChainProvider {
    response: Result<Value, String>,
    calls: AtomicUsize,
}

impl StaticOptionChainProvider {
    /// Provider that returns `payload` for every symbol.
    pub fn with_payload(payload: Value) -> Self {
        Self {
            response: Ok(payload),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that fails every request with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_option_chain` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OptionChainProvider for StaticOptionChainProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_option_chain(&self, _symbol: &str) -> Result<Value, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(payload) => Ok(payload.clone()),
            Err(message) => Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: message.clone(),
            }),
        }
    }
}
