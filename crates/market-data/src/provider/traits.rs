//! Options-chain provider trait definitions.
//!
//! This module defines the core `OptionChainProvider` trait that every
//! upstream source of option-chain data implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::MarketDataError;

/// Trait for options-chain providers.
///
/// A provider returns the full, raw option chain for one underlying symbol
/// across all listed expiries. Callers extract what they need from the
/// nested payload; no schema is enforced here.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use chainsight_market_data::provider::OptionChainProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl OptionChainProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn fetch_option_chain(&self, symbol: &str) -> Result<Value, MarketDataError> {
///         // ... call the upstream API
///     }
/// }
/// ```
#[async_trait]
pub trait OptionChainProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "NSE". Used for logging and error tagging.
    fn id(&self) -> &'static str;

    /// Fetch the option chain for `symbol`.
    ///
    /// # Returns
    ///
    /// The provider's raw JSON response on success, or a `MarketDataError` on failure.
    async fn fetch_option_chain(&self, symbol: &str) -> Result<Value, MarketDataError>;
}
