//! Expiry listing for a symbol.
//!
//! Always hits the provider; expiry lists are never cached.

use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::models::{expiry_dates, sort_expiries, ExpiryLabel};
use crate::provider::OptionChainProvider;

pub struct ExpiryService {
    provider: Arc<dyn OptionChainProvider>,
}

impl ExpiryService {
    pub fn new(provider: Arc<dyn OptionChainProvider>) -> Self {
        Self { provider }
    }

    /// Expiry dates listed for `symbol`, earliest first.
    pub async fn list_expiries(
        &self,
        symbol: &str,
    ) -> Result<Vec<ExpiryLabel>, MarketDataError> {
        let payload = self.provider.fetch_option_chain(symbol).await?;
        sort_expiries(expiry_dates(&payload)?)
    }
}
