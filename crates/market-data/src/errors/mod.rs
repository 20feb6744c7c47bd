//! Error types for the market data crate.
//!
//! [`MarketDataError`] covers every failure the options-chain pipeline can
//! hit: the upstream provider, payload extraction, expiry parsing and the
//! on-disk cache. None of these are retried; callers decide how to degrade.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider has no option chain for the symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// An expected field was absent from the provider payload.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// An expiry string did not match the exchange date format.
    #[error("Invalid expiry date: {0}")]
    InvalidExpiry(String),

    /// The (symbol, expiry) pair cannot be used as a cache file name.
    #[error("Invalid cache key: {0}")]
    InvalidCacheKey(String),

    /// The provider returned data of an unexpected shape.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// Reading or writing the cache directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cache entry could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether the error came from the upstream provider rather than local state.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::SymbolNotFound(_)
                | Self::RateLimited { .. }
                | Self::Timeout { .. }
                | Self::ProviderError { .. }
                | Self::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::RateLimited {
            provider: "NSE".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: NSE");

        let error = MarketDataError::ProviderError {
            provider: "NSE".to_string(),
            message: "HTTP error: 503 Service Unavailable".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: NSE - HTTP error: 503 Service Unavailable"
        );

        let error = MarketDataError::MissingField("records.expiryDates".to_string());
        assert_eq!(format!("{}", error), "Missing field: records.expiryDates");
    }

    #[test]
    fn test_provider_failures_are_classified() {
        assert!(MarketDataError::SymbolNotFound("X".into()).is_provider_failure());
        assert!(MarketDataError::Timeout {
            provider: "NSE".into()
        }
        .is_provider_failure());
        assert!(!MarketDataError::InvalidExpiry("soon".into()).is_provider_failure());
        assert!(!MarketDataError::InvalidCacheKey("../x".into()).is_provider_failure());
    }
}
