//! Analysis error types.

use thiserror::Error;

/// Errors raised while generating an analysis.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key for a provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// Provider error (from rig-core or API).
    #[error("Provider error: {0}")]
    Provider(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AiError {
    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Error code for programmatic handling in logs.
impl AiError {
    pub fn code(&self) -> &'static str {
        match self {
            AiError::MissingApiKey(_) => "MISSING_API_KEY",
            AiError::Provider(_) => "PROVIDER_ERROR",
            AiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
