//! Stream event types shared with the HTTP layer.

/// Payload of the event that closes a successful analysis.
pub const END_MARKER: &str = "[END]";

/// Prefix of the event that closes a failed analysis.
pub const ANALYSIS_ERROR_PREFIX: &str = "Error analyzing with Gemini";

/// Payload sent when no option-chain data could be obtained.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data";

/// One event of an analysis stream.
///
/// A stream is zero or more `Text` events followed by exactly one `End`
/// or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
    /// An incremental text fragment from the model, verbatim.
    Text { delta: String },
    /// The model finished.
    End,
    /// Generation failed; no further events follow.
    Error { message: String },
}

impl AnalysisEvent {
    pub fn text(delta: impl Into<String>) -> Self {
        Self::Text {
            delta: delta.into(),
        }
    }

    /// Model failure, worded for the client.
    pub fn analysis_failed(reason: impl std::fmt::Display) -> Self {
        Self::Error {
            message: format!("{}: {}", ANALYSIS_ERROR_PREFIX, reason),
        }
    }

    /// Options data unavailable, worded for the client.
    pub fn fetch_failed() -> Self {
        Self::Error {
            message: FETCH_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Text { .. })
    }

    /// Payload carried by the server-push event.
    pub fn data(&self) -> &str {
        match self {
            Self::Text { delta } => delta,
            Self::End => END_MARKER,
            Self::Error { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payloads() {
        assert_eq!(AnalysisEvent::text("Hello ").data(), "Hello ");
        assert_eq!(AnalysisEvent::End.data(), "[END]");
        assert_eq!(
            AnalysisEvent::analysis_failed("quota exceeded").data(),
            "Error analyzing with Gemini: quota exceeded"
        );
        assert_eq!(AnalysisEvent::fetch_failed().data(), "Error fetching data");
    }

    #[test]
    fn test_only_text_is_non_terminal() {
        assert!(!AnalysisEvent::text("x").is_terminal());
        assert!(AnalysisEvent::End.is_terminal());
        assert!(AnalysisEvent::fetch_failed().is_terminal());
    }
}
