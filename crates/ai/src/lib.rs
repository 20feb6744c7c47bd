//! Chainsight AI - streamed options-chain analysis using rig-core.
//!
//! This crate turns an option-chain snapshot into a natural-language
//! analysis, streamed fragment by fragment as `AnalysisEvent`s for the
//! Axum server to relay.
//!
//! # Architecture
//!
//! - `analysis`: Streaming analysis service (prompt → model task → events)
//! - `providers`: `CompletionStreamer` seam, Gemini client, fake for tests
//! - `prompt_template`: The analysis prompt and its fixed sections
//! - `types`: Stream events shared with the HTTP layer
//!
//! # Example
//!
//! ```ignore
//! use chainsight_ai::{AnalysisConfig, AnalysisEvent, AnalysisService, GeminiStreamer};
//!
//! let model = GeminiStreamer::new(Some(&api_key), "gemini-2.5-flash")?;
//! let service = AnalysisService::new(Arc::new(model), AnalysisConfig::default());
//!
//! let mut stream = service.stream_analysis("NIFTY", "28-Nov-2024", &snapshot);
//! while let Some(event) = stream.next().await {
//!     match event {
//!         AnalysisEvent::Text { delta } => print!("{}", delta),
//!         AnalysisEvent::End | AnalysisEvent::Error { .. } => break,
//!     }
//! }
//! ```

pub mod analysis;
pub mod error;
pub mod prompt_template;
pub mod providers;
pub mod types;

// Re-export main types for convenience
pub use analysis::{AnalysisConfig, AnalysisService};
pub use error::AiError;
pub use prompt_template::{AnalysisPrompt, TemplateSection, ANALYSIS_SECTIONS};
pub use providers::{
    CompletionStreamer, FakeCompletionStreamer, GeminiStreamer, DEFAULT_GEMINI_MODEL,
    GEMINI_PROVIDER_ID,
};
pub use types::{AnalysisEvent, ANALYSIS_ERROR_PREFIX, END_MARKER, FETCH_ERROR_MESSAGE};
