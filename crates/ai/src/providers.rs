//! Generative-text providers.
//!
//! This module provides:
//! - `CompletionStreamer`, the seam between the analysis service and a model
//! - `GeminiStreamer`, backed by rig-core's Gemini client
//! - `FakeCompletionStreamer`, a deterministic stand-in for tests

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{
    agent::{Agent, MultiTurnStreamItem},
    client::CompletionClient,
    completion::{CompletionModel, Message},
    message::Text,
    providers::gemini,
    streaming::{StreamedAssistantContent, StreamingChat},
};
use tokio::sync::mpsc;

use crate::error::AiError;

/// Provider id for Google Gemini.
pub const GEMINI_PROVIDER_ID: &str = "gemini";

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

// ============================================================================
// Completion Streamer Trait
// ============================================================================

/// A model that turns one prompt into an incremental sequence of text fragments.
#[async_trait]
pub trait CompletionStreamer: Send + Sync {
    /// Provider identifier, for logging.
    fn provider_id(&self) -> &'static str;

    /// Model identifier, for logging.
    fn model_id(&self) -> &str;

    /// Stream the completion of `prompt`, sending each text fragment to `tx`
    /// in arrival order.
    ///
    /// Returns once the model is done. An error may come after some
    /// fragments were already sent. A closed `tx` is reported as an error.
    async fn stream_completion(&self, prompt: &str, tx: mpsc::Sender<String>)
        -> Result<(), AiError>;
}

// ============================================================================
// Gemini
// ============================================================================

/// Gemini-backed streamer. The client is built once from the API key.
pub struct GeminiStreamer {
    client: Option<gemini::Client<HttpClient>>,
    model_id: String,
}

impl GeminiStreamer {
    /// Create the streamer. A missing key is not an error here; every
    /// completion fails with `MissingApiKey` instead.
    pub fn new(api_key: Option<&str>, model_id: impl Into<String>) -> Result<Self, AiError> {
        let client = match api_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => {
                Some(gemini::Client::new(key).map_err(|e| AiError::Provider(e.to_string()))?)
            }
            None => None,
        };

        Ok(Self {
            client,
            model_id: model_id.into(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl CompletionStreamer for GeminiStreamer {
    fn provider_id(&self) -> &'static str {
        GEMINI_PROVIDER_ID
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn stream_completion(
        &self,
        prompt: &str,
        tx: mpsc::Sender<String>,
    ) -> Result<(), AiError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AiError::MissingApiKey(GEMINI_PROVIDER_ID.to_string()))?;

        let agent = client.agent(&self.model_id).build();
        relay_agent_stream(agent, prompt, tx).await
    }
}

/// Stream a rig agent's reply, forwarding text deltas only.
async fn relay_agent_stream<M: CompletionModel + 'static>(
    agent: Agent<M>,
    prompt: &str,
    tx: mpsc::Sender<String>,
) -> Result<(), AiError> {
    let mut stream = agent
        .stream_chat(Message::user(prompt), Vec::<Message>::new())
        .await;

    let mut fragments = 0usize;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(
                Text { text },
            ))) => {
                if text.is_empty() {
                    continue;
                }
                fragments += 1;
                tx.send(text)
                    .await
                    .map_err(|_| AiError::internal("analysis stream closed by consumer"))?;
            }
            // Reasoning, tool calls and final-response markers carry no text for the client.
            Ok(_) => {}
            Err(e) => return Err(AiError::Provider(e.to_string())),
        }
    }

    debug!("Model stream finished after {} fragments", fragments);
    Ok(())
}

// ============================================================================
// Fake Provider for Testing
// ============================================================================

/// A fake streamer that replays fixed fragments, optionally failing afterwards.
pub struct FakeCompletionStreamer {
    /// Fragments to send, in order.
    pub fragments: Vec<String>,
    /// Error message to fail with once the fragments are sent.
    pub failure: Option<String>,
}

impl FakeCompletionStreamer {
    /// Streamer that sends `fragments` and completes.
    pub fn with_fragments(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: None,
        }
    }

    /// Streamer that fails immediately.
    pub fn failing(message: &str) -> Self {
        Self {
            fragments: Vec::new(),
            failure: Some(message.to_string()),
        }
    }

    /// Streamer that sends `fragments` and then fails.
    pub fn failing_after(fragments: &[&str], message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::with_fragments(fragments)
        }
    }
}

#[async_trait]
impl CompletionStreamer for FakeCompletionStreamer {
    fn provider_id(&self) -> &'static str {
        "fake"
    }

    fn model_id(&self) -> &str {
        "fake-model"
    }

    async fn stream_completion(
        &self,
        _prompt: &str,
        tx: mpsc::Sender<String>,
    ) -> Result<(), AiError> {
        for fragment in &self.fragments {
            tx.send(fragment.clone())
                .await
                .map_err(|_| AiError::internal("analysis stream closed by consumer"))?;
        }
        match &self.failure {
            Some(message) => Err(AiError::provider(message.clone())),
            None => Ok(()),
        }
    }
}
