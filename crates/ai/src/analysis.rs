//! Analysis streaming - prompt in, ordered text events out.
//!
//! `AnalysisService` renders the analysis prompt, runs the model on a
//! background task and relays each text fragment as an `AnalysisEvent`,
//! closing the stream with exactly one terminal event.

use std::sync::Arc;

use chainsight_market_data::OptionChainSnapshot;
use chrono::{Local, NaiveDate};
use futures::stream::BoxStream;
use log::{error, info};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::prompt_template::AnalysisPrompt;
use crate::providers::CompletionStreamer;
use crate::types::AnalysisEvent;

/// Configuration for analysis streaming.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Buffered events between the model task and the consumer.
    pub channel_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
        }
    }
}

/// Streams model analyses of option-chain snapshots.
pub struct AnalysisService {
    model: Arc<dyn CompletionStreamer>,
    config: AnalysisConfig,
}

impl AnalysisService {
    pub fn new(model: Arc<dyn CompletionStreamer>, config: AnalysisConfig) -> Self {
        Self { model, config }
    }

    /// Stream an analysis dated today (local time).
    pub fn stream_analysis(
        &self,
        symbol: &str,
        expiry: &str,
        snapshot: &OptionChainSnapshot,
    ) -> BoxStream<'static, AnalysisEvent> {
        self.stream_analysis_on(symbol, expiry, snapshot, Local::now().date_naive())
    }

    /// Stream an analysis as of `current_date`.
    ///
    /// The stream yields the model's text fragments in order, then `End`, or
    /// an `Error` as soon as the model fails. It is finite and not restartable.
    pub fn stream_analysis_on(
        &self,
        symbol: &str,
        expiry: &str,
        snapshot: &OptionChainSnapshot,
        current_date: NaiveDate,
    ) -> BoxStream<'static, AnalysisEvent> {
        let prompt = AnalysisPrompt {
            symbol,
            expiry,
            current_date,
            snapshot,
        }
        .render();

        let run_id = Uuid::now_v7().to_string();
        info!(
            "Starting analysis {} for {} {} with {}/{}",
            run_id,
            symbol,
            expiry,
            self.model.provider_id(),
            self.model.model_id()
        );

        let (tx, rx) = mpsc::channel::<AnalysisEvent>(self.config.channel_capacity);
        let model = self.model.clone();
        let capacity = self.config.channel_capacity;

        tokio::spawn(async move {
            let (fragment_tx, mut fragment_rx) = mpsc::channel::<String>(capacity);

            let forward = async {
                while let Some(text) = fragment_rx.recv().await {
                    if tx.send(AnalysisEvent::text(text)).await.is_err() {
                        // Consumer gone; dropping the receiver stops the model.
                        break;
                    }
                }
                drop(fragment_rx);
            };

            let (result, ()) = tokio::join!(model.stream_completion(&prompt, fragment_tx), forward);

            let terminal = match result {
                Ok(()) => {
                    info!("Analysis {} complete", run_id);
                    AnalysisEvent::End
                }
                Err(e) => {
                    error!("Analysis {} failed [{}]: {}", run_id, e.code(), e);
                    AnalysisEvent::analysis_failed(&e)
                }
            };
            let _ = tx.send(terminal).await;
        });

        Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx))
    }
}
