use std::sync::Arc;

use crate::config::Config;
use chainsight_ai::{
    AnalysisConfig, AnalysisService, CompletionStreamer, GeminiStreamer, GEMINI_PROVIDER_ID,
};
use chainsight_market_data::{
    CacheConfig, ExpiryService, NseProvider, OptionChainCache, OptionChainProvider,
    SymbolRegistry,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub symbol_registry: SymbolRegistry,
    pub expiry_service: ExpiryService,
    pub option_chain_cache: OptionChainCache,
    pub analysis_service: AnalysisService,
}

pub fn init_tracing() {
    let log_format = std::env::var("CHAINSIGHT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    // One NSE client for the whole process so its session cookies are shared.
    let provider: Arc<dyn OptionChainProvider> = Arc::new(NseProvider::new()?);

    let gemini = GeminiStreamer::new(
        config.gemini_api_key.as_deref(),
        config.gemini_model.clone(),
    )?;
    if !gemini.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set; analyses will fail until it is configured");
    }
    let model: Arc<dyn CompletionStreamer> = Arc::new(gemini);
    tracing::info!("Analysis model: {}/{}", GEMINI_PROVIDER_ID, config.gemini_model);

    build_state_with(config, provider, model)
}

/// Wire the services around an explicit data provider and model.
pub fn build_state_with(
    config: &Config,
    provider: Arc<dyn OptionChainProvider>,
    model: Arc<dyn CompletionStreamer>,
) -> anyhow::Result<Arc<AppState>> {
    let cache_config = CacheConfig {
        cache_dir: config.data_dir.clone(),
        max_age: chrono::Duration::from_std(config.cache_max_age)?,
    };
    let option_chain_cache = OptionChainCache::new(provider.clone(), cache_config)?;
    tracing::info!("Option-chain cache at {}", config.data_dir.display());

    Ok(Arc::new(AppState {
        symbol_registry: SymbolRegistry::new(config.symbols_file.clone()),
        expiry_service: ExpiryService::new(provider),
        option_chain_cache,
        analysis_service: AnalysisService::new(model, AnalysisConfig::default()),
    }))
}
