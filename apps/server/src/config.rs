use std::{net::SocketAddr, path::PathBuf, time::Duration};

use chainsight_ai::DEFAULT_GEMINI_MODEL;
use chainsight_market_data::NSE_REQUEST_TIMEOUT;

/// Shortest request timeout accepted: both NSE calls of a fetch plus headroom.
pub fn min_request_timeout() -> Duration {
    NSE_REQUEST_TIMEOUT * 2 + Duration::from_secs(5)
}

fn clamp_request_timeout(requested: Duration) -> Duration {
    requested.max(min_request_timeout())
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub symbols_file: PathBuf,
    pub cache_max_age: Duration,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: PathBuf::from("data"),
            symbols_file: PathBuf::from("nse_symbols.json"),
            cache_max_age: Duration::from_secs(30 * 60),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(120_000),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let listen_addr: SocketAddr = std::env::var("CHAINSIGHT_LISTEN_ADDR")
            .map(|addr| addr.parse().expect("Invalid CHAINSIGHT_LISTEN_ADDR"))
            .unwrap_or(defaults.listen_addr);
        let data_dir = std::env::var("CHAINSIGHT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let symbols_file = std::env::var("CHAINSIGHT_SYMBOLS_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.symbols_file);
        let cache_max_age = std::env::var("CHAINSIGHT_CACHE_TTL_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_max_age);
        let cors_allow = std::env::var("CHAINSIGHT_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("CHAINSIGHT_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "120000".into())
            .parse()
            .unwrap_or(120_000);
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let gemini_model =
            std::env::var("CHAINSIGHT_GEMINI_MODEL").unwrap_or(defaults.gemini_model);
        Self {
            listen_addr,
            data_dir,
            symbols_file,
            cache_max_age,
            cors_allow,
            request_timeout: clamp_request_timeout(Duration::from_millis(timeout_ms)),
            gemini_api_key,
            gemini_model,
        }
    }
}
