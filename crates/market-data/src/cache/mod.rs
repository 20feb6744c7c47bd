//! File-backed, time-bounded cache of option-chain snapshots.
//!
//! One JSON file per (symbol, expiry) pair lives under the cache directory.
//! Freshness is judged from the file's last-modified time, not from anything
//! stored inside the payload: an entry older than `max_age` is treated as
//! absent and overwritten by the next fetch.
//!
//! The provider is called with the symbol only. The expiry is part of the
//! key and nothing else, so two expiries of the same symbol are fetched and
//! stored independently even though the payloads are identical.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use tokio::fs;

use crate::errors::MarketDataError;
use crate::models::OptionChainSnapshot;
use crate::provider::OptionChainProvider;

/// Default freshness window.
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 30;

static TEMP_FILE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age of an entry before it is refetched
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data"),
            max_age: Duration::minutes(DEFAULT_MAX_AGE_MINUTES),
        }
    }
}

/// Identifies one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    symbol: String,
    expiry: String,
}

impl CacheKey {
    /// Both parts end up in a file name, so separators and `..` are rejected.
    pub fn new(symbol: &str, expiry: &str) -> Result<Self, MarketDataError> {
        for part in [symbol, expiry] {
            if part.is_empty()
                || part.contains(['/', '\\', '\0'])
                || part.contains("..")
            {
                return Err(MarketDataError::InvalidCacheKey(format!(
                    "{}_{}",
                    symbol, expiry
                )));
            }
        }
        Ok(Self {
            symbol: symbol.to_string(),
            expiry: expiry.to_string(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn expiry(&self) -> &str {
        &self.expiry
    }

    /// `{symbol}_{expiry}.json`
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.symbol, self.expiry)
    }
}

/// Outcome of a successful cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A fresh entry was read from disk.
    Hit(OptionChainSnapshot),
    /// The provider was called and the entry (re)written.
    Fetched(OptionChainSnapshot),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn into_snapshot(self) -> OptionChainSnapshot {
        match self {
            Self::Hit(snapshot) | Self::Fetched(snapshot) => snapshot,
        }
    }
}

/// Option-chain cache wrapping a provider.
pub struct OptionChainCache {
    provider: Arc<dyn OptionChainProvider>,
    config: CacheConfig,
}

impl OptionChainCache {
    /// Create the cache, making sure the cache directory exists.
    pub fn new(
        provider: Arc<dyn OptionChainProvider>,
        config: CacheConfig,
    ) -> Result<Self, MarketDataError> {
        std::fs::create_dir_all(&config.cache_dir)?;
        Ok(Self { provider, config })
    }

    /// Storage path for a key.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.config.cache_dir.join(key.file_name())
    }

    /// Options data for (symbol, expiry), or `None` if it could not be obtained.
    ///
    /// Failures are logged here and never propagate.
    pub async fn get_options_data(
        &self,
        symbol: &str,
        expiry: &str,
    ) -> Option<OptionChainSnapshot> {
        let result = match CacheKey::new(symbol, expiry) {
            Ok(key) => self.lookup(&key).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(lookup) => Some(lookup.into_snapshot()),
            Err(e) if e.is_provider_failure() => {
                warn!("Options data unavailable for {} {}: {}", symbol, expiry, e);
                None
            }
            Err(e) => {
                error!("Error fetching {} {}: {}", symbol, expiry, e);
                None
            }
        }
    }

    /// Look up `key` as of the current time.
    pub async fn lookup(&self, key: &CacheKey) -> Result<CacheLookup, MarketDataError> {
        self.lookup_at(key, Utc::now()).await
    }

    /// Look up `key`, judging freshness against `now`.
    pub async fn lookup_at(
        &self,
        key: &CacheKey,
        now: DateTime<Utc>,
    ) -> Result<CacheLookup, MarketDataError> {
        let path = self.entry_path(key);

        if let Some(snapshot) = self.read_fresh(&path, now).await {
            debug!(
                "Cache hit for {} (fetched {})",
                key.file_name(),
                snapshot.fetch_timestamp().unwrap_or("unknown")
            );
            return Ok(CacheLookup::Hit(snapshot));
        }

        let raw = self.provider.fetch_option_chain(key.symbol()).await?;
        let snapshot = OptionChainSnapshot::stamp(raw, now.with_timezone(&Local))?;
        write_entry(&path, &snapshot).await?;

        tracing::info!(
            "Cached {} option chain from {} at {}",
            key.symbol(),
            self.provider.id(),
            path.display()
        );
        Ok(CacheLookup::Fetched(snapshot))
    }

    /// The stored entry, if it exists, is younger than `max_age` and decodes.
    async fn read_fresh(&self, path: &Path, now: DateTime<Utc>) -> Option<OptionChainSnapshot> {
        let modified: DateTime<Utc> = fs::metadata(path).await.ok()?.modified().ok()?.into();
        if now - modified >= self.config.max_age {
            return None;
        }

        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Discarding corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Encode with a four-space indent.
fn encode_entry(snapshot: &OptionChainSnapshot) -> Result<Vec<u8>, MarketDataError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    snapshot.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write to a sibling temp file, then rename over the entry.
async fn write_entry(path: &Path, snapshot: &OptionChainSnapshot) -> Result<(), MarketDataError> {
    let bytes = encode_entry(snapshot)?;
    let seq = TEMP_FILE_SEQ.fetch_add(1, Ordering::Relaxed);
    let tmp = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));

    fs::write(&tmp, &bytes).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticOptionChainProvider;
    use serde_json::json;
    use tempfile::tempdir;

    fn payload() -> serde_json::Value {
        json!({
            "records": {
                "expiryDates": ["28-Nov-2024", "26-Dec-2024"],
                "underlyingValue": 23518.5,
                "data": [{"strikePrice": 23500, "CE": {"openInterest": 1200}}]
            },
            "filtered": {"CE": {"totOI": 1200}, "PE": {"totOI": 900}}
        })
    }

    fn cache_with(
        provider: Arc<StaticOptionChainProvider>,
        dir: &Path,
    ) -> OptionChainCache {
        OptionChainCache::new(
            provider,
            CacheConfig {
                cache_dir: dir.to_path_buf(),
                ..CacheConfig::default()
            },
        )
        .unwrap()
    }

    async fn mtime(path: &Path) -> DateTime<Utc> {
        fs::metadata(path).await.unwrap().modified().unwrap().into()
    }

    #[test]
    fn cache_key_file_name() {
        let key = CacheKey::new("NIFTY", "28-Nov-2024").unwrap();
        assert_eq!(key.file_name(), "NIFTY_28-Nov-2024.json");
    }

    #[test]
    fn cache_key_rejects_path_traversal() {
        assert!(CacheKey::new("../etc", "28-Nov-2024").is_err());
        assert!(CacheKey::new("NIFTY", "a/b").is_err());
        assert!(CacheKey::new("", "28-Nov-2024").is_err());
    }

    #[tokio::test]
    async fn creates_missing_cache_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data").join("chains");
        let provider = Arc::new(StaticOptionChainProvider::with_payload(payload()));
        let _cache = cache_with(provider, &nested);
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn miss_fetches_stamps_and_persists() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(StaticOptionChainProvider::with_payload(payload()));
        let cache = cache_with(provider.clone(), dir.path());
        let key = CacheKey::new("NIFTY", "28-Nov-2024").unwrap();

        let lookup = cache.lookup(&key).await.unwrap();

        assert!(!lookup.is_hit());
        assert_eq!(provider.calls(), 1);
        let snapshot = lookup.into_snapshot();
        assert!(snapshot.fetch_timestamp().is_some());
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap()["filtered"],
            payload()["filtered"]
        );

        let stored = std::fs::read_to_string(cache.entry_path(&key)).unwrap();
        assert!(stored.contains("\n    \"fetch_timestamp\""));
        let decoded: OptionChainSnapshot = serde_json::from_str(&stored).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[tokio::test]
    async fn entry_is_fresh_at_29_minutes_and_stale_at_31() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(StaticOptionChainProvider::with_payload(payload()));
        let cache = cache_with(provider.clone(), dir.path());
        let key = CacheKey::new("BANKNIFTY", "27-Nov-2024").unwrap();

        let first = cache.lookup(&key).await.unwrap().into_snapshot();
        let written_at = mtime(&cache.entry_path(&key)).await;

        let at_29 = cache
            .lookup_at(&key, written_at + Duration::minutes(29))
            .await
            .unwrap();
        assert_eq!(at_29, CacheLookup::Hit(first.clone()));
        assert_eq!(provider.calls(), 1);

        let at_31 = cache
            .lookup_at(&key, written_at + Duration::minutes(31))
            .await
            .unwrap();
        assert!(!at_31.is_hit());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn different_expiries_are_independent_entries() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(StaticOptionChainProvider::with_payload(payload()));
        let cache = cache_with(provider.clone(), dir.path());

        let near = cache.get_options_data("NIFTY", "28-Nov-2024").await;
        let far = cache.get_options_data("NIFTY", "26-Dec-2024").await;

        assert!(near.is_some());
        assert!(far.is_some());
        assert_eq!(provider.calls(), 2);
        assert!(dir.path().join("NIFTY_28-Nov-2024.json").is_file());
        assert!(dir.path().join("NIFTY_26-Dec-2024.json").is_file());
    }

    #[tokio::test]
    async fn provider_failure_returns_none_and_writes_nothing() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(StaticOptionChainProvider::failing("connection reset"));
        let cache = cache_with(provider.clone(), dir.path());

        assert!(cache.get_options_data("TCS", "28-Nov-2024").await.is_none());
        assert_eq!(provider.calls(), 1);
        assert!(!dir.path().join("TCS_28-Nov-2024.json").exists());
    }

    #[tokio::test]
    async fn provider_failure_leaves_stale_entry_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("TCS_28-Nov-2024.json");
        std::fs::write(&path, r#"{"records": {}, "fetch_timestamp": "old"}"#).unwrap();
        let provider = Arc::new(StaticOptionChainProvider::failing("HTTP error: 503"));
        let cache = cache_with(provider.clone(), dir.path());
        let key = CacheKey::new("TCS", "28-Nov-2024").unwrap();
        let stale_at = mtime(&path).await + Duration::minutes(45);

        assert!(cache.lookup_at(&key, stale_at).await.is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"records": {}, "fetch_timestamp": "old"}"#
        );
    }

    #[tokio::test]
    async fn corrupt_entry_is_refetched() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("INFY_28-Nov-2024.json"), "{not json").unwrap();
        let provider = Arc::new(StaticOptionChainProvider::with_payload(payload()));
        let cache = cache_with(provider.clone(), dir.path());

        let snapshot = cache.get_options_data("INFY", "28-Nov-2024").await.unwrap();

        assert_eq!(provider.calls(), 1);
        assert!(snapshot.fetch_timestamp().is_some());
    }

    #[tokio::test]
    async fn non_object_payload_is_not_cached() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(StaticOptionChainProvider::with_payload(json!(["x"])));
        let cache = cache_with(provider, dir.path());

        assert!(cache.get_options_data("SBIN", "28-Nov-2024").await.is_none());
        assert!(!dir.path().join("SBIN_28-Nov-2024.json").exists());
    }
}
