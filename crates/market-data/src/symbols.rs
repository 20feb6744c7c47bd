//! Registry of underlyings with listed derivatives.
//!
//! The list comes from a local JSON array of tickers. A missing, unreadable
//! or malformed file silently falls back to [`DEFAULT_DERIVATIVE_SYMBOLS`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::models::Symbol;

/// Index derivatives plus large-cap single-stock names.
pub const DEFAULT_DERIVATIVE_SYMBOLS: &[&str] = &[
    "NIFTY",
    "BANKNIFTY",
    "FINNIFTY",
    "MIDCPNIFTY",
    "RELIANCE",
    "TCS",
    "HDFCBANK",
    "ICICIBANK",
    "INFY",
    "SBIN",
    "LT",
];

/// Default symbol set, sorted.
pub fn default_symbols() -> Vec<Symbol> {
    dedup_sorted(DEFAULT_DERIVATIVE_SYMBOLS.iter().map(|s| s.to_string()))
}

fn dedup_sorted(symbols: impl IntoIterator<Item = Symbol>) -> Vec<Symbol> {
    symbols
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Loads the configured symbol list from disk.
#[derive(Debug, Clone)]
pub struct SymbolRegistry {
    path: PathBuf,
}

impl SymbolRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Symbols from the file, deduplicated and sorted; the defaults on any failure.
    pub fn load(&self) -> Vec<Symbol> {
        if !self.path.exists() {
            debug!(
                "Symbol file {} not found, using defaults",
                self.path.display()
            );
            return default_symbols();
        }

        let parsed = fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Vec<Symbol>>(&raw).map_err(|e| e.to_string()));

        match parsed {
            Ok(symbols) => dedup_sorted(symbols),
            Err(e) => {
                warn!(
                    "Ignoring symbol file {}: {}; using defaults",
                    self.path.display(),
                    e
                );
                default_symbols()
            }
        }
    }
}
