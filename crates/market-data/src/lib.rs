//! Chainsight Market Data Crate
//!
//! This crate fetches derivative option chains and keeps short-lived copies
//! of them on disk.
//!
//! # Overview
//!
//! - Symbol registry: which underlyings the UI offers
//! - Providers: where option chains come from (NSE, or an in-memory stand-in)
//! - Expiries: the chronologically sorted expiry list for a symbol
//! - Cache: one file per (symbol, expiry), fresh for 30 minutes by mtime
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  SymbolRegistry  |     |  ExpiryService   |
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//! +------------------+     +---------------------+
//! | OptionChainCache | --> | OptionChainProvider |  (NSE, static)
//! +------------------+     +---------------------+
//!          |
//!          v
//! +---------------------+
//! | OptionChainSnapshot |  (raw payload + fetch_timestamp)
//! +---------------------+
//! ```

pub mod cache;
pub mod errors;
pub mod expiries;
pub mod models;
pub mod provider;
pub mod symbols;

pub use cache::{CacheConfig, CacheKey, CacheLookup, OptionChainCache};
pub use errors::MarketDataError;
pub use expiries::ExpiryService;
pub use models::{
    expiry_dates, parse_expiry, sort_expiries, ExpiryLabel, OptionChainSnapshot, Symbol,
    EXPIRY_DATE_FORMAT, FETCH_TIMESTAMP_FIELD,
};
pub use provider::nse::{NseProvider, NSE_REQUEST_TIMEOUT};
pub use provider::{OptionChainProvider, StaticOptionChainProvider};
pub use symbols::{default_symbols, SymbolRegistry, DEFAULT_DERIVATIVE_SYMBOLS};
