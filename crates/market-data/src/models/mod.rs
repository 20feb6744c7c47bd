//! Market data models
//!
//! This module contains the core data types for options-chain operations:
//! - `types` - Type aliases for common identifiers (Symbol, ExpiryLabel)
//! - `snapshot` - Raw provider payload stamped with its fetch time (OptionChainSnapshot)
//! - `expiry` - Exchange expiry-date parsing and chronological ordering

mod expiry;
mod snapshot;
mod types;

pub use expiry::{expiry_dates, parse_expiry, sort_expiries, EXPIRY_DATE_FORMAT};
pub use snapshot::{OptionChainSnapshot, FETCH_TIMESTAMP_FIELD};
pub use types::{ExpiryLabel, Symbol};
