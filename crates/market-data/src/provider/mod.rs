//! Options-chain provider abstractions and implementations.
//!
//! This module contains:
//! - The `OptionChainProvider` trait that all providers implement
//! - `NseProvider`, which talks to the National Stock Exchange of India
//! - `StaticOptionChainProvider`, an in-memory provider for tests and offline runs

mod static_provider;
mod traits;

pub mod nse;

// Re-exports
pub use static_provider::StaticOptionChainProvider;
pub use traits::OptionChainProvider;
