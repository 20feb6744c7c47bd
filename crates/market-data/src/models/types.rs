/// Underlying ticker with listed derivatives (e.g. "NIFTY", "RELIANCE")
pub type Symbol = String;

/// Exchange-formatted expiry date string (e.g. "28-Nov-2024")
pub type ExpiryLabel = String;
