use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body of `POST /get_expiries`.
#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct ExpiryRequest {
    pub symbol: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ExpiriesResponse {
    pub expiries: Vec<String>,
}

/// Form body of `POST /stream_analysis`.
#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub expiry_date: String,
}
