use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::MarketDataError;

/// Field added to every provider payload before it is cached.
pub const FETCH_TIMESTAMP_FIELD: &str = "fetch_timestamp";

/// Raw options-chain payload for one symbol, annotated with the time it was fetched.
///
/// The provider response is kept as-is; only `fetch_timestamp` is added.
/// Serializes transparently, so the cache file holds exactly the provider
/// object plus that one field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionChainSnapshot(Map<String, Value>);

impl OptionChainSnapshot {
    /// Stamp a raw provider payload with `at`, overwriting any previous stamp.
    ///
    /// Fails if the payload is not a JSON object.
    pub fn stamp(raw: Value, at: DateTime<Local>) -> Result<Self, MarketDataError> {
        match raw {
            Value::Object(mut map) => {
                map.insert(
                    FETCH_TIMESTAMP_FIELD.to_string(),
                    Value::String(format_fetch_timestamp(at)),
                );
                Ok(Self(map))
            }
            other => Err(MarketDataError::ValidationFailed {
                message: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    /// ISO-8601 local time of the fetch, if present.
    pub fn fetch_timestamp(&self) -> Option<&str> {
        self.0.get(FETCH_TIMESTAMP_FIELD).and_then(Value::as_str)
    }
}

/// Naive local time with microseconds, e.g. `2024-11-20T14:03:07.123456`.
fn format_fetch_timestamp(at: DateTime<Local>) -> String {
    at.naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 11, 20, 14, 3, 7).unwrap()
    }

    #[test]
    fn stamp_adds_fetch_timestamp_and_keeps_payload() {
        let raw = json!({"records": {"expiryDates": ["28-Nov-2024"]}, "filtered": {}});
        let snapshot = OptionChainSnapshot::stamp(raw, at()).unwrap();

        assert_eq!(snapshot.fetch_timestamp(), Some("2024-11-20T14:03:07.000000"));
        let encoded = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(encoded["records"], json!({"expiryDates": ["28-Nov-2024"]}));
        assert_eq!(encoded["filtered"], json!({}));
    }

    #[test]
    fn stamp_rejects_non_object_payloads() {
        let err = OptionChainSnapshot::stamp(json!([1, 2, 3]), at()).unwrap_err();
        assert!(matches!(err, MarketDataError::ValidationFailed { .. }));
    }

    #[test]
    fn serializes_as_the_bare_payload() {
        let snapshot = OptionChainSnapshot::stamp(json!({"records": {}}), at()).unwrap();
        let encoded = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            encoded,
            json!({"records": {}, "fetch_timestamp": "2024-11-20T14:03:07.000000"})
        );

        let decoded: OptionChainSnapshot = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
