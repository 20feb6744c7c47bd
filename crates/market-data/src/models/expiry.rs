use chrono::NaiveDate;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::ExpiryLabel;

/// Exchange expiry format: day, abbreviated month, four-digit year (`28-Nov-2024`).
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";

/// Parse an exchange-formatted expiry into a calendar date.
pub fn parse_expiry(label: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(label.trim(), EXPIRY_DATE_FORMAT)
        .map_err(|_| MarketDataError::InvalidExpiry(label.to_string()))
}

/// Sort expiry labels chronologically, keeping their original spelling.
///
/// A single unparsable label fails the whole call.
pub fn sort_expiries(labels: Vec<ExpiryLabel>) -> Result<Vec<ExpiryLabel>, MarketDataError> {
    let mut dated = labels
        .into_iter()
        .map(|label| parse_expiry(&label).map(|date| (date, label)))
        .collect::<Result<Vec<_>, _>>()?;
    dated.sort_by_key(|(date, _)| *date);
    Ok(dated.into_iter().map(|(_, label)| label).collect())
}

/// Extract `records.expiryDates` from a raw option-chain payload.
pub fn expiry_dates(payload: &Value) -> Result<Vec<ExpiryLabel>, MarketDataError> {
    let dates = payload
        .get("records")
        .and_then(|records| records.get("expiryDates"))
        .and_then(Value::as_array)
        .ok_or_else(|| MarketDataError::MissingField("records.expiryDates".to_string()))?;

    dates
        .iter()
        .map(|date| {
            date.as_str()
                .map(str::to_string)
                .ok_or_else(|| MarketDataError::InvalidExpiry(date.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_exchange_format() {
        let date = parse_expiry("28-Nov-2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 11, 28).unwrap());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(matches!(
            parse_expiry("2024-11-28"),
            Err(MarketDataError::InvalidExpiry(_))
        ));
    }

    #[test]
    fn sorts_chronologically_not_lexically() {
        let sorted = sort_expiries(vec![
            "26-Dec-2024".to_string(),
            "05-Dec-2024".to_string(),
            "30-Jan-2025".to_string(),
            "28-Nov-2024".to_string(),
        ])
        .unwrap();
        assert_eq!(
            sorted,
            vec!["28-Nov-2024", "05-Dec-2024", "26-Dec-2024", "30-Jan-2025"]
        );
    }

    #[test]
    fn one_bad_label_fails_the_sort() {
        let result = sort_expiries(vec!["28-Nov-2024".to_string(), "someday".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn extracts_expiry_dates_from_records() {
        let payload = json!({"records": {"expiryDates": ["26-Dec-2024", "28-Nov-2024"]}});
        assert_eq!(
            expiry_dates(&payload).unwrap(),
            vec!["26-Dec-2024", "28-Nov-2024"]
        );
    }

    #[test]
    fn missing_records_is_reported() {
        let err = expiry_dates(&json!({"filtered": {}})).unwrap_err();
        assert!(matches!(err, MarketDataError::MissingField(_)));
    }
}
