use crate::errors::{Result, ValuationError};

/// Serializes a value to pretty JSON with canonical error handling.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|err| ValuationError::Serialization(err.to_string()))
}

/// Serializes a value to a single JSON line, as used by batch output.
pub fn to_json_line<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| ValuationError::Serialization(err.to_string()))
}

/// Deserializes a JSON string into the provided type with shared error semantics.
pub fn from_json_str<T: serde::de::DeserializeOwned>(input: &str) -> Result<T> {
    serde_json::from_str(input).map_err(|err| ValuationError::Deserialization(err.to_string()))
}

/// Deserializes JSON bytes.
pub fn from_json_bytes<T: serde::de::DeserializeOwned>(input: &[u8]) -> Result<T> {
    serde_json::from_slice(input).map_err(|err| ValuationError::Deserialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_output_is_readable_back() {
        let value = serde_json::json!({"total_adjustment_usd": "85.00"});
        let json = to_pretty_json(&value).expect("serialize");
        let decoded: serde_json::Value = from_json_str(&json).expect("deserialize");
        assert_eq!(decoded["total_adjustment_usd"], "85.00");
    }

    #[test]
    fn json_line_has_no_newlines() {
        let value = serde_json::json!({"a": [1, 2], "b": {"c": true}});
        let line = to_json_line(&value).expect("serialize");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn malformed_input_maps_to_deserialization_error() {
        let err = from_json_bytes::<serde_json::Value>(b"{not json").unwrap_err();
        assert!(matches!(err, ValuationError::Deserialization(_)));
    }
}
