//! Continuation state persisted between runs
//!
//! Serialized as a small JSON object `{"cursor": ..., "max_id": ...}`.

use crate::types::JsonValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Pagination progress for one logical request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    /// Opaque server-issued continuation token
    #[serde(default, deserialize_with = "opaque_token")]
    pub cursor: Option<String>,

    /// Ordinal watermark for max_id style pagination
    #[serde(default, deserialize_with = "opaque_token")]
    pub max_id: Option<String>,
}

impl Continuation {
    /// Create an empty continuation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a continuation from both fields
    pub fn with(cursor: Option<String>, max_id: Option<String>) -> Self {
        Self { cursor, max_id }
    }

    /// Create a continuation holding only a cursor
    pub fn from_cursor(cursor: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor.into()),
            max_id: None,
        }
    }

    /// Create a continuation holding only a max_id
    pub fn from_max_id(max_id: impl Into<String>) -> Self {
        Self {
            cursor: None,
            max_id: Some(max_id.into()),
        }
    }

    /// True when neither field carries a value
    pub fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.max_id.is_none()
    }

    /// True when a cursor is still pending
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Wire parameters for the fields that are set
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(2);
        if let Some(cursor) = &self.cursor {
            params.push(("cursor", cursor.as_str()));
        }
        if let Some(max_id) = &self.max_id {
            params.push(("max_id", max_id.as_str()));
        }
        params
    }
}

impl fmt::Display for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.cursor, &self.max_id) {
            (Some(cursor), _) => write!(f, "cursor {cursor}"),
            (None, Some(max_id)) => write!(f, "max_id {max_id}"),
            (None, None) => f.write_str("start"),
        }
    }
}

/// Render a JSON scalar as an opaque token; empty strings and nulls become `None`
pub(crate) fn token_from_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept strings and numbers, older records store `max_id` as a bare integer
fn opaque_token<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(token_from_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_continuation_default() {
        let cont = Continuation::new();
        assert!(cont.is_empty());
        assert!(!cont.has_cursor());
        assert!(cont.params().is_empty());
    }

    #[test]
    fn test_continuation_params() {
        let cont = Continuation::with(Some("abc".into()), Some("42".into()));
        assert_eq!(cont.params(), vec![("cursor", "abc"), ("max_id", "42")]);

        let cont = Continuation::from_max_id("7");
        assert_eq!(cont.params(), vec![("max_id", "7")]);
        assert!(!cont.has_cursor());
        assert!(!cont.is_empty());
    }

    #[test]
    fn test_continuation_serialization() {
        let cont = Continuation::from_cursor("abc");
        let json = serde_json::to_string(&cont).unwrap();
        assert_eq!(json, r#"{"cursor":"abc","max_id":null}"#);

        let restored: Continuation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cont);
    }

    #[test]
    fn test_continuation_accepts_numbers() {
        let cont: Continuation = serde_json::from_value(json!({
            "cursor": 1_712_345_678_u64,
            "max_id": 42
        }))
        .unwrap();
        assert_eq!(cont.cursor.as_deref(), Some("1712345678"));
        assert_eq!(cont.max_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_continuation_missing_fields() {
        let cont: Continuation = serde_json::from_str("{}").unwrap();
        assert!(cont.is_empty());

        let cont: Continuation = serde_json::from_str(r#"{"cursor": ""}"#).unwrap();
        assert!(cont.is_empty());
    }

    #[test]
    fn test_continuation_display() {
        assert_eq!(Continuation::from_cursor("abc").to_string(), "cursor abc");
        assert_eq!(Continuation::from_max_id("9").to_string(), "max_id 9");
        assert_eq!(Continuation::new().to_string(), "start");
    }
}
