//! Pagination types
//!
//! Response bodies are classified once into a [`ResponseShape`]; the driver
//! matches on the shape instead of probing fields.

use crate::state::Continuation;
use crate::types::{JsonObject, JsonValue};

/// Structural classification of a response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// A JSON object
    Object(JsonObject),
    /// A JSON array
    Array(Vec<JsonValue>),
    /// Any other JSON value, or the raw text of a non-JSON body
    Scalar(JsonValue),
}

impl ResponseShape {
    /// Parse a response body
    ///
    /// `204 No Content` and empty bodies become an empty string; bodies that
    /// are not JSON become their text.
    pub fn parse(status: u16, body: &[u8]) -> Self {
        if status == 204 || body.is_empty() {
            return Self::Scalar(JsonValue::String(String::new()));
        }

        match serde_json::from_slice::<JsonValue>(body) {
            Ok(value) => Self::from(value),
            Err(_) => Self::Scalar(JsonValue::String(
                String::from_utf8_lossy(body).into_owned(),
            )),
        }
    }

    /// The body as a JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Object(map) => JsonValue::Object(map.clone()),
            Self::Array(items) => JsonValue::Array(items.clone()),
            Self::Scalar(value) => value.clone(),
        }
    }

    /// Number of items when the body is an array
    pub fn item_count(&self) -> Option<usize> {
        match self {
            Self::Array(items) => Some(items.len()),
            _ => None,
        }
    }
}

impl From<JsonValue> for ResponseShape {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::Object(map),
            JsonValue::Array(items) => Self::Array(items),
            other => Self::Scalar(other),
        }
    }
}

/// Result of inspecting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutcome {
    /// Continuation for the next request
    pub next: Continuation,
    /// The page repeated the previous `max_id`
    pub stalled: bool,
    /// The body matched no pagination convention
    pub exhausted: bool,
}

impl PageOutcome {
    /// Whether the loop should stop after this page
    ///
    /// True on a stall, on an unrecognized body, or when nothing is left
    /// to continue from.
    pub fn is_terminal(&self) -> bool {
        self.stalled || self.exhausted || self.next.is_empty()
    }
}
