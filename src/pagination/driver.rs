//! Continuation extraction
//!
//! Two conventions are recognized and may apply to the same body:
//! - `{"next_cursor": ...}` objects (cursor pagination)
//! - arrays whose last element carries an `id` (max_id pagination)

use super::types::{PageOutcome, ResponseShape};
use crate::state::{token_from_value, Continuation};
use crate::types::{JsonObject, JsonValue};

/// Field holding the next cursor in object responses
pub const NEXT_CURSOR_FIELD: &str = "next_cursor";
/// Field holding the item id in array responses
pub const ID_FIELD: &str = "id";

/// Computes the next continuation from a response
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationDriver;

impl PaginationDriver {
    /// Create a driver
    pub fn new() -> Self {
        Self
    }

    /// Inspect a page and compute the next continuation
    ///
    /// Bodies matching neither convention leave the continuation unchanged
    /// and are marked exhausted. Only `max_id` is compared for stall
    /// detection; an endpoint that repeats the same cursor forever is not
    /// caught here.
    pub fn advance(&self, shape: &ResponseShape, previous: &Continuation) -> PageOutcome {
        let mut next = previous.clone();
        let mut stalled = false;
        let mut exhausted = true;

        match shape {
            ResponseShape::Object(fields) => {
                if let Some(cursor) = next_cursor(fields) {
                    next.cursor = cursor;
                    exhausted = false;
                }
            }
            ResponseShape::Array(items) => {
                if let Some(max_id) = last_id(items) {
                    stalled = previous.max_id.as_deref() == Some(max_id.as_str());
                    next.max_id = Some(max_id);
                    exhausted = false;
                }
            }
            ResponseShape::Scalar(_) => {}
        }

        PageOutcome {
            next,
            stalled,
            exhausted,
        }
    }
}

/// `Some(None)` when the field is present but signals the last page
fn next_cursor(fields: &JsonObject) -> Option<Option<String>> {
    let value = fields.get(NEXT_CURSOR_FIELD)?;
    let cursor = match value {
        JsonValue::Number(n) if n.as_u64() == Some(0) || n.as_i64() == Some(0) => None,
        other => token_from_value(other),
    };
    Some(cursor)
}

fn last_id(items: &[JsonValue]) -> Option<String> {
    match items.last()? {
        JsonValue::Object(item) => item.get(ID_FIELD).and_then(token_from_value),
        _ => None,
    }
}
