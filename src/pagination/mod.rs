//! Pagination module
//!
//! Supports: `next_cursor` objects and `max_id` arrays
//!
//! # Overview
//!
//! Response bodies are parsed into a [`ResponseShape`]. The
//! [`PaginationDriver`] reads the shape and the previous continuation and
//! returns a [`PageOutcome`]: the continuation for the next request and
//! whether the page stalled (repeated the previous `max_id`).

mod driver;
mod types;

pub use driver::{PaginationDriver, ID_FIELD, NEXT_CURSOR_FIELD};
pub use types::{PageOutcome, ResponseShape};
