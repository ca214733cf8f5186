//! Data models for calendar-mcp
//!
//! Raw Calendar store rows, the formatted event shapes returned to callers,
//! and the option structs accepted by each query.

mod calendar;
mod options;

pub use calendar::*;
pub use options::*;
