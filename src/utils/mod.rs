//! Utility functions and helpers
//!
//! Timestamp formatting and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write_with, AtomicError, AtomicResult};
pub use time::{current_timestamp, format_timestamp, is_valid_format, DEFAULT_TIMESTAMP_FORMAT};
