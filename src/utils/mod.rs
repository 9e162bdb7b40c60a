//! Utility functions

pub mod text;
pub mod time;

pub use text::truncate_chars;
pub use time::{format_milliseconds, round_to_millis};
