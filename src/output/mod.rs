//! Report rendering: colored terminal text and JSON.

pub mod json;
pub mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_report, format_statistic};
