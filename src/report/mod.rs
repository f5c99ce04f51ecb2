//! Report formatting and export.
//!
//! A [`Report`] wraps a non-empty aggregation together with its timeframe and
//! generation date, and renders it as plain text, Markdown or CSV.

mod document;
mod format;
mod render;

pub use document::{Report, COLUMNS, POLARITY_NOTE, TITLE};
pub use format::ReportFormat;
