//! Side effects requested by the event handler.
//!
//! [`handle_event`](super::handle_event) never touches the store, the scorer or
//! the filesystem itself. It returns `Action`s, and the
//! [`Dashboard`](super::Dashboard) runtime executes them and feeds the outcome
//! back in as new events.

use crate::domain::{ScoreRecord, Timeframe};
use crate::report::ReportFormat;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Reads the full collection from the store.
    LoadRecords,

    /// Scores a normalized URL.
    Analyze {
        url: String,
    },

    /// Persists one record produced by a completed analysis.
    AppendRecord(ScoreRecord),

    /// Asks the advisor for tips about an analyzed site.
    RequestAdvice {
        url: String,
        score: f64,
    },

    /// Removes every persisted record.
    ClearRecords,

    /// Renders the current summaries and writes them to the export directory.
    ExportReport {
        timeframe: Timeframe,
        format: ReportFormat,
    },
}
