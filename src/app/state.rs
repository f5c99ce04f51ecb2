//! Dashboard state and user notices.
//!
//! [`DashboardState`] is the single source of truth for one dashboard view: the
//! current record set, the selected timeframe, the summaries derived from them,
//! and the most recent analysis. Summaries are always recomputed from the full
//! record set; nothing is patched incrementally.

use crate::analytics::{aggregate, PeriodSummary};
use crate::domain::{ScoreRecord, Timeframe};
use crate::scoring::{Advice, Analysis};
use std::fmt;
use std::path::PathBuf;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Short user-facing message about the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: String,
}

impl Notice {
    pub const ANALYSIS_COMPLETE: &'static str = "Analysis Complete";
    pub const ANALYSIS_FAILED: &'static str = "Analysis Failed";
    pub const DATA_CLEARED: &'static str = "Data Cleared";
    pub const ERROR_CLEARING: &'static str = "Error Clearing Data";
    pub const ERROR_LOADING: &'static str = "Error Loading Data";
    pub const ERROR_SAVING: &'static str = "Error Saving Data";
    pub const NO_DATA: &'static str = "No Data";
    pub const REPORT_DOWNLOADED: &'static str = "Report Downloaded";
    pub const EXPORT_FAILED: &'static str = "Export Failed";

    #[must_use]
    pub fn info(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(title: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// State of one dashboard session.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Current record set, newest-first.
    pub records: Vec<ScoreRecord>,

    /// Selected bucket width.
    pub timeframe: Timeframe,

    /// Aggregation of `records` at `timeframe`, most recent period first.
    pub summaries: Vec<PeriodSummary>,

    /// Whether a load has ever succeeded.
    pub loaded: bool,

    /// Whether analyses should be followed by an advice request.
    pub advice_enabled: bool,

    pub last_analysis: Option<Analysis>,

    pub advice: Option<Advice>,

    /// Path of the most recent successful export.
    pub last_export: Option<PathBuf>,

    notices: Vec<Notice>,
}

impl DashboardState {
    /// Creates an empty, not-yet-loaded state.
    #[must_use]
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            advice_enabled: true,
            ..Self::default()
        }
    }

    /// Replaces the record set and recomputes the summaries.
    pub fn set_records(&mut self, records: Vec<ScoreRecord>) {
        self.records = records;
        self.recompute();
    }

    /// Switches the timeframe; returns whether anything changed.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> bool {
        if self.timeframe == timeframe {
            return false;
        }
        self.timeframe = timeframe;
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.summaries = aggregate(&self.records, self.timeframe);
        tracing::debug!(
            record_count = self.records.len(),
            period_count = self.summaries.len(),
            timeframe = %self.timeframe,
            "summaries recomputed"
        );
    }

    pub fn push_notice(&mut self, notice: Notice) {
        if notice.is_error() {
            tracing::warn!(title = notice.title, message = %notice.message, "error notice");
        } else {
            tracing::info!(title = notice.title, message = %notice.message, "notice");
        }
        self.notices.push(notice);
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Removes and returns pending notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_records_recomputes_summaries() {
        let mut state = DashboardState::new(Timeframe::Annual);
        assert!(state.summaries.is_empty());

        state.set_records(vec![ScoreRecord::new(1_704_100_000_000, "a.com", 0.5).unwrap()]);
        assert_eq!(state.summaries.len(), 1);
        assert_eq!(state.summaries[0].total_visits, 1);

        state.set_records(Vec::new());
        assert!(state.summaries.is_empty());
    }

    #[test]
    fn set_timeframe_reports_change() {
        let mut state = DashboardState::new(Timeframe::Weekly);
        assert!(!state.set_timeframe(Timeframe::Weekly));
        assert!(state.set_timeframe(Timeframe::Monthly));
        assert_eq!(state.timeframe, Timeframe::Monthly);
    }

    #[test]
    fn take_notices_drains() {
        let mut state = DashboardState::new(Timeframe::Weekly);
        state.push_notice(Notice::info(Notice::DATA_CLEARED, "gone"));
        state.push_notice(Notice::error(Notice::ERROR_LOADING, "bad"));
        let notices = state.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices[1].is_error());
        assert!(state.notices().is_empty());
    }
}
