//! Event handling and state transitions.
//!
//! [`handle_event`] is the only place dashboard state changes. It is pure with
//! respect to I/O: every effect is returned as an [`Action`], and the outcome of
//! that action comes back later as another [`Event`].
//!
//! # Event Types
//!
//! - **User intent**: `Mounted`, `AnalyzeRequested`, `TimeframeSelected`,
//!   `ClearRequested`, `ExportRequested`
//! - **Action outcomes**: `RecordsLoaded`, `AnalysisCompleted`, `AnalysisFailed`,
//!   `AdviceReady`, `AdviceFailed`, `AppendFailed`, `ClearCompleted`,
//!   `ClearFailed`, `ExportCompleted`, `ExportFailed`
//! - **Notifications**: `StoreChanged` from the change notifier, `ChangesMissed`
//!   when the subscription lagged

use crate::app::state::{DashboardState, Notice};
use crate::app::Action;
use crate::domain::error::Result;
use crate::domain::{ScoreRecord, Timeframe};
use crate::notifier::{ChangeEvent, ChangeKind};
use crate::report::ReportFormat;
use crate::scoring::{normalize_url, Advice, Analysis};
use std::path::PathBuf;

/// Everything the dashboard reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The view became visible; triggers the initial load.
    Mounted,

    /// The store was read.
    RecordsLoaded {
        records: Vec<ScoreRecord>,
        /// Description of a recoverable load problem.
        error: Option<String>,
    },

    /// The user asked to analyze raw, un-normalized input.
    AnalyzeRequested {
        input: String,
    },

    AnalysisCompleted(Analysis),

    AnalysisFailed {
        url: String,
        error: String,
    },

    AdviceReady(Advice),

    AdviceFailed {
        error: String,
    },

    /// Persisting an analyzed record failed.
    AppendFailed {
        url: String,
        error: String,
    },

    TimeframeSelected(Timeframe),

    ClearRequested,

    ClearCompleted,

    ClearFailed {
        error: String,
    },

    ExportRequested {
        format: ReportFormat,
    },

    ExportCompleted {
        path: PathBuf,
    },

    ExportFailed {
        error: String,
    },

    /// A change was published on the store topic.
    StoreChanged(ChangeEvent),

    /// The subscription dropped `count` changes; the view must reload.
    ChangesMissed {
        count: u64,
    },
}

/// Processes one event.
///
/// Returns whether the visible view changed, plus the actions to execute in
/// order.
///
/// # Errors
///
/// Reserved for failures that cannot be expressed as a notice; every current
/// event resolves to `Ok`.
///
/// # Examples
///
/// ```
/// use ecobrowse::app::{handle_event, Action, DashboardState, Event};
/// use ecobrowse::Timeframe;
///
/// let mut state = DashboardState::new(Timeframe::Weekly);
/// let (_, actions) = handle_event(&mut state, &Event::Mounted)?;
/// assert_eq!(actions, vec![Action::LoadRecords]);
/// # Ok::<(), ecobrowse::EcoBrowseError>(())
/// ```
#[allow(clippy::too_many_lines)]
pub fn handle_event(state: &mut DashboardState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event_name(event)).entered();

    match event {
        Event::Mounted => Ok((false, vec![Action::LoadRecords])),

        Event::RecordsLoaded { records, error } => {
            if let Some(error) = error {
                state.push_notice(Notice::error(
                    Notice::ERROR_LOADING,
                    format!("Could not load report data: {error}"),
                ));
                if state.loaded {
                    tracing::debug!("keeping previous view after failed reload");
                    return Ok((true, vec![]));
                }
            }
            state.loaded = true;
            state.set_records(records.clone());
            Ok((true, vec![]))
        }

        Event::AnalyzeRequested { input } => match normalize_url(input) {
            Ok(url) => {
                tracing::debug!(url = %url, "analysis requested");
                state.advice = None;
                Ok((false, vec![Action::Analyze { url }]))
            }
            Err(e) => {
                state.push_notice(Notice::error(Notice::ANALYSIS_FAILED, e.to_string()));
                Ok((true, vec![]))
            }
        },

        Event::AnalysisCompleted(analysis) => {
            state.push_notice(Notice::info(
                Notice::ANALYSIS_COMPLETE,
                format!("Footprint calculated for {}", analysis.url),
            ));
            state.last_analysis = Some(analysis.clone());

            let mut actions = Vec::with_capacity(2);
            match ScoreRecord::now(analysis.url.clone(), analysis.score) {
                Ok(record) => actions.push(Action::AppendRecord(record)),
                Err(e) => state.push_notice(Notice::error(Notice::ERROR_SAVING, e.to_string())),
            }
            if state.advice_enabled {
                actions.push(Action::RequestAdvice {
                    url: analysis.url.clone(),
                    score: analysis.score,
                });
            }
            Ok((true, actions))
        }

        Event::AnalysisFailed { url, error } => {
            state.push_notice(Notice::error(
                Notice::ANALYSIS_FAILED,
                format!("Could not analyze {url}: {error}"),
            ));
            Ok((true, vec![]))
        }

        Event::AdviceReady(advice) => {
            state.advice = Some(advice.clone());
            Ok((true, vec![]))
        }

        Event::AdviceFailed { error } => {
            // Advice is optional; the record is already stored.
            tracing::warn!(error = %error, "advice unavailable");
            state.advice = None;
            Ok((false, vec![]))
        }

        Event::AppendFailed { url, error } => {
            state.push_notice(Notice::error(
                Notice::ERROR_SAVING,
                format!("Could not save the result for {url}: {error}"),
            ));
            Ok((true, vec![]))
        }

        Event::TimeframeSelected(timeframe) => Ok((state.set_timeframe(*timeframe), vec![])),

        Event::ClearRequested => Ok((false, vec![Action::ClearRecords])),

        Event::ClearCompleted => {
            state.push_notice(Notice::info(
                Notice::DATA_CLEARED,
                "All historical report data has been removed.",
            ));
            Ok((true, vec![]))
        }

        Event::ClearFailed { error } => {
            state.push_notice(Notice::error(
                Notice::ERROR_CLEARING,
                format!("Could not remove report data from storage: {error}"),
            ));
            Ok((true, vec![]))
        }

        Event::ExportRequested { format } => {
            if state.summaries.is_empty() {
                state.push_notice(Notice::error(Notice::NO_DATA, "Cannot download an empty report."));
                return Ok((true, vec![]));
            }
            Ok((
                false,
                vec![Action::ExportReport {
                    timeframe: state.timeframe,
                    format: *format,
                }],
            ))
        }

        Event::ExportCompleted { path } => {
            state.push_notice(Notice::info(
                Notice::REPORT_DOWNLOADED,
                format!("Your {} report was written to {}", state.timeframe, path.display()),
            ));
            state.last_export = Some(path.clone());
            Ok((true, vec![]))
        }

        Event::ExportFailed { error } => {
            state.push_notice(Notice::error(Notice::EXPORT_FAILED, error.clone()));
            Ok((true, vec![]))
        }

        Event::StoreChanged(change) => {
            match &change.kind {
                ChangeKind::Updated { snapshot } => state.set_records(snapshot.clone()),
                ChangeKind::Cleared => state.set_records(Vec::new()),
            }
            state.loaded = true;
            Ok((true, vec![]))
        }

        Event::ChangesMissed { count } => {
            tracing::debug!(count, "reloading after missed changes");
            Ok((false, vec![Action::LoadRecords]))
        }
    }
}

const fn event_name(event: &Event) -> &'static str {
    match event {
        Event::Mounted => "mounted",
        Event::RecordsLoaded { .. } => "records_loaded",
        Event::AnalyzeRequested { .. } => "analyze_requested",
        Event::AnalysisCompleted(_) => "analysis_completed",
        Event::AnalysisFailed { .. } => "analysis_failed",
        Event::AdviceReady(_) => "advice_ready",
        Event::AdviceFailed { .. } => "advice_failed",
        Event::AppendFailed { .. } => "append_failed",
        Event::TimeframeSelected(_) => "timeframe_selected",
        Event::ClearRequested => "clear_requested",
        Event::ClearCompleted => "clear_completed",
        Event::ClearFailed { .. } => "clear_failed",
        Event::ExportRequested { .. } => "export_requested",
        Event::ExportCompleted { .. } => "export_completed",
        Event::ExportFailed { .. } => "export_failed",
        Event::StoreChanged(_) => "store_changed",
        Event::ChangesMissed { .. } => "changes_missed",
    }
}
