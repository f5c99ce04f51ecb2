//! Dashboard runtime executing actions against real capabilities.
//!
//! The runtime owns the injected store, scorer and advisor, plus a subscription
//! on the store's change topic. [`Dashboard::dispatch`] runs an event through
//! [`handle_event`], executes the returned actions, and feeds each outcome back
//! in until the queue is empty.

use crate::app::handler::{handle_event, Event};
use crate::app::state::{DashboardState, Notice};
use crate::app::Action;
use crate::domain::error::Result;
use crate::domain::Timeframe;
use crate::notifier::{ChangeNotifier, Subscription};
use crate::report::{Report, ReportFormat};
use crate::scoring::{Advisor, Scorer};
use crate::storage::RecordStore;
use chrono::{Local, NaiveDate};
use std::collections::VecDeque;
use std::path::PathBuf;

/// One running dashboard session.
pub struct Dashboard {
    state: DashboardState,
    store: Box<dyn RecordStore>,
    scorer: Box<dyn Scorer>,
    advisor: Box<dyn Advisor>,
    subscription: Subscription,
    export_dir: PathBuf,
    today: fn() -> NaiveDate,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("state", &self.state)
            .field("store_key", &self.store.key())
            .field("export_dir", &self.export_dir)
            .finish_non_exhaustive()
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Dashboard {
    /// Wires a dashboard to its capabilities.
    ///
    /// Subscribes to `notifier` immediately so no change published after
    /// construction is missed; call [`Dashboard::mount`] to perform the initial
    /// load.
    #[must_use]
    pub fn new(
        store: Box<dyn RecordStore>,
        notifier: &ChangeNotifier,
        scorer: Box<dyn Scorer>,
        advisor: Box<dyn Advisor>,
        timeframe: Timeframe,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: DashboardState::new(timeframe),
            store,
            scorer,
            advisor,
            subscription: notifier.subscribe(),
            export_dir: export_dir.into(),
            today: local_today,
        }
    }

    /// Overrides the clock used for export dates.
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    #[must_use]
    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut DashboardState {
        &mut self.state
    }

    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Removes and returns pending user notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.state.take_notices()
    }

    /// Loads the store explicitly; notifications alone are never relied upon.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub fn mount(&mut self) -> Result<bool> {
        self.dispatch(Event::Mounted)
    }

    /// Processes pending change notifications.
    ///
    /// Returns whether the view changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub fn sync(&mut self) -> Result<bool> {
        self.apply_changes()
    }

    /// Runs `event` and every follow-up event its actions produce.
    ///
    /// Returns whether any step changed the view.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`]; failures of individual actions
    /// become notices instead.
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let mut queue = VecDeque::from([event]);
        let mut changed = false;

        while let Some(event) = queue.pop_front() {
            let (view_changed, actions) = handle_event(&mut self.state, &event)?;
            changed |= view_changed;
            queue.extend(actions.into_iter().filter_map(|action| self.execute(action)));
        }

        // Writes issued above published on our own topic; apply them now so the
        // view reflects the store before returning.
        changed |= self.apply_changes()?;
        Ok(changed)
    }

    /// Applies queued change events, each under the publisher's trace context.
    ///
    /// A lagged subscription falls back to a full reload.
    fn apply_changes(&mut self) -> Result<bool> {
        let mut changed = false;
        for change in self.subscription.drain() {
            let _guard = change.trace_context.as_ref().and_then(|ctx| ctx.attach());
            let _span = tracing::debug_span!("store_changed", topic = %change.topic).entered();
            let (view_changed, _) = handle_event(&mut self.state, &Event::StoreChanged(change))?;
            changed |= view_changed;
        }

        let count = self.subscription.take_missed();
        if count > 0 {
            changed |= self.dispatch(Event::ChangesMissed { count })?;
        }
        Ok(changed)
    }

    fn execute(&self, action: Action) -> Option<Event> {
        let _span = tracing::debug_span!("execute_action", action = ?action).entered();

        let event = match action {
            Action::LoadRecords => {
                let outcome = self.store.load();
                Event::RecordsLoaded {
                    records: outcome.records,
                    error: outcome.error.map(|e| e.to_string()),
                }
            }
            Action::Analyze { url } => match self.scorer.analyze(&url) {
                Ok(analysis) => Event::AnalysisCompleted(analysis),
                Err(e) => Event::AnalysisFailed {
                    url,
                    error: e.to_string(),
                },
            },
            Action::AppendRecord(record) => match self.store.append(&record) {
                // The store publishes the new snapshot; nothing else to report.
                Ok(()) => return None,
                Err(e) => Event::AppendFailed {
                    url: record.website_url,
                    error: e.to_string(),
                },
            },
            Action::RequestAdvice { url, score } => match self.advisor.suggest(&url, score) {
                Ok(advice) => Event::AdviceReady(advice),
                Err(e) => Event::AdviceFailed { error: e.to_string() },
            },
            Action::ClearRecords => match self.store.clear() {
                Ok(()) => Event::ClearCompleted,
                Err(e) => Event::ClearFailed { error: e.to_string() },
            },
            Action::ExportReport { timeframe, format } => self.export(timeframe, format),
        };
        Some(event)
    }

    fn export(&self, timeframe: Timeframe, format: ReportFormat) -> Event {
        let result = Report::build(&self.state.summaries, timeframe, (self.today)())
            .and_then(|report| report.export(&self.export_dir, format));
        match result {
            Ok(path) => Event::ExportCompleted { path },
            Err(e) => Event::ExportFailed { error: e.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoreRecord;
    use crate::notifier::ChangeKind;
    use crate::scoring::{HeuristicScorer, StaticAdvisor};
    use crate::storage::JsonRecordStore;
    use tempfile::TempDir;

    #[test]
    fn lagged_subscription_reloads_from_store() {
        let dir = TempDir::new().unwrap();
        let notifier = ChangeNotifier::with_capacity("ecoBrowseReports", 1);
        let store = JsonRecordStore::new(dir.path(), notifier.clone()).unwrap();
        let writer = JsonRecordStore::new(dir.path(), ChangeNotifier::default()).unwrap();
        let mut dashboard = Dashboard::new(
            Box::new(store),
            &notifier,
            Box::new(HeuristicScorer),
            Box::new(StaticAdvisor),
            Timeframe::Annual,
            dir.path(),
        );
        dashboard.mount().unwrap();

        for ts in 1..=3 {
            writer
                .append(&ScoreRecord::new(ts, "https://a.com", 0.5).unwrap())
                .unwrap();
        }
        // Overflow the one-slot buffer so two events are lost.
        for _ in 0..3 {
            notifier.publish(ChangeKind::Updated { snapshot: vec![] });
        }

        assert!(dashboard.sync().unwrap());
        assert_eq!(dashboard.state().records.len(), 3);
    }
}
