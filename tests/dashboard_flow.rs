use chrono::NaiveDate;
use ecobrowse::app::{Dashboard, Event, Notice};
use ecobrowse::notifier::{ChangeNotifier, StoreWatcher};
use ecobrowse::report::ReportFormat;
use ecobrowse::scoring::{Advice, Advisor, Analysis, HeuristicScorer, Scorer, StaticAdvisor};
use ecobrowse::storage::{JsonRecordStore, RecordStore};
use ecobrowse::{EcoBrowseError, Result, ScoreRecord, Timeframe};
use tempfile::TempDir;

struct FailingScorer;

impl Scorer for FailingScorer {
    fn analyze(&self, url: &str) -> Result<Analysis> {
        Err(EcoBrowseError::Scoring(format!("could not analyze {url}")))
    }
}

struct FailingAdvisor;

impl Advisor for FailingAdvisor {
    fn suggest(&self, _url: &str, _score: f64) -> Result<Advice> {
        Err(EcoBrowseError::Advisory("offline".to_string()))
    }
}

fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 30).unwrap()
}

fn dashboard(dir: &TempDir, scorer: Box<dyn Scorer>, advisor: Box<dyn Advisor>) -> (Dashboard, ChangeNotifier) {
    let notifier = ChangeNotifier::default();
    let store = JsonRecordStore::new(dir.path().join("data"), notifier.clone()).unwrap();
    let dashboard = Dashboard::new(
        Box::new(store),
        &notifier,
        scorer,
        advisor,
        Timeframe::Annual,
        dir.path().join("exports"),
    )
    .with_clock(fixed_day);
    (dashboard, notifier)
}

fn titles(notices: &[Notice]) -> Vec<&'static str> {
    notices.iter().map(|n| n.title).collect()
}

#[test]
fn analysis_is_stored_and_reflected_in_view() {
    let dir = TempDir::new().unwrap();
    let (mut dash, _) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));
    dash.mount().unwrap();

    dash.dispatch(Event::AnalyzeRequested {
        input: "example.com".into(),
    })
    .unwrap();

    let state = dash.state();
    assert_eq!(state.records.len(), 1);
    assert_eq!(state.records[0].website_url, "https://example.com");
    assert_eq!(state.summaries.len(), 1);
    assert!(state.advice.as_ref().is_some_and(|a| a.suggestions.len() >= 3));
    assert_eq!(titles(&dash.take_notices()), [Notice::ANALYSIS_COMPLETE]);
}

#[test]
fn failed_analysis_leaves_store_untouched() {
    let dir = TempDir::new().unwrap();
    let (mut dash, _) = dashboard(&dir, Box::new(FailingScorer), Box::new(StaticAdvisor));
    dash.mount().unwrap();

    dash.dispatch(Event::AnalyzeRequested {
        input: "https://error.com".into(),
    })
    .unwrap();

    assert!(dash.store().load().records.is_empty());
    assert_eq!(titles(&dash.take_notices()), [Notice::ANALYSIS_FAILED]);
}

#[test]
fn advisor_failure_does_not_block_storage() {
    let dir = TempDir::new().unwrap();
    let (mut dash, _) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(FailingAdvisor));
    dash.mount().unwrap();

    dash.dispatch(Event::AnalyzeRequested {
        input: "example.org".into(),
    })
    .unwrap();

    assert_eq!(dash.store().load().records.len(), 1);
    assert!(dash.state().advice.is_none());
    assert!(dash.take_notices().iter().all(|n| !n.is_error()));
}

#[test]
fn two_views_stay_consistent_through_notifier() {
    let dir = TempDir::new().unwrap();
    let (mut writer, notifier) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));

    let reader_store = JsonRecordStore::new(dir.path().join("data"), notifier.clone()).unwrap();
    let mut reader = Dashboard::new(
        Box::new(reader_store),
        &notifier,
        Box::new(HeuristicScorer),
        Box::new(StaticAdvisor),
        Timeframe::Monthly,
        dir.path().join("exports"),
    );
    reader.mount().unwrap();
    writer.mount().unwrap();

    writer
        .dispatch(Event::AnalyzeRequested {
            input: "a.com".into(),
        })
        .unwrap();
    assert!(reader.sync().unwrap());
    assert_eq!(reader.state().records.len(), 1);

    writer.dispatch(Event::ClearRequested).unwrap();
    assert!(reader.sync().unwrap());
    assert!(reader.state().records.is_empty());
    assert!(writer.state().records.is_empty());
    assert_eq!(titles(&writer.take_notices()), [Notice::ANALYSIS_COMPLETE, Notice::DATA_CLEARED]);
}

#[test]
fn export_writes_named_file_and_empty_export_is_refused() {
    let dir = TempDir::new().unwrap();
    let (mut dash, _) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));
    dash.mount().unwrap();

    dash.dispatch(Event::ExportRequested {
        format: ReportFormat::Markdown,
    })
    .unwrap();
    assert_eq!(titles(&dash.take_notices()), [Notice::NO_DATA]);
    assert!(!dir.path().join("exports").exists());

    dash.dispatch(Event::AnalyzeRequested {
        input: "a.com".into(),
    })
    .unwrap();
    dash.dispatch(Event::ExportRequested {
        format: ReportFormat::Csv,
    })
    .unwrap();

    let path = dash.state().last_export.clone().unwrap();
    assert_eq!(path, dir.path().join("exports/EcoBrowse_Report_annual_2024-07-30.csv"));
    let contents = std::fs::read_to_string(path).unwrap();
    assert!(contents.contains("https://a.com"));
}

#[test]
fn timeframe_switch_recomputes_from_full_history() {
    let dir = TempDir::new().unwrap();
    let (mut dash, _) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));

    // Mid-month dates stay in distinct weeks and months in every time zone.
    for (ts, url) in [
        (1_705_320_000_000, "jan.com"),   // 2024-01-15T12:00Z
        (1_708_000_000_000, "feb.com"),   // 2024-02-15
        (1_710_500_000_000, "march.com"), // 2024-03-15
    ] {
        dash.store()
            .append(&ScoreRecord::new(ts, url, 0.5).unwrap())
            .unwrap();
    }
    dash.mount().unwrap();
    assert_eq!(dash.state().summaries.len(), 1);

    dash.dispatch(Event::TimeframeSelected(Timeframe::Monthly)).unwrap();
    assert_eq!(dash.state().summaries.len(), 3);

    dash.dispatch(Event::TimeframeSelected(Timeframe::Weekly)).unwrap();
    let total: usize = dash.state().summaries.iter().map(|s| s.total_visits).sum();
    assert_eq!(total, 3);
}

#[test]
fn malformed_store_mounts_empty_with_notice() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/ecoBrowseReports.json"), "{not json").unwrap();

    let (mut dash, _) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));
    dash.mount().unwrap();

    assert!(dash.state().records.is_empty());
    assert_eq!(titles(&dash.take_notices()), [Notice::ERROR_LOADING]);
}

#[test]
fn watcher_brings_in_writes_from_another_process() {
    let dir = TempDir::new().unwrap();
    let (mut dash, notifier) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));
    dash.mount().unwrap();

    let path = dir.path().join("data/ecoBrowseReports.json");
    let mut watcher = StoreWatcher::new(&path);

    // Different notifier: nothing reaches the dashboard except via the file.
    let other = JsonRecordStore::new(dir.path().join("data"), ChangeNotifier::default()).unwrap();
    other
        .append(&ScoreRecord::new(1_705_320_000_000, "https://b.com", 0.4).unwrap())
        .unwrap();
    assert!(!dash.sync().unwrap());

    assert!(watcher.poll(dash.store(), &notifier).unwrap());
    assert!(dash.sync().unwrap());
    assert_eq!(dash.state().records.len(), 1);
}

#[test]
fn unreadable_external_change_keeps_last_good_view() {
    let dir = TempDir::new().unwrap();
    let (mut dash, notifier) = dashboard(&dir, Box::new(HeuristicScorer), Box::new(StaticAdvisor));
    dash.dispatch(Event::AnalyzeRequested {
        input: "a.com".into(),
    })
    .unwrap();
    dash.mount().unwrap();
    dash.take_notices();

    let path = dir.path().join("data/ecoBrowseReports.json");
    let mut watcher = StoreWatcher::new(&path);
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    let error = watcher.poll(dash.store(), &notifier).unwrap_err();
    assert!(!dash.sync().unwrap());
    assert_eq!(dash.state().records.len(), 1);

    dash.dispatch(Event::RecordsLoaded {
        records: Vec::new(),
        error: Some(error.to_string()),
    })
    .unwrap();
    assert_eq!(dash.state().records.len(), 1);
    assert_eq!(titles(&dash.take_notices()), [Notice::ERROR_LOADING]);
}
