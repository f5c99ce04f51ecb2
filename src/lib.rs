//! EcoBrowse: a local eco-efficiency history and reporting engine.
//!
//! EcoBrowse keeps a persisted history of website eco-efficiency scores and
//! turns it into calendar-bucketed statistics and exportable reports:
//! - Append-only score history stored as one JSON document per storage key
//! - Weekly (Sunday-aligned), monthly and annual period summaries
//! - Text, Markdown and CSV report export
//! - Change notifications so every open view stays consistent after a write
//! - Pluggable scoring and advisory capabilities with offline defaults

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Command-line front end (main.rs)                   │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling and notices                       │
//! │  - Action execution (Dashboard)                     │
//! └─────────────────────────────────────────────────────┘
//!      │             │              │              │
//! ┌──────────┐ ┌───────────┐ ┌────────────┐ ┌────────────┐
//! │ storage/ │ │ notifier/ │ │ analytics/ │ │ report/    │
//! │ JSON I/O │ │ pub/sub   │ │ buckets    │ │ render     │
//! │ schema   │ │ watcher   │ │ summaries  │ │ export     │
//! └──────────┘ └───────────┘ └────────────┘ └────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, scoring and infrastructure                 │
//! │  - Records, timeframes, errors (domain/)            │
//! │  - Scorer / Advisor traits (scoring/)               │
//! │  - Platform paths (infrastructure/)                 │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - stderr logging, optional OTLP file export        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! Settings are read from a TOML file (see [`infrastructure::config_path`]);
//! every key is optional:
//!
//! ```toml
//! data_dir = "~/.local/share/ecobrowse"
//! storage_key = "ecoBrowseReports"
//! default_timeframe = "monthly"
//! export_dir = "~/Documents"
//! trace_level = "info"
//! trace_export = true
//! trace_max_bytes = 10485760
//! trace_backups = 3
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use ecobrowse::app::Event;
//! use ecobrowse::{initialize, Config};
//!
//! let config = Config::load()?;
//! let mut services = initialize(&config)?;
//! services.dashboard.mount()?;
//! services.dashboard.dispatch(Event::AnalyzeRequested { input: "example.com".into() })?;
//! for summary in &services.dashboard.state().summaries {
//!     println!("{}: {} visits", summary.period, summary.total_visits);
//! }
//! # Ok::<(), ecobrowse::EcoBrowseError>(())
//! ```

pub mod analytics;
pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod notifier;
pub mod observability;
pub mod report;
pub mod scoring;
pub mod storage;

pub use app::{handle_event, Action, Dashboard, DashboardState, Event, Notice};
pub use domain::{EcoBrowseError, Rating, Result, ScoreRecord, Timeframe};

use notifier::ChangeNotifier;
use observability::{DEFAULT_BACKUPS, DEFAULT_MAX_BYTES};
use scoring::{HeuristicScorer, StaticAdvisor};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use storage::{JsonRecordStore, DEFAULT_STORAGE_KEY};

/// User configuration, read from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the record store and trace export.
    ///
    /// `~` is expanded. Default: platform data directory.
    pub data_dir: Option<String>,

    /// Name of the persisted collection and of the change topic.
    pub storage_key: String,

    /// Timeframe used when a command does not specify one.
    pub default_timeframe: Timeframe,

    /// Directory exports are written to. Default: current directory.
    pub export_dir: Option<String>,

    /// Log filter directive, e.g. `warn` or `ecobrowse=debug`.
    pub trace_level: String,

    /// Whether spans are exported as OTLP JSON into the data directory.
    pub trace_export: bool,

    /// Size at which the trace file is rotated.
    pub trace_max_bytes: u64,

    /// Rotated trace files to keep.
    pub trace_backups: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_timeframe: Timeframe::default(),
            export_dir: None,
            trace_level: "warn".to_string(),
            trace_export: false,
            trace_max_bytes: DEFAULT_MAX_BYTES,
            trace_backups: DEFAULT_BACKUPS,
        }
    }
}

impl Config {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EcoBrowseError::Config`] for invalid TOML, unknown keys, or
    /// values of the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecobrowse::{Config, Timeframe};
    ///
    /// let config = Config::from_toml_str("default_timeframe = \"annual\"")?;
    /// assert_eq!(config.default_timeframe, Timeframe::Annual);
    /// assert_eq!(config.storage_key, "ecoBrowseReports");
    /// # Ok::<(), ecobrowse::EcoBrowseError>(())
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| EcoBrowseError::Config(e.to_string()))
    }

    /// Reads `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = ?path, "loading configuration");
                Self::from_toml_str(&contents)
                    .map_err(|e| EcoBrowseError::Config(format!("{}: {e}", path.display())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads the configuration from its platform location.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_file`].
    pub fn load() -> Result<Self> {
        Self::from_file(&infrastructure::config_path())
    }

    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map_or_else(infrastructure::data_dir, infrastructure::expand_tilde)
    }

    #[must_use]
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir
            .as_deref()
            .map_or_else(|| PathBuf::from("."), infrastructure::expand_tilde)
    }
}

/// Everything a front end needs, wired together.
#[derive(Debug)]
pub struct Services {
    /// Channel the store publishes on; clone it for additional observers.
    pub notifier: ChangeNotifier,

    /// Backing file of the record store.
    pub store_path: PathBuf,

    pub dashboard: Dashboard,
}

/// Opens the configured store and wires a dashboard with the bundled
/// [`HeuristicScorer`] and [`StaticAdvisor`].
///
/// # Errors
///
/// Returns an error if the storage key is invalid or the data directory cannot
/// be created.
pub fn initialize(config: &Config) -> Result<Services> {
    let data_dir = config.resolved_data_dir();
    tracing::debug!(data_dir = ?data_dir, key = %config.storage_key, "initializing ecobrowse");

    let notifier = ChangeNotifier::new(&config.storage_key);
    let store = JsonRecordStore::with_key(&data_dir, config.storage_key.clone(), notifier.clone())?;
    let store_path = store.file_path().to_path_buf();

    let dashboard = Dashboard::new(
        Box::new(store),
        &notifier,
        Box::new(HeuristicScorer),
        Box::new(StaticAdvisor),
        config.default_timeframe,
        config.resolved_export_dir(),
    );

    Ok(Services {
        notifier,
        store_path,
        dashboard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("scan_depth = 4").unwrap_err();
        assert!(matches!(err, EcoBrowseError::Config(_)));
    }

    #[test]
    fn bad_timeframe_is_a_config_error() {
        assert!(Config::from_toml_str("default_timeframe = \"daily\"").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "storage_key = \"work\"\ntrace_export = true\ntrace_backups = 1\nexport_dir = \"/tmp/out\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage_key, "work");
        assert!(config.trace_export);
        assert_eq!(config.trace_backups, 1);
        assert_eq!(config.resolved_export_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(config.default_timeframe, Timeframe::Weekly);
    }

    #[test]
    fn initialize_uses_storage_key_for_file_and_topic() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_string_lossy().into_owned()),
            storage_key: "work".to_string(),
            ..Config::default()
        };
        let services = initialize(&config).unwrap();
        assert_eq!(services.notifier.topic(), "work");
        assert_eq!(services.store_path, dir.path().join("work.json"));
    }
}
