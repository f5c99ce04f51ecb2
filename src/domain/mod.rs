//! Domain layer for the EcoBrowse analytics engine.
//!
//! Core types independent of persistence, presentation, or the external scoring
//! capability.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`record`]: The persisted observation type and score helpers
//! - [`timeframe`]: Bucket granularity selector
//!
//! # Examples
//!
//! ```
//! use ecobrowse::domain::{Result, ScoreRecord, Timeframe};
//!
//! fn observe() -> Result<ScoreRecord> {
//!     ScoreRecord::new(1_700_000_000_000, "https://example.com", 0.8)
//! }
//!
//! assert!(observe().is_ok());
//! assert_eq!(Timeframe::default(), Timeframe::Weekly);
//! ```

pub mod error;
pub mod record;
pub mod timeframe;

pub use error::{EcoBrowseError, Result};
pub use record::{is_valid_score, sort_newest_first, Rating, ScoreRecord};
pub use timeframe::Timeframe;
