//! Score record domain model.
//!
//! A [`ScoreRecord`] is one observation of a website's eco-efficiency score at a
//! point in time. Records are created exactly once, after a completed analysis,
//! and are never mutated afterwards.

use super::error::{EcoBrowseError, Result};
use serde::{Deserialize, Serialize};

/// Lower bound of the eco-efficiency scale (worst).
pub const MIN_SCORE: f64 = 0.0;

/// Upper bound of the eco-efficiency scale (best).
pub const MAX_SCORE: f64 = 1.0;

/// One persisted observation of a URL's computed efficiency score.
///
/// Fields are public so snapshots can be built freely (for example in tests or
/// when importing), which is why the aggregator re-checks [`ScoreRecord::is_valid`]
/// instead of trusting the invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// The analyzed target.
    pub website_url: String,

    /// Eco-efficiency score in `[0.0, 1.0]`; higher is better.
    pub score: f64,
}

impl ScoreRecord {
    /// Creates a validated record.
    ///
    /// # Errors
    ///
    /// Returns [`EcoBrowseError::InvalidRecord`] if the URL is blank or the score
    /// is not a finite number in `[0.0, 1.0]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ecobrowse::ScoreRecord;
    ///
    /// let record = ScoreRecord::new(1_700_000_000_000, "https://example.com", 0.42)?;
    /// assert_eq!(record.website_url, "https://example.com");
    /// assert!(ScoreRecord::new(0, "https://example.com", 1.5).is_err());
    /// # Ok::<(), ecobrowse::EcoBrowseError>(())
    /// ```
    pub fn new(timestamp: i64, website_url: impl Into<String>, score: f64) -> Result<Self> {
        let website_url = website_url.into();
        if website_url.trim().is_empty() {
            return Err(EcoBrowseError::InvalidRecord("website URL is empty".to_string()));
        }
        if !is_valid_score(score) {
            return Err(EcoBrowseError::InvalidRecord(format!(
                "score {score} is outside [{MIN_SCORE}, {MAX_SCORE}]"
            )));
        }
        Ok(Self {
            timestamp,
            website_url,
            score,
        })
    }

    /// Creates a validated record stamped with the current time.
    ///
    /// # Errors
    ///
    /// Same as [`ScoreRecord::new`].
    pub fn now(website_url: impl Into<String>, score: f64) -> Result<Self> {
        Self::new(chrono::Utc::now().timestamp_millis(), website_url, score)
    }

    /// Whether the record satisfies the data model invariants.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.website_url.trim().is_empty() && is_valid_score(self.score)
    }
}

/// Returns true for finite scores inside the closed interval `[0, 1]`.
#[must_use]
pub fn is_valid_score(score: f64) -> bool {
    score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Sorts records newest-first by timestamp.
///
/// The sort is stable: records sharing a timestamp keep their relative order.
pub fn sort_newest_first(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Qualitative band for a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Good,
    Moderate,
    Poor,
}

impl Rating {
    /// Classifies a `[0, 1]` score; higher is better.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.67 {
            Self::Good
        } else if score >= 0.34 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
        };
        f.write_str(label)
    }
}
