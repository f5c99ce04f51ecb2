//! Period aggregation of score records.
//!
//! [`aggregate`] is a pure function from `(records, timeframe)` to per-period
//! summaries, most recent period first. It keeps no state between calls, so it
//! is re-run from the live record set whenever the store changes.

use super::period::PeriodKey;
use crate::domain::{is_valid_score, ScoreRecord, Timeframe};
use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Scale factor from the stored `[0, 1]` score to the displayed `[0, 100]` one.
const PERCENT: f64 = 100.0;

/// A URL paired with its score on the `[0, 100]` scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteScore {
    pub url: String,
    pub score: f64,
}

impl SiteScore {
    /// Score rounded to the nearest integer.
    #[must_use]
    pub fn rounded(&self) -> i64 {
        round_score(self.score)
    }
}

impl fmt::Display for SiteScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.rounded())
    }
}

/// Aggregate statistics over every record sharing one [`PeriodKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Human-readable period label.
    pub period: String,

    /// First calendar day of the period.
    pub period_start: NaiveDate,

    /// Number of records in the bucket; always at least one.
    pub total_visits: usize,

    /// Mean score scaled to `[0, 100]`.
    pub average_score: f64,

    /// Highest-scoring site; earliest in input order wins ties.
    pub best_site: SiteScore,

    /// Lowest-scoring site; earliest in input order wins ties.
    pub worst_site: SiteScore,
}

impl PeriodSummary {
    /// Average score rounded to the nearest integer.
    #[must_use]
    pub fn rounded_average(&self) -> i64 {
        round_score(self.average_score)
    }
}

/// Rounds half away from zero.
#[allow(clippy::cast_possible_truncation)]
fn round_score(score: f64) -> i64 {
    score.round() as i64
}

/// Running totals for one bucket.
#[derive(Debug)]
struct Accumulator {
    count: usize,
    sum: f64,
    best: (String, f64),
    worst: (String, f64),
}

impl Accumulator {
    fn new(record: &ScoreRecord) -> Self {
        Self {
            count: 1,
            sum: record.score,
            best: (record.website_url.clone(), record.score),
            worst: (record.website_url.clone(), record.score),
        }
    }

    fn add(&mut self, record: &ScoreRecord) {
        self.count += 1;
        self.sum += record.score;

        // Strict comparisons keep the first holder of an equal extreme.
        if record.score > self.best.1 {
            self.best = (record.website_url.clone(), record.score);
        }
        if record.score < self.worst.1 {
            self.worst = (record.website_url.clone(), record.score);
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_summary(self, key: PeriodKey) -> PeriodSummary {
        let (best_url, best_score) = self.best;
        let (worst_url, worst_score) = self.worst;
        PeriodSummary {
            period: key.label(),
            period_start: key.start,
            total_visits: self.count,
            average_score: self.sum / self.count as f64 * PERCENT,
            best_site: SiteScore {
                url: best_url,
                score: best_score * PERCENT,
            },
            worst_site: SiteScore {
                url: worst_url,
                score: worst_score * PERCENT,
            },
        }
    }
}

/// Aggregates `records` on the local system calendar.
///
/// See [`aggregate_in`] for the algorithm.
#[must_use]
pub fn aggregate(records: &[ScoreRecord], timeframe: Timeframe) -> Vec<PeriodSummary> {
    aggregate_in(records, timeframe, &Local)
}

/// Aggregates `records` on the calendar of `tz`.
///
/// 1. Records with a non-finite score, a score outside `[0, 1]`, or an
///    unrepresentable timestamp are skipped.
/// 2. Remaining records are grouped by [`PeriodKey`], scanning in input order.
/// 3. Each group yields one [`PeriodSummary`].
/// 4. Summaries are ordered by period start, most recent first.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use ecobrowse::analytics::aggregate_in;
/// use ecobrowse::{ScoreRecord, Timeframe};
///
/// let records = vec![
///     ScoreRecord::new(1_721_606_400_000, "a.com", 0.9)?,
///     ScoreRecord::new(1_721_610_000_000, "b.com", 0.3)?,
/// ];
/// let summaries = aggregate_in(&records, Timeframe::Weekly, &Utc);
/// assert_eq!(summaries.len(), 1);
/// assert_eq!(summaries[0].rounded_average(), 60);
/// assert_eq!(summaries[0].best_site.to_string(), "a.com (90)");
/// # Ok::<(), ecobrowse::EcoBrowseError>(())
/// ```
#[must_use]
pub fn aggregate_in<Tz: TimeZone>(
    records: &[ScoreRecord],
    timeframe: Timeframe,
    tz: &Tz,
) -> Vec<PeriodSummary> {
    let _span = tracing::debug_span!("aggregate",
        timeframe = %timeframe,
        input_count = records.len()
    )
    .entered();

    let mut buckets: BTreeMap<PeriodKey, Accumulator> = BTreeMap::new();
    let mut skipped = 0_usize;

    for record in records {
        if !is_valid_score(record.score) {
            tracing::warn!(
                website_url = %record.website_url,
                score = record.score,
                "skipping record with invalid score"
            );
            skipped += 1;
            continue;
        }

        let Some(key) = PeriodKey::for_timestamp(record.timestamp, timeframe, tz) else {
            tracing::warn!(timestamp = record.timestamp, "skipping record with unrepresentable timestamp");
            skipped += 1;
            continue;
        };

        buckets
            .entry(key)
            .and_modify(|acc| acc.add(record))
            .or_insert_with(|| Accumulator::new(record));
    }

    // Keys of one timeframe are unique per start date, so descending key order
    // is exactly most-recent-period-first.
    let summaries: Vec<PeriodSummary> = buckets
        .into_iter()
        .rev()
        .map(|(key, acc)| acc.into_summary(key))
        .collect();

    tracing::debug!(period_count = summaries.len(), skipped, "aggregation complete");
    summaries
}
