//! Scores a fixed list of well-known sites for comparison with the history.

use super::analysis::{normalize_url, Scorer};
use std::cmp::Ordering;
use std::fmt;

/// Widely visited sites scored by [`benchmark`] when no list is given.
pub const POPULAR_SITES: [&str; 10] = [
    "google.com",
    "youtube.com",
    "facebook.com",
    "wikipedia.org",
    "amazon.com",
    "reddit.com",
    "yahoo.com",
    "instagram.com",
    "twitter.com",
    "linkedin.com",
];

/// Result of scoring one site.
#[derive(Debug, Clone, PartialEq)]
pub enum BenchmarkOutcome {
    Scored(f64),
    Failed(String),
}

/// One row of a benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteBenchmark {
    /// Site as given, without scheme.
    pub site: String,
    pub outcome: BenchmarkOutcome,
}

impl SiteBenchmark {
    /// Score on the 0-100 scale, `None` for a failure.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded(&self) -> Option<i64> {
        match self.outcome {
            BenchmarkOutcome::Scored(score) => Some((score * 100.0).round() as i64),
            BenchmarkOutcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.outcome, BenchmarkOutcome::Failed(_))
    }
}

impl fmt::Display for SiteBenchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.outcome, self.rounded()) {
            (BenchmarkOutcome::Failed(error), _) => write!(f, "{} (error: {error})", self.site),
            (_, score) => write!(f, "{} ({})", self.site, score.unwrap_or_default()),
        }
    }
}

/// Scores every site in `sites` through `scorer`.
///
/// A failing site is reported in its row and does not stop the others. Rows are
/// ordered best score first with failures last; equal scores keep input order.
///
/// # Examples
///
/// ```
/// use ecobrowse::scoring::{benchmark, HeuristicScorer, POPULAR_SITES};
///
/// let rows = benchmark(&HeuristicScorer, &POPULAR_SITES);
/// assert_eq!(rows.len(), 10);
/// assert!(rows.iter().all(|row| !row.is_failed()));
/// ```
#[must_use]
pub fn benchmark(scorer: &dyn Scorer, sites: &[&str]) -> Vec<SiteBenchmark> {
    let _span = tracing::debug_span!("benchmark", site_count = sites.len()).entered();

    let mut rows: Vec<SiteBenchmark> = sites
        .iter()
        .map(|site| {
            let outcome = match normalize_url(site).and_then(|url| scorer.analyze(&url)) {
                Ok(analysis) => BenchmarkOutcome::Scored(analysis.score),
                Err(e) => {
                    tracing::warn!(site, error = %e, "benchmark site failed");
                    BenchmarkOutcome::Failed(e.to_string())
                }
            };
            SiteBenchmark {
                site: (*site).to_string(),
                outcome,
            }
        })
        .collect();

    rows.sort_by(|a, b| match (&a.outcome, &b.outcome) {
        (BenchmarkOutcome::Scored(x), BenchmarkOutcome::Scored(y)) => y.total_cmp(x),
        (BenchmarkOutcome::Scored(_), BenchmarkOutcome::Failed(_)) => Ordering::Less,
        (BenchmarkOutcome::Failed(_), BenchmarkOutcome::Scored(_)) => Ordering::Greater,
        (BenchmarkOutcome::Failed(_), BenchmarkOutcome::Failed(_)) => Ordering::Equal,
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{EcoBrowseError, Result};
    use crate::scoring::Analysis;

    /// Scores by table; unknown hosts fail.
    struct TableScorer(&'static [(&'static str, f64)]);

    impl Scorer for TableScorer {
        fn analyze(&self, url: &str) -> Result<Analysis> {
            let host = url.trim_start_matches("https://");
            let (_, score) = self
                .0
                .iter()
                .find(|(site, _)| *site == host)
                .ok_or_else(|| EcoBrowseError::Scoring(format!("unreachable: {url}")))?;
            Ok(Analysis {
                url: url.to_string(),
                score: *score,
                calculation_notes: String::new(),
                data_transfer_bytes: 0,
                server_efficiency: 0.0,
                renewable_share: 0.0,
            })
        }
    }

    #[test]
    fn orders_best_first_with_failures_last() {
        let scorer = TableScorer(&[("a.com", 0.2), ("b.com", 0.9), ("c.com", 0.5)]);
        let rows = benchmark(&scorer, &["down.com", "a.com", "b.com", "c.com"]);

        let sites: Vec<&str> = rows.iter().map(|row| row.site.as_str()).collect();
        assert_eq!(sites, ["b.com", "c.com", "a.com", "down.com"]);
        assert_eq!(rows[0].rounded(), Some(90));
        assert!(rows[3].is_failed());
        assert_eq!(rows[3].rounded(), None);
    }

    #[test]
    fn one_failure_does_not_abort_the_rest() {
        let scorer = TableScorer(&[("ok.com", 0.4)]);
        let rows = benchmark(&scorer, &["first.com", "ok.com", "second.com"]);

        assert_eq!(rows.iter().filter(|row| row.is_failed()).count(), 2);
        assert_eq!(rows[0].to_string(), "ok.com (40)");
        // Failures keep their input order.
        assert_eq!(rows[1].site, "first.com");
        assert_eq!(rows[2].site, "second.com");
        assert!(rows[1].to_string().starts_with("first.com (error: "));
    }

    #[test]
    fn blank_site_is_a_failure() {
        let scorer = TableScorer(&[]);
        let rows = benchmark(&scorer, &["  "]);
        assert!(rows[0].is_failed());
    }
}
