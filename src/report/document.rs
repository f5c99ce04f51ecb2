//! Report document model and export.

use super::format::ReportFormat;
use super::render;
use crate::analytics::PeriodSummary;
use crate::domain::error::{EcoBrowseError, Result};
use crate::domain::Timeframe;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Report heading.
pub const TITLE: &str = "EcoBrowse Eco-Efficiency Report";

/// Fixed column order of every rendered table.
pub const COLUMNS: [&str; 5] = [
    "Period",
    "Visits",
    "Avg. Score",
    "Best Site (Score)",
    "Worst Site (Score)",
];

/// Footnote fixing the score polarity for readers.
pub const POLARITY_NOTE: &str =
    "Note: Scores range from 0 (worst) to 100 (best). Higher scores indicate better eco-efficiency.";

/// A non-empty, render-ready snapshot of one aggregation.
///
/// Construction is the only place emptiness is checked, so every `Report` that
/// exists has at least one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    summaries: Vec<PeriodSummary>,
    timeframe: Timeframe,
    generated_on: NaiveDate,
}

impl Report {
    /// Builds a report from aggregated summaries.
    ///
    /// # Errors
    ///
    /// Returns [`EcoBrowseError::NoData`] if `summaries` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use ecobrowse::report::Report;
    /// use ecobrowse::{EcoBrowseError, Timeframe};
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 7, 30).unwrap();
    /// let err = Report::build(&[], Timeframe::Weekly, today).unwrap_err();
    /// assert!(matches!(err, EcoBrowseError::NoData));
    /// ```
    pub fn build(summaries: &[PeriodSummary], timeframe: Timeframe, generated_on: NaiveDate) -> Result<Self> {
        if summaries.is_empty() {
            return Err(EcoBrowseError::NoData);
        }
        Ok(Self {
            summaries: summaries.to_vec(),
            timeframe,
            generated_on,
        })
    }

    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    #[must_use]
    pub fn generated_on(&self) -> NaiveDate {
        self.generated_on
    }

    #[must_use]
    pub fn summaries(&self) -> &[PeriodSummary] {
        &self.summaries
    }

    /// Table body: one row of display cells per period, in [`COLUMNS`] order.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.summaries
            .iter()
            .map(|s| {
                vec![
                    s.period.clone(),
                    s.total_visits.to_string(),
                    s.rounded_average().to_string(),
                    s.best_site.to_string(),
                    s.worst_site.to_string(),
                ]
            })
            .collect()
    }

    pub(super) fn timeframe_line(&self) -> String {
        format!("Timeframe: {}", self.timeframe.title())
    }

    pub(super) fn generated_line(&self) -> String {
        format!("Generated on: {}", self.generated_on.format("%Y-%m-%d"))
    }

    /// Renders the whole document.
    #[must_use]
    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => render::text(self),
            ReportFormat::Markdown => render::markdown(self),
            ReportFormat::Csv => render::csv(self),
        }
    }

    /// `EcoBrowse_Report_<timeframe>_<YYYY-MM-DD>.<ext>`
    #[must_use]
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "EcoBrowse_Report_{}_{}.{}",
            self.timeframe.as_str(),
            self.generated_on.format("%Y-%m-%d"),
            format.extension()
        )
    }

    /// Writes the rendered report into `dir` and returns the file's path.
    ///
    /// The file is written to a temporary sibling and renamed into place, so an
    /// interrupted export never leaves a truncated report behind. An existing
    /// report with the same name is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be created or the file cannot be written.
    pub fn export(&self, dir: impl AsRef<Path>, format: ReportFormat) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let _span = tracing::debug_span!("report_export",
            timeframe = %self.timeframe,
            format = %format,
            row_count = self.summaries.len()
        )
        .entered();

        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(format));
        let tmp_path = path.with_extension(format!("{}.tmp", format.extension()));

        std::fs::write(&tmp_path, self.render(format))?;
        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::info!(path = ?path, "report exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::SiteScore;
    use tempfile::TempDir;

    fn summary(period: &str, visits: usize, avg: f64, best: (&str, f64), worst: (&str, f64)) -> PeriodSummary {
        PeriodSummary {
            period: period.to_string(),
            period_start: NaiveDate::from_ymd_opt(2024, 7, 21).unwrap(),
            total_visits: visits,
            average_score: avg,
            best_site: SiteScore {
                url: best.0.to_string(),
                score: best.1,
            },
            worst_site: SiteScore {
                url: worst.0.to_string(),
                score: worst.1,
            },
        }
    }

    fn sample() -> Report {
        let summaries = vec![
            summary("Week of 2024-07-28", 1, 50.0, ("c.com", 50.0), ("c.com", 50.0)),
            summary("Week of 2024-07-21", 2, 60.0, ("a.com", 90.0), ("b.com", 30.0)),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 7, 30).unwrap();
        Report::build(&summaries, Timeframe::Weekly, today).unwrap()
    }

    #[test]
    fn rows_round_and_label_scores() {
        let rows = sample().rows();
        assert_eq!(
            rows[1],
            ["Week of 2024-07-21", "2", "60", "a.com (90)", "b.com (30)"]
        );
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let report = Report::build(
            &[summary("2024", 2, 62.5, ("a.com", 72.5), ("b.com", 52.5))],
            Timeframe::Annual,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap();
        assert_eq!(report.rows()[0], ["2024", "2", "63", "a.com (73)", "b.com (53)"]);
    }

    #[test]
    fn every_format_carries_metadata_and_footnote() {
        let report = sample();
        for format in [ReportFormat::Text, ReportFormat::Markdown, ReportFormat::Csv] {
            let doc = report.render(format);
            assert!(doc.contains(TITLE), "{format}");
            assert!(doc.contains("Timeframe: Weekly"), "{format}");
            assert!(doc.contains("Generated on: 2024-07-30"), "{format}");
            assert!(doc.contains(POLARITY_NOTE), "{format}");
            assert!(doc.contains("Best Site (Score)"), "{format}");
            assert!(doc.contains("a.com (90)"), "{format}");
        }
    }

    #[test]
    fn rows_keep_input_order() {
        let doc = sample().render(ReportFormat::Markdown);
        let newer = doc.find("Week of 2024-07-28").unwrap();
        let older = doc.find("Week of 2024-07-21").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn csv_body_is_parseable() {
        let doc = sample().render(ReportFormat::Csv);
        let data: Vec<&str> = doc.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data[0], "Period,Visits,Avg. Score,Best Site (Score),Worst Site (Score)");
        assert_eq!(data[2], "Week of 2024-07-21,2,60,a.com (90),b.com (30)");
    }

    #[test]
    fn file_name_encodes_timeframe_and_date() {
        assert_eq!(
            sample().file_name(ReportFormat::Markdown),
            "EcoBrowse_Report_weekly_2024-07-30.md"
        );
    }

    #[test]
    fn export_writes_file_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = sample().export(dir.path().join("out"), ReportFormat::Csv).unwrap();

        assert_eq!(path.file_name().unwrap(), "EcoBrowse_Report_weekly_2024-07-30.csv");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, sample().render(ReportFormat::Csv));

        let entries = std::fs::read_dir(dir.path().join("out")).unwrap().count();
        assert_eq!(entries, 1);
    }
}
