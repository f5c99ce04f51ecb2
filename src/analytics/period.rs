//! Calendar bucket keys.
//!
//! A [`PeriodKey`] pairs a timeframe with the calendar date its bucket starts on.
//! Because the start date travels with the key, ordering never depends on
//! re-parsing the human-readable label.

use crate::domain::Timeframe;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use std::fmt;

/// Deterministic identifier of one calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    /// First calendar day of the bucket.
    pub start: NaiveDate,

    /// Bucket granularity.
    pub timeframe: Timeframe,
}

impl PeriodKey {
    /// Key of the bucket containing `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use ecobrowse::analytics::PeriodKey;
    /// use ecobrowse::Timeframe;
    ///
    /// // 2024-07-24 is a Wednesday; its week starts on Sunday the 21st.
    /// let date = NaiveDate::from_ymd_opt(2024, 7, 24).unwrap();
    /// assert_eq!(PeriodKey::for_date(date, Timeframe::Weekly).label(), "Week of 2024-07-21");
    /// assert_eq!(PeriodKey::for_date(date, Timeframe::Monthly).label(), "July 2024");
    /// assert_eq!(PeriodKey::for_date(date, Timeframe::Annual).label(), "2024");
    /// ```
    #[must_use]
    pub fn for_date(date: NaiveDate, timeframe: Timeframe) -> Self {
        let start = match timeframe {
            Timeframe::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_sunday());
                date.checked_sub_days(chrono::Days::new(offset)).unwrap_or(date)
            }
            Timeframe::Monthly => date.with_day(1).unwrap_or(date),
            Timeframe::Annual => date.with_ordinal(1).unwrap_or(date),
        };
        Self { start, timeframe }
    }

    /// Key of the bucket containing `timestamp_ms`, read on the calendar of `tz`.
    ///
    /// Returns `None` for timestamps chrono cannot represent.
    #[must_use]
    pub fn for_timestamp<Tz: TimeZone>(timestamp_ms: i64, timeframe: Timeframe, tz: &Tz) -> Option<Self> {
        let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
        let local = utc.with_timezone(tz);
        Some(Self::for_date(local.date_naive(), timeframe))
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> String {
        match self.timeframe {
            Timeframe::Weekly => format!("Week of {}", self.start.format("%Y-%m-%d")),
            Timeframe::Monthly => self.start.format("%B %Y").to_string(),
            Timeframe::Annual => self.start.format("%Y").to_string(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
