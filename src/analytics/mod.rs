//! Period aggregation.
//!
//! Groups [`ScoreRecord`](crate::ScoreRecord)s into calendar buckets and
//! reduces each bucket to a [`PeriodSummary`].

mod aggregator;
mod period;

pub use aggregator::{aggregate, aggregate_in, PeriodSummary, SiteScore};
pub use period::PeriodKey;
