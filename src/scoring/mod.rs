//! Pluggable scoring and advisory capabilities.
//!
//! Both are traits so the bundled offline implementations ([`HeuristicScorer`],
//! [`StaticAdvisor`]) can be replaced by a real analysis service.

mod advice;
mod analysis;
mod benchmark;

pub use advice::{Advice, Advisor, StaticAdvisor};
pub use analysis::{normalize_url, Analysis, HeuristicScorer, Scorer};
pub use benchmark::{benchmark, BenchmarkOutcome, SiteBenchmark, POPULAR_SITES};
