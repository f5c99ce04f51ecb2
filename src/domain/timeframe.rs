//! Timeframe selector controlling bucket width.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity used to group records into calendar buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Sunday-aligned calendar weeks.
    #[default]
    Weekly,
    /// Calendar months.
    Monthly,
    /// Calendar years.
    Annual,
}

impl Timeframe {
    /// All timeframes, finest first.
    pub const ALL: [Self; 3] = [Self::Weekly, Self::Monthly, Self::Annual];

    /// Lowercase identifier, as used in file names and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Capitalized label for report headers.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Annual => "Annual",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            "annual" | "yearly" | "year" | "y" => Ok(Self::Annual),
            other => Err(format!(
                "unknown timeframe '{other}' (expected weekly, monthly or annual)"
            )),
        }
    }
}
