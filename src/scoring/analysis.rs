//! Scoring capability.
//!
//! The core only consumes [`Analysis::score`]; everything else on an analysis is
//! explanatory metadata shown to the user.

use crate::domain::error::{EcoBrowseError, Result};
use crate::domain::{is_valid_score, Rating};
use serde::{Deserialize, Serialize};

/// Result of scoring one website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Normalized URL that was analyzed.
    pub url: String,

    /// Eco-efficiency score in `[0.0, 1.0]`; higher is better.
    pub score: f64,

    /// Human-readable explanation of how the score was reached.
    pub calculation_notes: String,

    /// Estimated bytes transferred for one page view.
    pub data_transfer_bytes: u64,

    /// Server energy efficiency factor in `[0.0, 1.0]`.
    pub server_efficiency: f64,

    /// Share of renewable energy in `[0.0, 1.0]`.
    pub renewable_share: f64,
}

impl Analysis {
    #[must_use]
    pub fn rating(&self) -> Rating {
        Rating::from_score(self.score)
    }
}

/// Computes an eco-efficiency score for a website.
///
/// Implementations may be slow or fallible; the caller persists a record only
/// after `analyze` returns `Ok`.
pub trait Scorer: Send {
    /// Scores `url`, which the caller has already passed through [`normalize_url`].
    ///
    /// # Errors
    ///
    /// Returns [`EcoBrowseError::Scoring`] for targets that cannot be analyzed.
    fn analyze(&self, url: &str) -> Result<Analysis>;
}

/// Trims `input` and prepends `https://` when no HTTP scheme is present.
///
/// # Errors
///
/// Returns [`EcoBrowseError::Scoring`] if `input` is blank.
///
/// # Examples
///
/// ```
/// use ecobrowse::scoring::normalize_url;
///
/// assert_eq!(normalize_url(" example.com ")?, "https://example.com");
/// assert_eq!(normalize_url("http://example.com")?, "http://example.com");
/// assert!(normalize_url("   ").is_err());
/// # Ok::<(), ecobrowse::EcoBrowseError>(())
/// ```
pub fn normalize_url(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EcoBrowseError::Scoring("please enter a website URL".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{trimmed}"))
    }
}

/// Extracts the host portion of a normalized URL.
fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = host_port.split(':').next()?;
    Some(host)
}

fn is_valid_host(host: &str) -> bool {
    !host.is_empty()
        && !host.starts_with(['.', '-'])
        && !host.ends_with(['.', '-'])
        && !host.contains("..")
        && host.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

/// Deterministic placeholder scorer.
///
/// Estimates page weight from the URL's length and derives server efficiency
/// and renewable share from a hash of the host, then combines them into a
/// weighted impact that is inverted into an efficiency score. The same URL
/// always yields the same analysis. The model is illustrative, not scientific.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    const BASE_BYTES: f64 = 500.0 * 1024.0;
    const SPREAD_BYTES: f64 = 2.0 * 1024.0 * 1024.0;
    const COMPLEXITY_BYTES: f64 = 512.0 * 1024.0;
    const REFERENCE_BYTES: f64 = 2.0 * 1024.0 * 1024.0;

    const DATA_WEIGHT: f64 = 0.5;
    const EFFICIENCY_WEIGHT: f64 = 0.25;
    const RENEWABLE_WEIGHT: f64 = 0.25;
}

impl Scorer for HeuristicScorer {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn analyze(&self, url: &str) -> Result<Analysis> {
        let _span = tracing::debug_span!("heuristic_analyze", url = %url).entered();

        let host = host_of(url)
            .filter(|host| is_valid_host(host))
            .ok_or_else(|| EcoBrowseError::Scoring(format!("could not analyze '{url}': malformed host")))?;

        // Top 53 bits give a uniform fraction in [0, 1).
        let factor = (fnv1a(host.to_ascii_lowercase().as_bytes()) >> 11) as f64 / (1_u64 << 53) as f64;
        let complexity = url.chars().count() as f64 / 50.0;

        let data_transfer = (Self::BASE_BYTES + factor * Self::SPREAD_BYTES + complexity * Self::COMPLEXITY_BYTES)
            .floor();
        let server_efficiency = 0.6 + factor * 0.35;
        let renewable_share = 0.1 + factor * 0.8;

        let data_impact = (data_transfer / Self::REFERENCE_BYTES).min(1.0);
        let impact = data_impact * Self::DATA_WEIGHT
            + (1.0 - server_efficiency) * Self::EFFICIENCY_WEIGHT
            + (1.0 - renewable_share) * Self::RENEWABLE_WEIGHT;
        let score = (1.0 - impact).clamp(0.0, 1.0);

        if !is_valid_score(score) {
            return Err(EcoBrowseError::Scoring(format!("score for '{url}' is not a number")));
        }

        let calculation_notes = format!(
            "Eco-efficiency score based on estimated data transfer size ({:.2} MB), \
             inferred server efficiency ({:.1}%), and projected renewable energy usage ({:.1}%). \
             Final score: {:.3} (higher is better).",
            data_transfer / 1024.0 / 1024.0,
            server_efficiency * 100.0,
            renewable_share * 100.0,
            score
        );

        tracing::debug!(score, "analysis complete");
        Ok(Analysis {
            url: url.to_string(),
            score,
            calculation_notes,
            data_transfer_bytes: data_transfer as u64,
            server_efficiency,
            renewable_share,
        })
    }
}
