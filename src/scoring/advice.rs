//! Advisory capability: tips and greener alternatives for an analyzed site.

use crate::domain::error::{EcoBrowseError, Result};
use crate::domain::{is_valid_score, Rating};
use serde::{Deserialize, Serialize};

/// Suggestions returned for one analyzed website.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    /// One-sentence tips for reducing the footprint of a visit.
    pub suggestions: Vec<String>,

    /// Sites offering a similar service with a smaller footprint.
    pub alternative_websites: Vec<String>,
}

impl Advice {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.alternative_websites.is_empty()
    }
}

/// Produces advice for a scored website.
///
/// Advice is optional: a failing advisor never prevents the record from being
/// stored.
pub trait Advisor: Send {
    /// # Errors
    ///
    /// Returns [`EcoBrowseError::Advisory`] when no advice can be produced.
    fn suggest(&self, url: &str, score: f64) -> Result<Advice>;
}

const GOOD_TIPS: [&str; 3] = [
    "Keep browser tabs for this site closed when you are not using them.",
    "Prefer the site's text or lite view when you only need the content.",
    "Bookmark the pages you need to avoid repeated search round trips.",
];

const MODERATE_TIPS: [&str; 3] = [
    "Disable autoplay for video and animated content on this site.",
    "Use a content blocker to skip third-party trackers and ads.",
    "Download files you revisit instead of streaming them each time.",
];

const POOR_TIPS: [&str; 4] = [
    "Lower the default video resolution or switch to audio-only where possible.",
    "Block heavy third-party scripts, trackers and ads with a content blocker.",
    "Shorten your sessions on this site or batch your visits together.",
    "Consider one of the lighter alternatives below for the same task.",
];

/// Keyword table: a host containing the keyword maps to the listed alternatives.
const ALTERNATIVES: &[(&str, &[&str])] = &[
    ("google.", &["ecosia.org", "duckduckgo.com"]),
    ("bing.", &["ecosia.org", "duckduckgo.com"]),
    ("yahoo.", &["ecosia.org", "duckduckgo.com"]),
    ("youtube.", &["peertube.tv", "odysee.com"]),
    ("twitter.", &["mastodon.social", "bsky.app"]),
    ("x.com", &["mastodon.social", "bsky.app"]),
    ("facebook.", &["mastodon.social", "pixelfed.social"]),
    ("instagram.", &["pixelfed.social", "glass.photo"]),
    ("reddit.", &["lemmy.world", "old.reddit.com"]),
    ("amazon.", &["ebay.com", "backmarket.com"]),
];

/// Offline advisor deriving tips from the score's rating band and alternatives
/// from a small keyword table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAdvisor;

impl Advisor for StaticAdvisor {
    fn suggest(&self, url: &str, score: f64) -> Result<Advice> {
        if !is_valid_score(score) {
            return Err(EcoBrowseError::Advisory(format!(
                "cannot advise on score {score} for {url}"
            )));
        }

        let rating = Rating::from_score(score);
        let suggestions = match rating {
            Rating::Good => GOOD_TIPS.as_slice(),
            Rating::Moderate => MODERATE_TIPS.as_slice(),
            Rating::Poor => POOR_TIPS.as_slice(),
        }
        .iter()
        .map(ToString::to_string)
        .collect();

        let lower = url.to_ascii_lowercase();
        let alternative_websites = ALTERNATIVES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, sites)| {
                sites
                    .iter()
                    .filter(|site| !lower.contains(*site))
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(url, %rating, "static advice produced");
        Ok(Advice {
            suggestions,
            alternative_websites,
        })
    }
}
