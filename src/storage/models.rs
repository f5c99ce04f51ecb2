//! Persisted record shape and schema validation.
//!
//! The on-disk format carries no version field, so every entry is validated at
//! the storage boundary. These types are separate from the domain
//! [`ScoreRecord`] to keep the persisted field names (`websiteUrl`,
//! `carbonScore`) out of the rest of the crate.

use crate::domain::ScoreRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of the persisted JSON array.
///
/// ```json
/// { "timestamp": 1721577600000, "websiteUrl": "https://example.com", "carbonScore": 0.73 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// Analyzed URL.
    pub website_url: String,

    /// Eco-efficiency score, `[0, 1]`.
    pub carbon_score: f64,
}

impl From<&ScoreRecord> for StoredEntry {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            website_url: record.website_url.clone(),
            carbon_score: record.score,
        }
    }
}

impl From<StoredEntry> for ScoreRecord {
    fn from(entry: StoredEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            website_url: entry.website_url,
            score: entry.carbon_score,
        }
    }
}

/// Why a persisted entry was dropped during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRejection {
    NotAnObject,
    MissingField(&'static str),
    WrongType(&'static str),
    EmptyUrl,
}

impl std::fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("entry is not an object"),
            Self::MissingField(name) => write!(f, "missing field `{name}`"),
            Self::WrongType(name) => write!(f, "field `{name}` has the wrong type"),
            Self::EmptyUrl => f.write_str("websiteUrl is empty"),
        }
    }
}

/// Validates one untyped JSON value against the persisted shape.
///
/// Timestamps written by other producers may be serialized as floats
/// (`1.7e12`); those are accepted and truncated to whole milliseconds. Scores
/// are only shape-checked here: an out-of-range number is still a conforming
/// entry and is left for the aggregator to skip.
///
/// # Errors
///
/// Returns the reason the value does not conform.
pub fn validate_entry(value: &Value) -> Result<StoredEntry, EntryRejection> {
    let object = value.as_object().ok_or(EntryRejection::NotAnObject)?;

    let timestamp = object
        .get("timestamp")
        .ok_or(EntryRejection::MissingField("timestamp"))?;
    let timestamp = timestamp
        .as_i64()
        .or_else(|| timestamp.as_f64().filter(|t| t.is_finite()).map(|t| t.trunc() as i64))
        .ok_or(EntryRejection::WrongType("timestamp"))?;

    let website_url = object
        .get("websiteUrl")
        .ok_or(EntryRejection::MissingField("websiteUrl"))?
        .as_str()
        .ok_or(EntryRejection::WrongType("websiteUrl"))?;
    if website_url.trim().is_empty() {
        return Err(EntryRejection::EmptyUrl);
    }

    let carbon_score = object
        .get("carbonScore")
        .ok_or(EntryRejection::MissingField("carbonScore"))?
        .as_f64()
        .ok_or(EntryRejection::WrongType("carbonScore"))?;

    Ok(StoredEntry {
        timestamp,
        website_url: website_url.to_string(),
        carbon_score,
    })
}
