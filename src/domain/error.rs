//! Error types for the EcoBrowse analytics engine.
//!
//! This module defines the centralized error type [`EcoBrowseError`] and a type alias
//! [`Result`] used throughout the crate. All failure is concentrated at the I/O
//! boundary (the record store, report export) and at the external scoring and
//! advisory capabilities; the aggregator itself never fails.

use thiserror::Error;

/// The main error type for EcoBrowse operations.
///
/// # Examples
///
/// ```
/// use ecobrowse::EcoBrowseError;
///
/// fn export_nothing() -> Result<(), EcoBrowseError> {
///     Err(EcoBrowseError::NoData)
/// }
///
/// assert_eq!(export_nothing().unwrap_err().to_string(), "No data: cannot export an empty report");
/// ```
#[derive(Debug, Error)]
pub enum EcoBrowseError {
    /// Reading or writing the persisted record collection failed.
    ///
    /// Also used when the persisted payload is malformed. Callers of
    /// [`crate::storage::RecordStore::load`] receive this alongside an empty
    /// collection rather than as a hard failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external scoring capability could not analyze the target.
    #[error("Analysis failed: {0}")]
    Scoring(String),

    /// The advisory capability failed. Never prevents a record from being stored.
    #[error("Advisory error: {0}")]
    Advisory(String),

    /// A record violates the data model (empty URL, score outside `[0, 1]`).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// An export was requested for an empty summary sequence.
    #[error("No data: cannot export an empty report")]
    NoData,

    /// Configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for EcoBrowse operations.
pub type Result<T> = std::result::Result<T, EcoBrowseError>;
