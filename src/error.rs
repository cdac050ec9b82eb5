//! Error types for the order CSV conversion pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV tokenization and input errors
//! - [`DecodeError`] - row-to-fragment decoding errors
//! - [`ConflictError`] - contradictory duplicate data during consolidation
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries. Every error is
//! terminal for the run: the pipeline never skips a bad row.

use thiserror::Error;

// =============================================================================
// CSV Input Errors
// =============================================================================

/// Errors while reading and tokenizing CSV input.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read the input source.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The configured delimiter cannot be used by the tokenizer.
    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    Delimiter(char),

    /// A data row has a different column count than the header row
    /// (strict mode only).
    #[error("Row length does not match headers (line {line})")]
    RowLength { line: u64 },

    /// Any other CSV tokenization failure.
    #[error("Invalid CSV format: {0}")]
    Parse(String),
}

impl CsvError {
    /// Convert a `csv` crate error into our taxonomy.
    pub(crate) fn from_csv(error: csv::Error) -> Self {
        let message = error.to_string();
        match error.into_kind() {
            csv::ErrorKind::Io(io) => CsvError::Io(io),
            csv::ErrorKind::UnequalLengths { pos, .. } => CsvError::RowLength {
                line: pos.map(|p| p.line()).unwrap_or(0),
            },
            _ => CsvError::Parse(message),
        }
    }
}

// =============================================================================
// Row Decoding Errors
// =============================================================================

/// Errors while decoding a raw row into a typed fragment.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Required columns absent for the selected record kind.
    ///
    /// The missing names are reported in canonical order, not row order.
    #[error("Required headers missing: '{}'", .0.join(","))]
    MissingHeaders(Vec<String>),

    /// A numeric column did not hold a base-10 number.
    #[error("Invalid number in column '{column}': '{value}'")]
    InvalidNumber { column: String, value: String },

    /// A parcel carried some but not all measurement columns.
    #[error("All measurement fields are mandatory for parcel '{parcel_id}'")]
    PartialMeasurements { parcel_id: String },
}

// =============================================================================
// Merge Conflict Errors
// =============================================================================

/// Two fragments claimed the same identity key with differing content.
///
/// The message names the entity kind, its keys, and both conflicting
/// payloads to aid diagnosis; the engine never silently keeps either side.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// Same (entry key, item group key) seen with different item content.
    #[error(
        "{entry_label} with id '{entry_key}' has an item with itemGroupId '{item_key}' \
         which has different values across multiple rows.\n\
         Original item: '{original}'\n\
         Conflicting item: '{incoming}'"
    )]
    Item {
        entry_label: &'static str,
        entry_key: String,
        item_key: String,
        original: String,
        incoming: String,
    },

    /// Same parcel id seen with different parcel content.
    #[error(
        "{entry_label} with id '{entry_key}' has a parcel with id '{parcel_key}' \
         which has different values across multiple rows.\n\
         Original parcel: '{original}'\n\
         Conflicting parcel: '{incoming}'"
    )]
    Parcel {
        entry_label: &'static str,
        entry_key: String,
        parcel_key: String,
        original: String,
        incoming: String,
    },
}

/// Render a conflicting payload for an error message.
pub(crate) fn conflict_payload<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("<unserializable>"))
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by the functions in
/// [`crate::pipeline`]. It wraps all lower-level errors and adds
/// pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV input error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Row decoding error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Merge conflict.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to write to the output sink.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid per-run configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV input operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for row decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, ConflictError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
