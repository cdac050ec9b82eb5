//! # csv-parser-orders - Order CSV to JSON conversion
//!
//! Converts flat, denormalized order CSV rows into nested JSON documents
//! consolidated by order number, for three record shapes: line-item state
//! changes, return-info entries, and delivery/parcel structures.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│  Row Decode │────▶│ Consolidate │────▶│  JSON array │
//! │ (auto-enc)  │     │  (typed)    │     │ (per order) │     │ (streamed)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use csv_parser_orders::{parse_file, ConsoleLogger, ParserConfig, RecordKind};
//!
//! fn main() {
//!     let logger = ConsoleLogger::default();
//!     let summary = parse_file(
//!         "deliveries.csv".as_ref(),
//!         std::io::stdout(),
//!         RecordKind::Deliveries,
//!         &ParserConfig::default(),
//!         &logger,
//!     )
//!     .unwrap();
//!     eprintln!("wrote {} documents", summary.documents);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (fragments and consolidated documents)
//! - [`logger`] - Explicit, passed-in logging capability
//! - [`parser`] - CSV input with encoding and delimiter auto-detection
//! - [`decoder`] - Row to typed-fragment decoding per record kind
//! - [`batch`] - Fixed-size batching of an iterator
//! - [`engine`] - The keyed consolidation engine
//! - [`serializer`] - Incremental JSON array output
//! - [`pipeline`] - End-to-end orchestration

// Core modules
pub mod error;
pub mod models;

// Logging
pub mod logger;

// CSV input
pub mod parser;

// Row decoding
pub mod decoder;

// Consolidation
pub mod batch;
pub mod engine;

// Output
pub mod serializer;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConflictError,
    CsvError,
    DecodeError,
    PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Delivery,
    DeliveryOrder,
    LineItemState,
    Parcel,
    ReturnOrder,
};

// =============================================================================
// Re-exports - Logging
// =============================================================================

pub use logger::{ConsoleLogger, LogLevel, Logger, NullLogger};

// =============================================================================
// Re-exports - Record kinds
// =============================================================================

pub use decoder::RecordKind;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{parse_file, parse_stream, ParseSummary, ParserConfig, DEFAULT_BATCH_SIZE};
