//! End-to-end orchestration from CSV input to a JSON array of documents.
//!
//! [`parse_file`] reads the whole input up front so the encoding and the
//! delimiter can be sniffed from the raw bytes; [`parse_stream`] works on
//! any reader and assumes UTF-8 with a configured (or default) delimiter.
//! Both run the same pipeline: rows are decoded into typed fragments,
//! consolidated in batches, and the resulting documents are written
//! incrementally as one JSON array.
//!
//! Any error is fatal. The first bad row, merge conflict, or I/O failure
//! aborts the run, is reported through the [`Logger`], and is returned to
//! the caller. Partial output may already have been written by then.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::batch::BatchedExt;
use crate::decoder::{self, RecordKind};
use crate::engine::{Aggregator, Consolidate, DeliveriesKind, ReturnInfoKind};
use crate::error::{PipelineError, PipelineResult};
use crate::logger::{LogLevel, Logger};
use crate::parser::{decode_bytes, detect_delimiter, detect_encoding, RowIter, DEFAULT_DELIMITER};
use crate::serializer::JsonArrayWriter;

/// Default number of rows consolidated per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

// =============================================================================
// Configuration
// =============================================================================

/// Per-run parser settings.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Rows per consolidation batch.
    pub batch_size: usize,
    /// CSV delimiter. `None` means auto-detect for file input and the
    /// default comma for stream input.
    pub delimiter: Option<char>,
    /// When set, rows whose length differs from the header row are fatal.
    /// Otherwise short rows are padded and long rows truncated.
    pub strict_mode: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delimiter: None,
            strict_mode: true,
        }
    }
}

impl ParserConfig {
    fn validate(&self) -> PipelineResult<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    /// Data rows read from the input (excluding the header row).
    pub rows: u64,
    /// Documents written to the output array.
    pub documents: usize,
}

// =============================================================================
// Entry Points
// =============================================================================

/// Parse a CSV file into a JSON array written to `output`.
///
/// The file is read fully so the character encoding and, unless one is
/// configured, the delimiter can be detected from the content.
pub fn parse_file<W: Write>(
    input: &Path,
    output: W,
    kind: RecordKind,
    config: &ParserConfig,
    logger: &dyn Logger,
) -> PipelineResult<ParseSummary> {
    config.validate()?;

    let bytes = fs::read(input).map_err(PipelineError::Io)?;
    let encoding = detect_encoding(&bytes);
    logger.verbose(&format!("Detected encoding: {encoding}"));
    let content = decode_bytes(&bytes, &encoding);

    let delimiter = match config.delimiter {
        Some(delimiter) => delimiter,
        None => {
            let detected = detect_delimiter(&content);
            logger.verbose(&format!("Detected delimiter: '{detected}'"));
            detected
        }
    };

    report(
        run(Cursor::new(content), output, kind, delimiter, config, logger),
        logger,
    )
}

/// Parse CSV from any reader into a JSON array written to `output`.
///
/// The input is assumed to be UTF-8. Without a configured delimiter the
/// default comma is used; detection needs the content up front and is
/// only done by [`parse_file`].
pub fn parse_stream<R: Read, W: Write>(
    input: R,
    output: W,
    kind: RecordKind,
    config: &ParserConfig,
    logger: &dyn Logger,
) -> PipelineResult<ParseSummary> {
    config.validate()?;
    let delimiter = config.delimiter.unwrap_or(DEFAULT_DELIMITER);
    report(run(input, output, kind, delimiter, config, logger), logger)
}

fn report(
    result: PipelineResult<ParseSummary>,
    logger: &dyn Logger,
) -> PipelineResult<ParseSummary> {
    match result {
        Ok(summary) => {
            logger.info(&format!(
                "Done: {} rows consolidated into {} documents",
                summary.rows, summary.documents
            ));
            Ok(summary)
        }
        Err(error) => {
            logger.error(&error.to_string());
            Err(error)
        }
    }
}

// =============================================================================
// Pipeline Core
// =============================================================================

fn run<R: Read, W: Write>(
    input: R,
    output: W,
    kind: RecordKind,
    delimiter: char,
    config: &ParserConfig,
    logger: &dyn Logger,
) -> PipelineResult<ParseSummary> {
    match kind {
        RecordKind::LineItemState => run_stateless(input, output, delimiter, config, logger),
        RecordKind::ReturnInfo => {
            run_consolidated::<ReturnInfoKind, _, _>(input, output, delimiter, config, logger)
        }
        RecordKind::Deliveries => {
            run_consolidated::<DeliveriesKind, _, _>(input, output, delimiter, config, logger)
        }
    }
}

/// Line-item state never merges: every row becomes its own document and
/// is written as soon as it decodes.
fn run_stateless<R: Read, W: Write>(
    input: R,
    output: W,
    delimiter: char,
    config: &ParserConfig,
    logger: &dyn Logger,
) -> PipelineResult<ParseSummary> {
    let rows = RowIter::new(input, delimiter, config.strict_mode)?;
    let mut writer = JsonArrayWriter::new(output);
    let mut count = 0u64;

    for batch in rows.batched(config.batch_size) {
        for row in batch {
            let row = row?;
            count += 1;
            let state = decoder::line_item_state(&row)?;
            if logger.enabled(LogLevel::Verbose) {
                logger.verbose(&format!(
                    "Row {count}: order '{}' line item '{}'",
                    state.order_number, state.line_item_id
                ));
            }
            writer.push(&state)?;
        }
        if logger.enabled(LogLevel::Verbose) {
            logger.verbose(&format!("Wrote {count} state documents"));
        }
    }

    let documents = writer.count();
    writer.finish()?;
    Ok(ParseSummary {
        rows: count,
        documents,
    })
}

fn run_consolidated<C: Consolidate, R: Read, W: Write>(
    input: R,
    output: W,
    delimiter: char,
    config: &ParserConfig,
    logger: &dyn Logger,
) -> PipelineResult<ParseSummary> {
    let rows = RowIter::new(input, delimiter, config.strict_mode)?;
    let mut aggregator = Aggregator::<C>::new();
    let mut count = 0u64;

    for batch in rows.batched(config.batch_size) {
        for row in batch {
            let row = row?;
            count += 1;
            let fragment = C::decode(&row)?;
            if logger.enabled(LogLevel::Verbose) {
                logger.verbose(&format!(
                    "Row {count}: fragment for '{}'",
                    C::primary_key(&fragment)
                ));
            }
            aggregator.ingest(fragment)?;
        }
        if logger.enabled(LogLevel::Verbose) {
            logger.verbose(&format!(
                "Consolidated {count} rows into {} documents",
                aggregator.len()
            ));
        }
    }

    let mut writer = JsonArrayWriter::new(output);
    for document in aggregator.into_documents() {
        writer.push(&document)?;
    }
    let documents = writer.count();
    writer.finish()?;
    Ok(ParseSummary {
        rows: count,
        documents,
    })
}
