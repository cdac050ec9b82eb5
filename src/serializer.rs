//! Incremental JSON array output.
//!
//! Documents are written one at a time as they become final, so a large
//! import never needs the whole result set in memory at once. The output
//! is always a single JSON array, `[]` when no rows produced a document.

use std::io::Write;

use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Writes a JSON array element by element.
///
/// Call [`push`](Self::push) for each document and [`finish`](Self::finish)
/// exactly once at the end to emit the closing bracket.
pub struct JsonArrayWriter<W: Write> {
    writer: W,
    count: usize,
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    /// Serialize one document into the array.
    pub fn push<T: Serialize>(&mut self, document: &T) -> PipelineResult<()> {
        let separator = if self.count == 0 { "[" } else { "," };
        self.writer
            .write_all(separator.as_bytes())
            .map_err(PipelineError::Io)?;
        serde_json::to_writer(&mut self.writer, document).map_err(PipelineError::Json)?;
        self.count += 1;
        Ok(())
    }

    /// Number of documents written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Close the array and flush the underlying writer.
    pub fn finish(mut self) -> PipelineResult<()> {
        let closing = if self.count == 0 { "[]" } else { "]" };
        self.writer
            .write_all(closing.as_bytes())
            .map_err(PipelineError::Io)?;
        self.writer.flush().map_err(PipelineError::Io)
    }
}
