//! CSV input boundary: encoding and delimiter detection plus a streaming
//! row iterator.
//!
//! No record-kind logic lives here. Rows come out as ordered mappings of
//! column name to string value; type coercion happens later in
//! [`crate::decoder`].

use serde_json::{Map, Value};
use std::io::Read;

use crate::error::{CsvError, CsvResult};

/// A raw CSV row: ordered mapping from column name to string value.
pub type RawRow = Map<String, Value>;

/// Delimiter used when none is configured or detected.
pub const DEFAULT_DELIMITER: char = ',';

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding.
pub fn decode_bytes(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        // Fallback: UTF-8 with lossy conversion
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = DEFAULT_DELIMITER;
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Streaming iterator over the data rows of a CSV source.
///
/// In strict mode a row whose column count differs from the header row is
/// a fatal [`CsvError::RowLength`]. Outside strict mode short rows are
/// padded with empty strings and extra values are dropped.
pub struct RowIter<R: Read> {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> RowIter<R> {
    pub fn new(reader: R, delimiter: char, strict_mode: bool) -> CsvResult<Self> {
        if !delimiter.is_ascii() {
            return Err(CsvError::Delimiter(delimiter));
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(!strict_mode)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(CsvError::from_csv)?
            .iter()
            .map(str::to_string)
            .collect();

        Ok(Self {
            headers,
            records: csv_reader.into_records(),
        })
    }

    /// Column names from the header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row_from_record(&self, record: &csv::StringRecord) -> RawRow {
        let mut row = RawRow::new();
        for (i, header) in self.headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            row.insert(header.clone(), Value::String(value.to_string()));
        }
        row
    }
}

impl<R: Read> Iterator for RowIter<R> {
    type Item = CsvResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.next()? {
            Ok(record) => Some(Ok(self.row_from_record(&record))),
            Err(error) => Some(Err(CsvError::from_csv(error))),
        }
    }
}
