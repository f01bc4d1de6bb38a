//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use invoice_hub_core::{CellValue, Table};

use crate::error::CsvResult;
use crate::options::CsvReadOptions;

/// Digit strings longer than this lose precision as `f64` and stay text
const MAX_NUMERIC_DIGITS: usize = 15;

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a table; the first record is the header row
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Table> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a table; the first record is the header row
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Table> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut table = Table::new(csv_reader.headers()?.iter());
        let mut skipped = 0usize;

        for result in csv_reader.records() {
            let record = result?;
            let values = record
                .iter()
                .map(|field| {
                    if options.auto_detect_types {
                        Self::detect_type(field)
                    } else if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(field)
                    }
                })
                .collect();

            if !table.push_row(values) {
                skipped += 1;
            }
        }

        log::debug!(
            "read {} rows ({} blank skipped), {} columns",
            table.len(),
            skipped,
            table.headers().len()
        );
        Ok(table)
    }

    /// Detect the type of a field value.
    ///
    /// Identifiers that only look numeric (`00123`, 16-digit account numbers)
    /// are kept as text so no digits are lost.
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if Self::looks_numeric(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }

        CellValue::text(field)
    }

    fn looks_numeric(s: &str) -> bool {
        let bytes = s.as_bytes();
        if !bytes
            .iter()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        {
            return false;
        }
        if !bytes.iter().any(u8::is_ascii_digit) {
            return false;
        }

        let unsigned = s.trim_start_matches(['+', '-']);
        let all_digits = unsigned.bytes().all(|b| b.is_ascii_digit());
        if all_digits && unsigned.len() > 1 && unsigned.starts_with('0') {
            return false;
        }
        if all_digits && unsigned.len() > MAX_NUMERIC_DIGITS {
            return false;
        }
        true
    }
}
