//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use invoice_hub_core::Table;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a table to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        table: &Table,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(table, file, options)
    }

    /// Write a table to a writer
    pub fn write<W: Write>(table: &Table, writer: W, options: &CsvWriteOptions) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(false)
            .from_writer(writer);

        if options.write_header {
            csv_writer.write_record(table.headers())?;
        }

        for row in table.rows() {
            csv_writer.write_record(row.iter().map(|value| value.to_string()))?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_hub_core::CellValue;
    use pretty_assertions::assert_eq;

    fn manifest() -> Table {
        let mut table = Table::new(["row", "employee", "status", "detail"]);
        table.push_row(vec![
            CellValue::Number(1.0),
            CellValue::text("Asha Rao"),
            CellValue::text("ok"),
            CellValue::Empty,
        ]);
        table.push_row(vec![
            CellValue::Number(2.0),
            CellValue::text("Rao, Vikram"),
            CellValue::text("failed"),
            CellValue::text("said \"no\""),
        ]);
        table
    }

    #[test]
    fn test_write_with_header_and_quoting() {
        let mut buf = Vec::new();
        let options = CsvWriteOptions {
            line_terminator: LineTerminator::LF,
            ..Default::default()
        };
        CsvWriter::write(&manifest(), &mut buf, &options).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "row,employee,status,detail\n\
             1,Asha Rao,ok,\n\
             2,\"Rao, Vikram\",failed,\"said \"\"no\"\"\"\n"
        );
    }

    #[test]
    fn test_write_without_header_crlf() {
        let mut buf = Vec::new();
        let options = CsvWriteOptions {
            write_header: false,
            ..Default::default()
        };
        CsvWriter::write(&manifest(), &mut buf, &options).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("1,Asha Rao,ok,\r\n"));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.csv");
        CsvWriter::write_file(&manifest(), &path, &CsvWriteOptions::default()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Asha Rao"));
    }
}
