//! Reading the source table

use std::path::Path;

use invoice_hub_core::Table;
use invoice_hub_csv::{CsvReadOptions, CsvReader};
use invoice_hub_xlsx::XlsxTableReader;

use crate::error::{Error, Result};

/// Supported source table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Csv,
}

impl SourceFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Read a source table; `sheet` selects a worksheet in workbook sources
pub fn read_source(path: &Path, sheet: Option<&str>) -> Result<Table> {
    let table = match SourceFormat::from_path(path)? {
        SourceFormat::Xlsx => XlsxTableReader::read_file(path, sheet)?,
        SourceFormat::Csv => {
            if let Some(sheet) = sheet {
                log::warn!("ignoring sheet '{}' for CSV source", sheet);
            }
            CsvReader::read_file(path, &CsvReadOptions::default())?
        }
    };

    log::info!(
        "read {} rows from {} ({} columns)",
        table.len(),
        path.display(),
        table.headers().len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_hub_core::CellValue;
    use invoice_hub_xlsx::{SheetBuilder, XlsxWriter};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            SourceFormat::from_path(Path::new("a/Employees.XLSX")).unwrap(),
            SourceFormat::Xlsx
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("macro.xlsm")).unwrap(),
            SourceFormat::Xlsx
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("rows.csv")).unwrap(),
            SourceFormat::Csv
        );
        assert!(matches!(
            SourceFormat::from_path(Path::new("legacy.xls")),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(SourceFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_read_both_formats() {
        let dir = tempfile::tempdir().unwrap();

        let csv = dir.path().join("rows.csv");
        std::fs::write(&csv, "EMPLOYEE NAME,IN HAND\nAsha,1500\n").unwrap();
        let table = read_source(&csv, Some("ignored")).unwrap();
        assert_eq!(table.rows()[0][1], CellValue::Number(1500.0));

        let xlsx = dir.path().join("rows.xlsx");
        let mut sheet = SheetBuilder::new("Sheet1");
        sheet.cell("A1", "EMPLOYEE NAME").unwrap();
        sheet.cell("A2", "Asha").unwrap();
        XlsxWriter::write_file(&[sheet], &xlsx).unwrap();
        let table = read_source(&xlsx, None).unwrap();
        assert_eq!(table.headers(), &["EMPLOYEE NAME"]);
    }
}
