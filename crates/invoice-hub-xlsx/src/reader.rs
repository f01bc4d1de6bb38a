//! Read a worksheet as a header row plus data rows

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use invoice_hub_core::{CellValue, Table};

use crate::dates::serial_to_datetime;
use crate::error::{XlsxError, XlsxResult};
use crate::package::{XlsxPackage, STYLES};
use crate::shared_strings::read_shared_strings;
use crate::sheet::{CellXml, SheetXml};
use crate::styles::StyleSheet;

/// XLSX table reader
pub struct XlsxTableReader;

impl XlsxTableReader {
    /// Read a sheet from a file path; `None` reads the first sheet
    pub fn read_file<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> XlsxResult<Table> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file), sheet)
    }

    /// Read a sheet from a reader; `None` reads the first sheet
    pub fn read<R: Read + Seek>(reader: R, sheet: Option<&str>) -> XlsxResult<Table> {
        Self::read_package(&XlsxPackage::read(reader)?, sheet)
    }

    /// Names of the sheets in a workbook file, in tab order
    pub fn sheet_names<P: AsRef<Path>>(path: P) -> XlsxResult<Vec<String>> {
        let info = XlsxPackage::read_file(path)?.workbook_info()?;
        Ok(info.sheets.into_iter().map(|s| s.name).collect())
    }

    /// Read a sheet of an already-loaded package.
    ///
    /// The first non-blank row is the header row. Numbers in date-formatted
    /// cells are returned as [`CellValue::Date`].
    pub fn read_package(package: &XlsxPackage, sheet: Option<&str>) -> XlsxResult<Table> {
        let info = package.workbook_info()?;
        let entry = match sheet {
            Some(name) => info
                .sheet_by_name(name)
                .ok_or_else(|| XlsxError::SheetNotFound(name.to_string()))?,
            None => info
                .sheets
                .first()
                .ok_or_else(|| XlsxError::InvalidFormat("Workbook has no worksheets".into()))?,
        };

        let sheet = SheetXml::parse(package.part_str(&entry.path)?)?;
        let shared_strings = read_shared_strings(package)?;
        let styles = match package.part(STYLES) {
            Some(_) => Some(StyleSheet::parse(package.part_str(STYLES)?)?),
            None => None,
        };

        let mut rows: BTreeMap<u32, Vec<(u16, CellValue)>> = BTreeMap::new();
        let mut width = 0usize;
        for (addr, cell) in sheet.cells() {
            let value = decode_cell(cell, &shared_strings, styles.as_ref(), info.date_1904)?;
            if value.is_empty() {
                continue;
            }
            width = width.max(addr.col as usize + 1);
            rows.entry(addr.row).or_default().push((addr.col, value));
        }

        let to_vec = |cells: &[(u16, CellValue)]| {
            let mut values = vec![CellValue::Empty; width];
            for (col, value) in cells {
                values[*col as usize] = value.clone();
            }
            values
        };

        let mut rows = rows
            .into_values()
            .map(|cells| to_vec(&cells))
            .skip_while(|values| values.iter().all(CellValue::is_blank));

        let mut table = match rows.next() {
            Some(header) => Table::new(header.iter().map(|v| v.to_string())),
            None => return Ok(Table::default()),
        };
        for values in rows {
            table.push_row(values);
        }

        log::debug!(
            "read {} rows from sheet '{}' ({} columns)",
            table.len(),
            entry.name,
            table.headers().len()
        );
        Ok(table)
    }
}

/// A cell's value, turning numbers in date-formatted cells into dates
pub(crate) fn decode_cell(
    cell: &CellXml,
    shared_strings: &[String],
    styles: Option<&StyleSheet>,
    date_1904: bool,
) -> XlsxResult<CellValue> {
    let value = cell.value(shared_strings)?;
    let is_date = styles
        .zip(cell.style())
        .map_or(false, |(styles, xf)| styles.is_date_xf(xf));

    Ok(match value {
        CellValue::Number(n) if is_date => serial_to_datetime(n, date_1904)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(n)),
        other => other,
    })
}
