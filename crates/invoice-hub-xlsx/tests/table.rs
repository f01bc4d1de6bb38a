//! Tests for reading worksheets as tables

use std::io::Cursor;

use chrono::NaiveDate;
use invoice_hub_core::{CellAddress, CellValue};
use invoice_hub_xlsx::{CellStyle, SheetBuilder, XlsxError, XlsxTableReader, XlsxWriter};
use pretty_assertions::assert_eq;

fn write(sheets: &[SheetBuilder]) -> Vec<u8> {
    let mut buf = Vec::new();
    XlsxWriter::write(sheets, Cursor::new(&mut buf)).unwrap();
    buf
}

fn employees() -> SheetBuilder {
    let mut sheet = SheetBuilder::new("Employees");
    sheet.bold("A1", "EMPLOYEE NAME ").unwrap();
    sheet.bold("B1", " IN HAND").unwrap();
    sheet.bold("C1", "Date").unwrap();
    sheet.bold("E1", "Active").unwrap();

    sheet.cell("A2", "Asha Rao").unwrap();
    sheet.cell("B2", 1500.5).unwrap();
    sheet
        .cell("C2", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        .unwrap();
    sheet.cell("E2", true).unwrap();

    // Row 3 is blank and must be skipped
    sheet.cell("A3", "   ").unwrap();

    sheet.cell("A4", "Vikram").unwrap();
    sheet.cell("B4", 101.0).unwrap();
    sheet
}

#[test]
fn test_read_first_sheet() {
    let bytes = write(&[employees()]);
    let table = XlsxTableReader::read(Cursor::new(&bytes), None).unwrap();

    assert_eq!(
        table.headers(),
        &["EMPLOYEE NAME", "IN HAND", "Date", "Unnamed: 3", "Active"]
    );
    assert_eq!(table.len(), 2);

    let date = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(
        table.rows()[0],
        vec![
            CellValue::text("Asha Rao"),
            CellValue::Number(1500.5),
            CellValue::Date(date),
            CellValue::Empty,
            CellValue::Boolean(true),
        ]
    );
    assert_eq!(table.rows()[1][0], CellValue::text("Vikram"));
    assert_eq!(table.rows()[1][2], CellValue::Empty);
}

#[test]
fn test_read_named_sheet() {
    let mut notes = SheetBuilder::new("Notes");
    notes.cell("A1", "ignored").unwrap();

    let mut second = SheetBuilder::new("March");
    // Leading blank rows before the header are skipped
    second.cell("A3", "PAN").unwrap();
    second.cell("A4", "ABCDE1234F").unwrap();

    let bytes = write(&[notes, second]);
    let table = XlsxTableReader::read(Cursor::new(&bytes), Some("March")).unwrap();
    assert_eq!(table.headers(), &["PAN"]);
    assert_eq!(table.rows()[0], vec![CellValue::text("ABCDE1234F")]);

    let missing = XlsxTableReader::read(Cursor::new(&bytes), Some("April"));
    assert!(matches!(missing, Err(XlsxError::SheetNotFound(name)) if name == "April"));
}

#[test]
fn test_numbers_in_date_cells_become_dates() {
    let mut sheet = SheetBuilder::new("Data");
    sheet.cell("A1", "Date").unwrap();
    sheet.set_styled(CellAddress::parse("A2").unwrap(), 45366.0, CellStyle::Date);
    sheet.cell("B1", "Serial").unwrap();
    sheet.cell("B2", 45366.0).unwrap();

    let table = XlsxTableReader::read(Cursor::new(write(&[sheet])), None).unwrap();
    assert_eq!(
        table.rows()[0][0],
        CellValue::Date(
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
    assert_eq!(table.rows()[0][1], CellValue::Number(45366.0));
}

#[test]
fn test_empty_sheet_gives_empty_table() {
    let table = XlsxTableReader::read(Cursor::new(write(&[SheetBuilder::new("Blank")])), None)
        .unwrap();
    assert!(table.headers().is_empty());
    assert!(table.is_empty());
}

#[test]
fn test_read_file_and_sheet_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.xlsx");
    XlsxWriter::write_file(&[employees(), SheetBuilder::new("Other")], &path).unwrap();

    let table = XlsxTableReader::read_file(&path, None).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        XlsxTableReader::sheet_names(&path).unwrap(),
        vec!["Employees".to_string(), "Other".to_string()]
    );
}
