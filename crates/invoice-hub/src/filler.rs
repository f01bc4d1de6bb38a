//! Filling one template document from one source row

use invoice_hub_core::{
    CellAddress, CellFormat, CellValue, HorizontalAlignment, NumberFormat, VerticalAlignment,
};
use invoice_hub_xlsx::TemplateDocument;

use crate::error::Result;
use crate::format::{format_date, invoice_no_label, label, AmountField};
use crate::layout::FieldLayout;
use crate::row::{columns, SourceRow};
use crate::words::amount_in_words;

/// Point size of the amount-in-words line
const WORDS_FONT_SIZE: f64 = 20.0;

/// Format of the amount-in-words cell, on top of the template's own
pub fn words_format() -> CellFormat {
    CellFormat::new()
        .with_bold(true)
        .with_font_size(WORDS_FONT_SIZE)
        .with_horizontal(HorizontalAlignment::Center)
        .with_vertical(VerticalAlignment::Center)
}

/// Write every field of `row` into `doc` at the addresses of `layout`.
///
/// Returns the classification of the row's amount; the amount cells are
/// only written when it is [`AmountField::Present`].
pub fn fill_invoice(
    doc: &mut TemplateDocument,
    row: &SourceRow<'_>,
    layout: &FieldLayout,
) -> Result<AmountField> {
    let employee = row.get(columns::EMPLOYEE_NAME);

    doc.write(layout.name, label("Name : ", employee));
    doc.write(layout.address, label("Address : ", row.get(columns::ADDRESS)));
    doc.write(layout.pan, label("PAN : ", row.get(columns::PAN)));
    doc.write(layout.invoice_no, invoice_no_label(row.get(columns::INVOICE_NO)));
    doc.write(
        layout.invoice_date,
        format!("Invoice Date : {}", format_date(row.get(columns::INVOICE_DATE))),
    );
    doc.write(layout.state, label("State : ", row.get(columns::STATE)));
    write_raw(doc, layout.code, row.get(columns::CODE))?;

    let amount = AmountField::classify(row.get(columns::IN_HAND));
    match &amount {
        AmountField::Present(value) => {
            doc.write(layout.amount, value.value());
            doc.apply_format(
                layout.amount,
                &CellFormat::new().with_number_format(NumberFormat::THOUSANDS_2DP),
            )?;
            doc.write(layout.amount_in_words, amount_in_words(*value));
            doc.apply_format(layout.amount_in_words, &words_format())?;
        }
        AmountField::Unparseable(raw) => {
            log::warn!(
                "row {}: amount {:?} is not a number; amount cells left blank",
                row.number(),
                raw
            );
        }
        AmountField::Absent => {}
    }

    write_raw(doc, layout.bank_name, row.get(columns::BANK_NAME))?;
    write_raw(doc, layout.account_holder, row.get(columns::ACCOUNT_HOLDER))?;
    write_raw(doc, layout.account_no, row.get(columns::ACCOUNT_NO))?;
    write_raw(doc, layout.ifsc, row.get(columns::IFSC))?;
    write_raw(doc, layout.signatory, employee)?;

    Ok(amount)
}

/// Write a value as-is; dates also get a date number format
fn write_raw(doc: &mut TemplateDocument, addr: CellAddress, value: &CellValue) -> Result<()> {
    let target = doc.write(addr, value.clone());
    if matches!(value, CellValue::Date(_)) {
        doc.apply_format(
            target,
            &CellFormat::new().with_number_format(NumberFormat::DATE_SHORT),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_template;
    use invoice_hub_core::Table;
    use invoice_hub_xlsx::Template;
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        let mut bytes = Vec::new();
        sample_template(std::io::Cursor::new(&mut bytes)).unwrap();
        Template::from_bytes(&bytes).unwrap()
    }

    fn at(a1: &str) -> CellAddress {
        CellAddress::parse(a1).unwrap()
    }

    fn source(amount: CellValue) -> Table {
        let mut table = Table::new([
            columns::EMPLOYEE_NAME,
            columns::ADDRESS,
            columns::INVOICE_NO,
            columns::INVOICE_DATE,
            columns::CODE,
            columns::IN_HAND,
            columns::ACCOUNT_NO,
        ]);
        table.push_row(vec![
            CellValue::text("Asha Rao"),
            CellValue::text("12 MG Road, Pune"),
            CellValue::text(" INV-7 "),
            CellValue::text("2024-03-05"),
            CellValue::Number(27.0),
            amount,
            CellValue::text("001234567890"),
        ]);
        table
    }

    fn fill(table: &Table) -> (TemplateDocument, AmountField) {
        let mut doc = template().instantiate();
        let row = SourceRow::iter_table(table).next().unwrap();
        let amount = fill_invoice(&mut doc, &row, &FieldLayout::default()).unwrap();
        (doc, amount)
    }

    #[test]
    fn test_fill_labels_and_raw_values() {
        let (doc, _) = fill(&source(CellValue::Number(1500.5)));
        assert_eq!(doc.value(at("A1")).unwrap(), CellValue::text("Name : Asha Rao"));
        assert_eq!(
            doc.value(at("A2")).unwrap(),
            CellValue::text("Address : 12 MG Road, Pune")
        );
        // PAN column is missing from the source
        assert_eq!(doc.value(at("A4")).unwrap(), CellValue::text("PAN : "));
        assert_eq!(doc.value(at("A9")).unwrap(), CellValue::text("Invoice No : INV-7"));
        assert_eq!(
            doc.value(at("A10")).unwrap(),
            CellValue::text("Invoice Date : 05 Mar-24")
        );
        assert_eq!(doc.value(at("H12")).unwrap(), CellValue::Number(27.0));
        assert_eq!(doc.value(at("B55")).unwrap(), CellValue::text("001234567890"));
        assert_eq!(doc.value(at("J55")).unwrap(), CellValue::text("Asha Rao"));
    }

    #[test]
    fn test_fill_amount() {
        let (doc, amount) = fill(&source(CellValue::Number(1500.5)));
        assert!(matches!(amount, AmountField::Present(_)));
        assert_eq!(doc.value(at("N21")).unwrap(), CellValue::Number(1500.5));
        assert_eq!(
            doc.format_summary(at("N21")).unwrap().number_format_id,
            NumberFormat::THOUSANDS_2DP.id()
        );
        assert_eq!(
            doc.value(at("A48")).unwrap(),
            CellValue::text("One Thousand Five Hundred Rupees And Fifty Paise Only")
        );
        let words = doc.format_summary(at("A48")).unwrap();
        assert!(words.bold);
        assert_eq!(words.font_size, Some(WORDS_FONT_SIZE));
        assert_eq!(words.horizontal, Some(HorizontalAlignment::Center));
        assert_eq!(words.vertical, Some(VerticalAlignment::Center));
    }

    #[test]
    fn test_unparseable_amount_leaves_cells() {
        let (doc, amount) = fill(&source(CellValue::text("N/A")));
        assert_eq!(amount, AmountField::Unparseable("N/A".into()));
        assert_eq!(doc.value(at("N21")).unwrap(), CellValue::Empty);
        assert_eq!(doc.value(at("A48")).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_raw_dates_get_date_format() {
        let mut table = Table::new([columns::IFSC]);
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        table.push_row(vec![CellValue::from(date)]);
        let (doc, amount) = fill(&table);
        assert_eq!(amount, AmountField::Absent);
        assert_eq!(doc.value(at("B56")).unwrap(), CellValue::from(date));
    }
}
