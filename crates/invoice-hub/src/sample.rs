//! Starter invoice template matching the default layout

use std::io::{Seek, Write};
use std::path::Path;

use invoice_hub_xlsx::{SheetBuilder, XlsxResult, XlsxWriter};

use crate::error::Result;

/// Static text of the starter template, by A1 reference
const LABELS: &[(&str, &str)] = &[
    ("A1", "Name : "),
    ("A2", "Address : "),
    ("A4", "PAN : "),
    ("A9", "Invoice No : "),
    ("A10", "Invoice Date : "),
    ("A12", "State : "),
    ("G12", "Code"),
    ("A21", "Professional fees"),
    ("A47", "Amount in words"),
    ("A53", "Bank Name"),
    ("A54", "Account Holder"),
    ("A55", "Account No"),
    ("A56", "IFSC"),
    ("J56", "Authorised Signatory"),
];

const HEADINGS: &[(&str, &str)] = &[
    ("F7", "INVOICE"),
    ("A20", "Description"),
    ("N20", "Amount"),
    ("A52", "Bank Details"),
];

const MERGES: &[&str] = &["A2:F3", "F7:H7", "A21:M21", "A48:N50", "J55:M55", "J56:M56"];

/// The starter invoice sheet
pub fn sample_sheet() -> XlsxResult<SheetBuilder> {
    let mut sheet = SheetBuilder::new("Invoice");
    for (reference, text) in LABELS {
        sheet.cell(reference, *text)?;
    }
    for (reference, text) in HEADINGS {
        sheet.bold(reference, *text)?;
    }
    for range in MERGES {
        sheet.merge(range)?;
    }
    sheet.column_width(0, 18.0).column_width(13, 14.0);
    Ok(sheet)
}

/// Write the starter template to a writer
pub fn sample_template<W: Write + Seek>(writer: W) -> Result<()> {
    XlsxWriter::write(&[sample_sheet()?], writer)?;
    Ok(())
}

/// Write the starter template to a file
pub fn write_sample_template<P: AsRef<Path>>(path: P) -> Result<()> {
    XlsxWriter::write_file(&[sample_sheet()?], path.as_ref())?;
    log::info!("wrote sample template to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FieldLayout;
    use invoice_hub_core::CellValue;
    use invoice_hub_xlsx::Template;

    #[test]
    fn test_sample_matches_default_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        write_sample_template(&path).unwrap();

        let template = Template::open(&path).unwrap();
        assert_eq!(template.sheet_name(), "Invoice");
        assert_eq!(template.merges().len(), MERGES.len());

        // Default fields sit on merge anchors, never inside a region
        let doc = template.instantiate();
        for (_, addr) in FieldLayout::default().fields() {
            assert_eq!(doc.resolve(addr), addr);
        }
        assert_eq!(
            doc.value(invoice_hub_core::CellAddress::parse("N20").unwrap())
                .unwrap(),
            CellValue::text("Amount")
        );
    }
}
