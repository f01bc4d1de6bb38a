//! Output file names

use invoice_hub_core::CellValue;

/// Characters that are not allowed in file names on common platforms
const RESERVED: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace each reserved character with `-`; everything else is kept
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if RESERVED.contains(&c) { '-' } else { c })
        .collect()
}

/// `Invoice_<employee>_<invoice no>.xlsx`; a blank employee name becomes `Unknown`
pub fn invoice_file_name(employee: &CellValue, invoice_no: &CellValue) -> String {
    let employee = if employee.is_blank() {
        "Unknown".to_string()
    } else {
        employee.to_string()
    };
    format!(
        "Invoice_{}_{}.xlsx",
        sanitize(&employee),
        sanitize(&invoice_no.to_string())
    )
}
