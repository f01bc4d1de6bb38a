//! Source rows: one record of the source table per invoice

use invoice_hub_core::{CellValue, Table};

/// Column names read from the source table
pub mod columns {
    pub const EMPLOYEE_NAME: &str = "EMPLOYEE NAME";
    pub const ADDRESS: &str = "Address";
    pub const PAN: &str = "PAN";
    pub const INVOICE_NO: &str = "InvoiceNo";
    pub const INVOICE_DATE: &str = "InvoiceDate";
    pub const STATE: &str = "State";
    pub const CODE: &str = "Code";
    pub const IN_HAND: &str = "IN HAND";
    pub const BANK_NAME: &str = "Bankname";
    pub const ACCOUNT_HOLDER: &str = "Name";
    pub const ACCOUNT_NO: &str = "AccountNo";
    pub const IFSC: &str = "IFSC";
}

static EMPTY: CellValue = CellValue::Empty;

/// A read-only view of one data row, keyed by column name
#[derive(Debug, Clone, Copy)]
pub struct SourceRow<'a> {
    number: usize,
    headers: &'a [String],
    values: &'a [CellValue],
}

impl<'a> SourceRow<'a> {
    /// Create a row view; `number` is 1-based among the table's data rows
    pub fn new(number: usize, headers: &'a [String], values: &'a [CellValue]) -> Self {
        Self {
            number,
            headers,
            values,
        }
    }

    /// All data rows of a table, in source order
    pub fn iter_table(table: &'a Table) -> impl Iterator<Item = SourceRow<'a>> + 'a {
        table
            .rows()
            .iter()
            .enumerate()
            .map(move |(i, values)| SourceRow::new(i + 1, table.headers(), values))
    }

    /// 1-based position among the data rows
    pub fn number(&self) -> usize {
        self.number
    }

    /// Value of a column; missing columns read as empty
    pub fn get(&self, column: &str) -> &'a CellValue {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&EMPTY)
    }

    /// Column name and value pairs in source order
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}
