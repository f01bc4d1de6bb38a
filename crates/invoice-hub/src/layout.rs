//! Where each invoice field lands in the template

use std::path::Path;

use invoice_hub_core::CellAddress;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Target cell of every filled field.
///
/// The default matches the standard invoice template. A JSON object can
/// override any subset of fields by their snake_case names:
///
/// ```
/// use invoice_hub::FieldLayout;
///
/// let layout = FieldLayout::from_json_str(r#"{"amount": "M21"}"#).unwrap();
/// assert_eq!(layout.amount.to_string(), "M21");
/// assert_eq!(layout.amount_in_words.to_string(), "A48");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldLayout {
    pub name: CellAddress,
    pub address: CellAddress,
    pub pan: CellAddress,
    pub invoice_no: CellAddress,
    pub invoice_date: CellAddress,
    pub state: CellAddress,
    pub code: CellAddress,
    pub amount: CellAddress,
    pub amount_in_words: CellAddress,
    pub bank_name: CellAddress,
    pub account_holder: CellAddress,
    pub account_no: CellAddress,
    pub ifsc: CellAddress,
    /// Receives a copy of the employee name
    pub signatory: CellAddress,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            name: CellAddress::new(0, 0),
            address: CellAddress::new(1, 0),
            pan: CellAddress::new(3, 0),
            invoice_no: CellAddress::new(8, 0),
            invoice_date: CellAddress::new(9, 0),
            state: CellAddress::new(11, 0),
            code: CellAddress::new(11, 7),
            amount: CellAddress::new(20, 13),
            amount_in_words: CellAddress::new(47, 0),
            bank_name: CellAddress::new(52, 1),
            account_holder: CellAddress::new(53, 1),
            account_no: CellAddress::new(54, 1),
            ifsc: CellAddress::new(55, 1),
            signatory: CellAddress::new(54, 9),
        }
    }
}

impl FieldLayout {
    /// Parse a layout override from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidLayout(e.to_string()))
    }

    /// Read a layout override from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidLayout(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Field name and address pairs
    pub fn fields(&self) -> [(&'static str, CellAddress); 14] {
        [
            ("name", self.name),
            ("address", self.address),
            ("pan", self.pan),
            ("invoice_no", self.invoice_no),
            ("invoice_date", self.invoice_date),
            ("state", self.state),
            ("code", self.code),
            ("amount", self.amount),
            ("amount_in_words", self.amount_in_words),
            ("bank_name", self.bank_name),
            ("account_holder", self.account_holder),
            ("account_no", self.account_no),
            ("ifsc", self.ifsc),
            ("signatory", self.signatory),
        ]
    }
}
