//! # invoice-hub
//!
//! Fill a fixed-layout spreadsheet invoice template once per row of a
//! source table.
//!
//! Each row of an `.xlsx` or `.csv` source yields one workbook named
//! `Invoice_<employee>_<invoice no>.xlsx`, a copy of the template with the
//! row's labels, amount and amount in words written in. Merged cells are
//! written through their top-left anchor and every part of the template
//! that is not filled is carried over unchanged.
//!
//! ## Example
//!
//! ```rust
//! use invoice_hub::{amount_in_words, sanitize, Amount};
//!
//! let amount = Amount::from_f64(1500.5).unwrap();
//! assert_eq!(
//!     amount_in_words(amount),
//!     "One Thousand Five Hundred Rupees And Fifty Paise Only"
//! );
//! assert_eq!(amount.to_string(), "1,500.50");
//! assert_eq!(sanitize("A/B:C*D"), "A-B-C-D");
//! ```

pub mod config;
pub mod error;
pub mod filename;
pub mod filler;
pub mod format;
pub mod layout;
pub mod row;
pub mod run;
pub mod sample;
pub mod source;
pub mod words;

pub use config::{RunConfig, RunInputs, RunOptions};
pub use error::{Error, Result};
pub use filename::{invoice_file_name, sanitize};
pub use filler::fill_invoice;
pub use format::{format_date, Amount, AmountField};
pub use layout::FieldLayout;
pub use row::SourceRow;
pub use run::{generate, InvoiceGenerator, RowOutcome, RowStatus, RowWarning, RunReport};
pub use sample::{sample_template, write_sample_template};
pub use source::{read_source, SourceFormat};
pub use words::{amount_in_words, words_for_text};

// Re-export the building blocks
pub use invoice_hub_core::{CellAddress, CellValue, MergeMap, Table};
pub use invoice_hub_xlsx::{Template, TemplateDocument};
