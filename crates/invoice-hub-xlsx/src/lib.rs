//! # invoice-hub-xlsx
//!
//! XLSX (Office Open XML) support for invoice-hub:
//!
//! - [`Template`] / [`TemplateDocument`] - load a template once, instantiate a
//!   fresh document per row, write values through the merged-cell resolver
//!   and save. Parts that are not touched are copied byte-for-byte.
//! - [`XlsxTableReader`] - read a worksheet as a header row plus data rows.
//! - [`XlsxWriter`] / [`SheetBuilder`] - write a small single-sheet workbook
//!   (starter templates, test fixtures).

pub mod dates;
pub mod error;
pub mod package;
pub mod reader;
pub mod template;
pub mod writer;

mod shared_strings;
mod sheet;
mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use package::{SheetEntry, WorkbookInfo, XlsxPackage};
pub use reader::XlsxTableReader;
pub use styles::XfSummary;
pub use template::{Template, TemplateDocument};
pub use writer::{CellStyle, SheetBuilder, XlsxWriter};
