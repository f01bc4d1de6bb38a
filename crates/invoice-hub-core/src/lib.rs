//! # invoice-hub-core
//!
//! Core data structures shared by the invoice-hub crates.
//!
//! This crate provides:
//! - [`CellAddress`] and [`CellRange`] - A1-style cell addressing
//! - [`MergeMap`] - resolution of merged regions to their writable anchor
//! - [`CellValue`] - scalar values read from source tables and written to templates
//! - [`Table`] - a header row plus data rows read from a source file
//! - [`CellFormat`] - style changes applied on top of a template cell's format
//!
//! ## Example
//!
//! ```rust
//! use invoice_hub_core::{CellAddress, CellRange, MergeMap};
//!
//! let merges = MergeMap::new(&[CellRange::parse("A48:N50").unwrap()]).unwrap();
//! let target = merges.resolve(CellAddress::parse("C49").unwrap());
//! assert_eq!(target.to_string(), "A48");
//! ```

pub mod cell;
pub mod error;
pub mod merge;
pub mod style;
pub mod table;

pub use cell::{CellAddress, CellRange, CellValue};
pub use error::{Error, Result};
pub use merge::MergeMap;
pub use style::{AlignmentPatch, CellFormat, FontPatch, HorizontalAlignment, NumberFormat, VerticalAlignment};
pub use table::Table;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
