//! Cell-related types
//!
//! - [`CellAddress`] - a cell's location (e.g., "A1")
//! - [`CellRange`] - a rectangular range of cells (e.g., "A1:B10")
//! - [`CellValue`] - the scalar stored in a cell

mod address;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::CellValue;
