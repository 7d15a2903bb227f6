//! Excel I/O layer
//!
//! Reading goes through calamine, writing through rust_xlsxwriter. Everything
//! above this module works with `Frame`s or raw `CellValue` grids; the sheet
//! formats themselves are never parsed here.

pub mod reader;
pub mod style;
pub mod writer;

pub use style::{Align, CellStyle};
