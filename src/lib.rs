//! Sheetbridge - query and rewrite Excel workbooks with SQL
//!
//! Two independent facades over mature libraries:
//!
//! - [`SqlWorkbook`]: loads a workbook, mirrors its sheets into an embedded
//!   SQLite store (in-memory or file-backed), runs queries and mutations, can
//!   replace a sheet's contents with a query result, and saves back to disk
//!   with an optional backup of the original file.
//! - [`WorkbookEditor`]: direct 1-indexed cell/row/column access, basic cell
//!   styles, verbatim formulas, and bulk export of the grid.
//!
//! Free functions in [`convert`] move a single sheet to or from a SQLite
//! table through the [`Frame`] intermediate.
//!
//! # Example
//!
//! ```no_run
//! use sheetbridge::SqlWorkbook;
//!
//! let mut workbook = SqlWorkbook::open("sales.xlsx")?;
//! workbook.map_sheets_to_tables(None)?;
//!
//! let totals = workbook.run_query("SELECT region, SUM(amount) AS total FROM Sheet1 GROUP BY region")?;
//! workbook.rewrite_sheet_from_query("Totals", "SELECT region, SUM(amount) AS total FROM Sheet1 GROUP BY region")?;
//!
//! workbook.backup_original(None)?;
//! workbook.save(None)?;
//! # Ok::<(), sheetbridge::BridgeError>(())
//! ```

pub mod convert;
pub mod editor;
pub mod error;
pub mod excel;
pub mod report;
pub mod sql;
pub mod types;
pub mod workbook;

// Re-export commonly used types
pub use editor::WorkbookEditor;
pub use error::{BridgeError, BridgeResult};
pub use excel::{Align, CellStyle};
pub use types::{CellValue, ColumnInfo, ColumnType, Frame, TableInfo};
pub use workbook::{quick_query, update_with_query, SqlWorkbook};
