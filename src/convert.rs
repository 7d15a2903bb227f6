//! Stateless conversions between a single worksheet and a SQLite table,
//! with a `Frame` as the intermediate representation.

use crate::error::BridgeResult;
use crate::excel::{reader, writer};
use crate::sql::SqlStore;
use crate::types::Frame;
use std::path::Path;
use tracing::info;

const DEFAULT_SHEET: &str = "Sheet1";

/// Bulk-load one sheet of a workbook into a table at `db_path`, replacing the
/// table if it exists. `sheet_name` defaults to the first sheet. Returns the
/// number of data rows loaded.
pub fn sheet_to_table(
    excel_path: impl AsRef<Path>,
    table_name: &str,
    db_path: impl AsRef<Path>,
    sheet_name: Option<&str>,
) -> BridgeResult<usize> {
    let frame = reader::read_sheet(excel_path.as_ref(), sheet_name)?;
    let types = reader::infer_column_types(&frame);

    let store = SqlStore::open(db_path)?;
    store.replace_table(table_name, &frame, &types)?;
    info!(
        table = table_name,
        rows = frame.row_count(),
        "sheet loaded into table"
    );
    Ok(frame.row_count())
}

/// Run a query against the database at `db_path` and write the result set
/// into a sheet of `excel_path`. The target sheet is fully replaced; other
/// sheets of an existing workbook are preserved.
pub fn table_to_sheet(
    sql: &str,
    excel_path: impl AsRef<Path>,
    db_path: impl AsRef<Path>,
    sheet_name: Option<&str>,
) -> BridgeResult<()> {
    let excel_path = excel_path.as_ref();
    let sheet_name = sheet_name.unwrap_or(DEFAULT_SHEET);

    let store = SqlStore::open(db_path)?;
    let frame = store.query(sql)?;

    let mut sheets: Vec<(String, Frame)> = if excel_path.exists() {
        reader::read_workbook(excel_path)?
    } else {
        Vec::new()
    };
    match sheets.iter_mut().find(|(name, _)| name == sheet_name) {
        Some((_, existing)) => *existing = frame,
        None => sheets.push((sheet_name.to_string(), frame)),
    }

    writer::write_workbook(excel_path, &sheets)?;
    info!(path = %excel_path.display(), sheet = sheet_name, "query result written to sheet");
    Ok(())
}
