//! Data-quality reporting over mapped tables.

use crate::error::BridgeResult;
use crate::sql::store::quote_ident;
use crate::types::{ColumnType, TableInfo};
use crate::workbook::SqlWorkbook;
use serde::{Deserialize, Serialize};

/// Per-column completeness and cardinality figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub name: String,
    pub column_type: ColumnType,
    pub non_null_count: usize,
    pub null_count: usize,
    pub distinct_count: usize,
    /// Share of rows with a non-null, non-empty value, in percent.
    pub completeness_pct: f64,
}

/// Quality report for one table: its shape plus per-column statistics.
/// Serializable so callers can dump it as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub table: TableInfo,
    pub columns: Vec<ColumnQuality>,
}

/// Build a data-quality report for a mapped table. Empty strings count as
/// missing, matching the spreadsheet notion of a blank cell.
pub fn data_quality(workbook: &SqlWorkbook, table: &str) -> BridgeResult<DataQualityReport> {
    let info = workbook.describe_table(table)?;
    let store = workbook.store();

    let mut columns = Vec::with_capacity(info.columns.len());
    for col in &info.columns {
        let c = quote_ident(&col.name);
        let t = quote_ident(table);

        let counts = store.query(&format!(
            "SELECT COUNT(CASE WHEN {c} IS NOT NULL AND {c} != '' THEN 1 END) AS non_null, \
             COUNT(DISTINCT {c}) AS distinct_values FROM {t}"
        ))?;
        let non_null = match counts.cell(0, "non_null") {
            Some(crate::types::CellValue::Int(n)) => *n as usize,
            _ => 0,
        };
        let distinct = match counts.cell(0, "distinct_values") {
            Some(crate::types::CellValue::Int(n)) => *n as usize,
            _ => 0,
        };

        let completeness = if info.row_count > 0 {
            (non_null as f64 / info.row_count as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        columns.push(ColumnQuality {
            name: col.name.clone(),
            column_type: col.column_type,
            non_null_count: non_null,
            null_count: info.row_count - non_null,
            distinct_count: distinct,
            completeness_pct: completeness,
        });
    }

    Ok(DataQualityReport {
        table: info,
        columns,
    })
}
