//! Excel reading - workbook/worksheet → `Frame` and raw grids

use crate::error::{BridgeError, BridgeResult};
use crate::types::{CellValue, ColumnType, Frame};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::path::Path;

/// How many data rows are sampled when inferring a column's type.
const TYPE_SAMPLE_ROWS: usize = 100;

/// Open a workbook, mapping missing paths and unparseable content to the
/// crate's error kinds.
fn open(path: &Path) -> BridgeResult<Xlsx<std::io::BufReader<std::fs::File>>> {
    if !path.exists() {
        return Err(BridgeError::FileNotFound(path.to_path_buf()));
    }
    open_workbook(path).map_err(|e| BridgeError::Format(format!("failed to open workbook: {}", e)))
}

/// Read every sheet of a workbook into an ordered list of `(name, Frame)`.
/// The first row of each sheet supplies the column names.
pub fn read_workbook(path: &Path) -> BridgeResult<Vec<(String, Frame)>> {
    let mut workbook = open(path)?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| BridgeError::Format(format!("failed to read sheet '{}': {}", sheet_name, e)))?;
        sheets.push((sheet_name, frame_from_range(&range)));
    }
    Ok(sheets)
}

/// Read a single sheet (by name, or the first sheet) into a `Frame`.
pub fn read_sheet(path: &Path, sheet_name: Option<&str>) -> BridgeResult<Frame> {
    let mut workbook = open(path)?;

    let name = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| BridgeError::Format("workbook has no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| BridgeError::Format(format!("failed to read sheet '{}': {}", name, e)))?;
    Ok(frame_from_range(&range))
}

/// Raw contents of the first sheet: its name, the full value grid (no header
/// semantics, positioned absolutely from A1) and any formula cells.
#[allow(clippy::type_complexity)]
pub fn read_grid(
    path: &Path,
) -> BridgeResult<(String, Vec<Vec<CellValue>>, HashMap<(usize, usize), String>)> {
    let mut workbook = open(path)?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| BridgeError::Format("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| BridgeError::Format(format!("failed to read sheet '{}': {}", name, e)))?;

    let (start_row, start_col) = range.start().map(|(r, c)| (r as usize, c as usize)).unwrap_or((0, 0));
    let (height, width) = range.get_size();

    let mut grid = vec![vec![CellValue::Null; start_col + width]; start_row + height];
    for row in 0..height {
        for col in 0..width {
            if let Some(cell) = range.get((row, col)) {
                grid[start_row + row][start_col + col] = convert_cell(cell);
            }
        }
    }

    // Formula text is kept verbatim (calamine strips the leading '=').
    let mut formulas = HashMap::new();
    if let Ok(formula_range) = workbook.worksheet_formula(&name) {
        let (frow, fcol) = formula_range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let (fheight, fwidth) = formula_range.get_size();
        for row in 0..fheight {
            for col in 0..fwidth {
                if let Some(text) = formula_range.get((row, col)) {
                    if !text.is_empty() {
                        let formula = if text.starts_with('=') {
                            text.clone()
                        } else {
                            format!("={}", text)
                        };
                        formulas.insert((frow + row, fcol + col), formula);
                    }
                }
            }
        }
    }

    Ok((name, grid, formulas))
}

/// Build a `Frame` from a worksheet range. Row 0 is the header; blank header
/// cells get positional `col_N` names. An empty range yields an empty frame.
pub fn frame_from_range(range: &Range<Data>) -> Frame {
    let (height, width) = range.get_size();
    if height == 0 {
        return Frame::default();
    }

    let mut columns = Vec::with_capacity(width);
    for col in 0..width {
        let name = match range.get((0, col)) {
            Some(Data::String(s)) if !s.is_empty() => s.clone(),
            Some(Data::Int(i)) => i.to_string(),
            Some(Data::Float(f)) => f.to_string(),
            _ => format!("col_{}", col),
        };
        columns.push(name);
    }

    let mut frame = Frame::new(columns);
    for row in 1..height {
        let mut cells = Vec::with_capacity(width);
        for col in 0..width {
            let value = range
                .get((row, col))
                .map(convert_cell)
                .unwrap_or(CellValue::Null);
            cells.push(value);
        }
        frame.push_row(cells);
    }
    frame
}

/// Convert a calamine cell to a `CellValue`.
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
    }
}

/// Infer a SQL type per column from a bounded prefix of the frame's rows.
///
/// Ordered fallback: integer → real → date → text. Numeric strings count as
/// numbers; mixed or ambiguous columns fall back to TEXT. A column with no
/// non-null sample values is TEXT.
pub fn infer_column_types(frame: &Frame) -> Vec<ColumnType> {
    (0..frame.column_count())
        .map(|col| {
            let mut inferred: Option<ColumnType> = None;
            for row in frame.rows.iter().take(TYPE_SAMPLE_ROWS) {
                let cell = match row.get(col) {
                    Some(CellValue::Null) | None => continue,
                    Some(cell) => cell,
                };
                let observed = classify(cell);
                inferred = Some(match inferred {
                    None => observed,
                    Some(prev) => merge(prev, observed),
                });
                if inferred == Some(ColumnType::Text) {
                    break;
                }
            }
            inferred.unwrap_or(ColumnType::Text)
        })
        .collect()
}

fn classify(cell: &CellValue) -> ColumnType {
    match cell {
        CellValue::Int(_) | CellValue::Bool(_) => ColumnType::Integer,
        CellValue::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                ColumnType::Integer
            } else {
                ColumnType::Real
            }
        }
        CellValue::DateTime(_) => ColumnType::Date,
        CellValue::Text(s) => classify_text(s),
        CellValue::Null => ColumnType::Text,
    }
}

fn classify_text(s: &str) -> ColumnType {
    let trimmed = s.trim();
    if trimmed.parse::<i64>().is_ok() {
        ColumnType::Integer
    } else if trimmed.parse::<f64>().is_ok() {
        ColumnType::Real
    } else if chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
        || chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").is_ok()
    {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

fn merge(a: ColumnType, b: ColumnType) -> ColumnType {
    use ColumnType::*;
    match (a, b) {
        (x, y) if x == y => x,
        (Integer, Real) | (Real, Integer) => Real,
        // Dates mixed with anything else are ambiguous.
        _ => Text,
    }
}
