//! Excel writing - `Frame`s and raw grids → .xlsx

use crate::error::{BridgeError, BridgeResult};
use crate::excel::style::CellStyle;
use crate::types::{CellValue, Frame};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};
use std::collections::HashMap;
use std::path::Path;

const DATETIME_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Write an ordered list of `(name, Frame)` sheets to a workbook file.
/// Each frame's column names become the header row.
pub fn write_workbook(path: &Path, sheets: &[(String, Frame)]) -> BridgeResult<()> {
    let mut workbook = Workbook::new();

    for (name, frame) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .map_err(|e| BridgeError::Write(format!("failed to set sheet name '{}': {}", name, e)))?;
        write_frame(worksheet, frame)?;
    }

    workbook
        .save(path)
        .map_err(|e| BridgeError::Write(format!("failed to save workbook: {}", e)))
}

/// Write a frame into a worksheet: header at row 0, data from row 1.
pub fn write_frame(worksheet: &mut Worksheet, frame: &Frame) -> BridgeResult<()> {
    for (col, name) in frame.columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name)
            .map_err(|e| BridgeError::Write(format!("failed to write header: {}", e)))?;
    }

    for (row, cells) in frame.rows.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            write_cell(worksheet, (row + 1) as u32, col as u16, value, None)?;
        }
    }
    Ok(())
}

/// Write a raw editor grid with its formulas and per-cell styles. Keys of the
/// formula and style maps are 0-indexed `(row, col)` positions.
pub fn write_grid(
    path: &Path,
    sheet_name: &str,
    grid: &[Vec<CellValue>],
    formulas: &HashMap<(usize, usize), String>,
    styles: &HashMap<(usize, usize), CellStyle>,
) -> BridgeResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|e| BridgeError::Write(format!("failed to set sheet name '{}': {}", sheet_name, e)))?;

    for (row, cells) in grid.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            // Formula cells win over whatever value the grid holds.
            if formulas.contains_key(&(row, col)) {
                continue;
            }
            let format = styles.get(&(row, col)).map(|s| s.to_format());
            write_cell(worksheet, row as u32, col as u16, value, format.as_ref())?;
        }
    }

    for ((row, col), formula) in formulas {
        let result = match styles.get(&(*row, *col)).map(|s| s.to_format()) {
            Some(format) => worksheet.write_formula_with_format(
                *row as u32,
                *col as u16,
                Formula::new(formula),
                &format,
            ),
            None => worksheet.write_formula(*row as u32, *col as u16, Formula::new(formula)),
        };
        result.map_err(|e| BridgeError::Write(format!("failed to write formula: {}", e)))?;
    }

    workbook
        .save(path)
        .map_err(|e| BridgeError::Write(format!("failed to save workbook: {}", e)))
}

/// Write a single typed cell, with an optional style format.
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: Option<&Format>,
) -> BridgeResult<()> {
    let result = match (value, format) {
        (CellValue::Null, None) => return Ok(()),
        (CellValue::Null, Some(f)) => worksheet.write_blank(row, col, f),
        (CellValue::Bool(b), None) => worksheet.write_boolean(row, col, *b),
        (CellValue::Bool(b), Some(f)) => worksheet.write_boolean_with_format(row, col, *b, f),
        (CellValue::Int(i), None) => worksheet.write_number(row, col, *i as f64),
        (CellValue::Int(i), Some(f)) => worksheet.write_number_with_format(row, col, *i as f64, f),
        (CellValue::Float(x), None) => worksheet.write_number(row, col, *x),
        (CellValue::Float(x), Some(f)) => worksheet.write_number_with_format(row, col, *x, f),
        (CellValue::Text(s), None) => worksheet.write_string(row, col, s),
        (CellValue::Text(s), Some(f)) => worksheet.write_string_with_format(row, col, s, f),
        (CellValue::DateTime(dt), None) => {
            // A number format is required for the cell to read back as a date.
            let f = Format::new().set_num_format(DATETIME_NUM_FORMAT);
            worksheet.write_datetime_with_format(row, col, dt, &f)
        }
        (CellValue::DateTime(dt), Some(f)) => {
            let f = f.clone().set_num_format(DATETIME_NUM_FORMAT);
            worksheet.write_datetime_with_format(row, col, dt, &f)
        }
    };

    result
        .map(|_| ())
        .map_err(|e| BridgeError::Write(format!("failed to write cell ({}, {}): {}", row, col, e)))
}
