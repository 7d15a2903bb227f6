//! The cell-level bridge: direct 1-indexed cell access with styles and
//! verbatim formulas.
//!
//! The editor keeps the whole sheet in memory (value grid plus formula and
//! style maps) and persists it in one shot on `save`. Formulas are stored as
//! text; evaluation is left to whatever opens the file afterwards.

use crate::error::{BridgeError, BridgeResult};
use crate::excel::{reader, writer, CellStyle};
use crate::types::CellValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_SHEET: &str = "Sheet1";

#[derive(Debug)]
pub struct WorkbookEditor {
    path: Option<PathBuf>,
    sheet_name: String,
    grid: Vec<Vec<CellValue>>,
    formulas: HashMap<(usize, usize), String>,
    styles: HashMap<(usize, usize), CellStyle>,
}

impl Default for WorkbookEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookEditor {
    /// Create an empty in-memory workbook with a single "Sheet1".
    pub fn new() -> Self {
        Self {
            path: None,
            sheet_name: DEFAULT_SHEET.to_string(),
            grid: Vec::new(),
            formulas: HashMap::new(),
            styles: HashMap::new(),
        }
    }

    /// Load the first sheet of an existing workbook: cell values plus any
    /// formula text. Styles are not read back.
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let (sheet_name, grid, formulas) = reader::read_grid(path)?;
        info!(path = %path.display(), rows = grid.len(), "workbook loaded");
        Ok(Self {
            path: Some(path.to_path_buf()),
            sheet_name,
            grid,
            formulas,
            styles: HashMap::new(),
        })
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn set_sheet_name(&mut self, name: impl Into<String>) {
        self.sheet_name = name.into();
    }

    /// Write a value to a cell. Rows and columns are 1-indexed; the grid grows
    /// as needed.
    pub fn write_cell(
        &mut self,
        row: usize,
        col: usize,
        value: impl Into<CellValue>,
    ) -> BridgeResult<()> {
        let (r, c) = to_zero_indexed(row, col)?;
        self.ensure_cell(r, c);
        self.grid[r][c] = value.into();
        Ok(())
    }

    /// Read a cell. An empty or out-of-range cell reads as `CellValue::Null`,
    /// never an error.
    pub fn read_cell(&self, row: usize, col: usize) -> CellValue {
        if row == 0 || col == 0 {
            return CellValue::Null;
        }
        self.grid
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or(CellValue::Null)
    }

    /// Write values across a row, starting at column 1. Existing cells in the
    /// span are overwritten.
    pub fn write_row(&mut self, row: usize, values: Vec<CellValue>) -> BridgeResult<()> {
        for (offset, value) in values.into_iter().enumerate() {
            self.write_cell(row, offset + 1, value)?;
        }
        Ok(())
    }

    /// Write values down a column, starting at row 1.
    pub fn write_column(&mut self, col: usize, values: Vec<CellValue>) -> BridgeResult<()> {
        for (offset, value) in values.into_iter().enumerate() {
            self.write_cell(offset + 1, col, value)?;
        }
        Ok(())
    }

    /// Attach a style to a cell. The style is validated here so a bad option
    /// (such as a malformed color) fails immediately rather than at save time.
    pub fn format_cell(&mut self, row: usize, col: usize, style: CellStyle) -> BridgeResult<()> {
        let (r, c) = to_zero_indexed(row, col)?;
        style.validate()?;
        self.ensure_cell(r, c);
        self.styles.insert((r, c), style);
        Ok(())
    }

    /// Store a formula string verbatim. It is written as a formula cell on
    /// save; this crate never evaluates it.
    pub fn add_formula(&mut self, row: usize, col: usize, formula: impl Into<String>) -> BridgeResult<()> {
        let (r, c) = to_zero_indexed(row, col)?;
        self.ensure_cell(r, c);
        self.formulas.insert((r, c), formula.into());
        Ok(())
    }

    /// Formula text at a cell, if any.
    pub fn formula(&self, row: usize, col: usize) -> Option<&str> {
        if row == 0 || col == 0 {
            return None;
        }
        self.formulas.get(&(row - 1, col - 1)).map(|s| s.as_str())
    }

    /// The full grid as nested rows, for bulk export.
    pub fn read_all_data(&self) -> &[Vec<CellValue>] {
        &self.grid
    }

    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    pub fn col_count(&self) -> usize {
        self.grid.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Persist the workbook at `path`, or at the path it was loaded from.
    pub fn save(&mut self, path: Option<&Path>) -> BridgeResult<()> {
        let target = match path.or(self.path.as_deref()) {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(BridgeError::Write(
                    "no save path: workbook was created in memory and no path was given".to_string(),
                ))
            }
        };

        writer::write_grid(&target, &self.sheet_name, &self.grid, &self.formulas, &self.styles)?;
        self.path = Some(target.clone());
        info!(path = %target.display(), "workbook saved");
        Ok(())
    }

    fn ensure_cell(&mut self, row: usize, col: usize) {
        if self.grid.len() <= row {
            self.grid.resize(row + 1, Vec::new());
        }
        let cells = &mut self.grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Null);
        }
    }
}

fn to_zero_indexed(row: usize, col: usize) -> BridgeResult<(usize, usize)> {
    if row == 0 || col == 0 {
        return Err(BridgeError::Format(
            "rows and columns are 1-indexed".to_string(),
        ));
    }
    Ok((row - 1, col - 1))
}
