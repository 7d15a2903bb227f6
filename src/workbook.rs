//! The tabular bridge: an Excel workbook mirrored into SQLite.
//!
//! `SqlWorkbook` loads every sheet into memory on open, maps sheets to tables
//! on request, runs queries and mutations against the store, and writes the
//! (possibly rewritten) sheets back to disk only on an explicit `save`.

use crate::error::BridgeResult;
use crate::excel::{reader, writer};
use crate::sql::store::quote_ident;
use crate::sql::SqlStore;
use crate::types::{Frame, TableInfo};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct SqlWorkbook {
    path: PathBuf,
    sheets: Vec<(String, Frame)>,
    store: SqlStore,
}

impl SqlWorkbook {
    /// Open a workbook backed by an ephemeral in-memory store.
    pub fn open(path: impl AsRef<Path>) -> BridgeResult<Self> {
        Self::with_store(path.as_ref(), SqlStore::in_memory()?)
    }

    /// Open a workbook backed by a SQLite database file at `db_path`.
    pub fn open_with_db(path: impl AsRef<Path>, db_path: impl AsRef<Path>) -> BridgeResult<Self> {
        Self::with_store(path.as_ref(), SqlStore::open(db_path)?)
    }

    fn with_store(path: &Path, store: SqlStore) -> BridgeResult<Self> {
        let sheets = reader::read_workbook(path)?;
        info!(
            path = %path.display(),
            sheets = sheets.len(),
            "workbook loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
            store,
        })
    }

    /// Mirror sheets into SQL tables. `names` restricts the selection; `None`
    /// maps every sheet. Returns the created table names in sheet order.
    ///
    /// A requested sheet that does not exist, a sheet with no header row, or a
    /// sheet whose sanitized name collides with an already mapped table is
    /// skipped with a warning rather than failing the whole load.
    pub fn map_sheets_to_tables(&mut self, names: Option<&[&str]>) -> BridgeResult<Vec<String>> {
        if let Some(requested) = names {
            for name in requested {
                if !self.sheets.iter().any(|(s, _)| s == name) {
                    warn!(sheet = *name, "sheet not found in workbook");
                }
            }
        }

        let mut created = Vec::new();
        for (sheet_name, frame) in &self.sheets {
            if let Some(requested) = names {
                if !requested.contains(&sheet_name.as_str()) {
                    continue;
                }
            }
            if frame.columns.is_empty() {
                warn!(sheet = sheet_name.as_str(), "sheet has no header row, skipping");
                continue;
            }

            let table_name = sanitize_table_name(sheet_name);
            if created.contains(&table_name) {
                warn!(
                    sheet = sheet_name.as_str(),
                    table = table_name.as_str(),
                    "sheet sanitizes to an already mapped table name, skipping"
                );
                continue;
            }
            let types = reader::infer_column_types(frame);
            self.store.replace_table(&table_name, frame, &types)?;
            info!(
                sheet = sheet_name.as_str(),
                table = table_name.as_str(),
                rows = frame.row_count(),
                "sheet mapped to table"
            );
            created.push(table_name);
        }
        Ok(created)
    }

    /// Execute a read query against the store.
    pub fn run_query(&self, sql: &str) -> BridgeResult<Frame> {
        debug!(sql, "running query");
        let result = self.store.query(sql)?;
        debug!(rows = result.row_count(), "query finished");
        Ok(result)
    }

    /// Execute an INSERT/UPDATE/DELETE; returns the affected row count.
    pub fn run_mutation(&self, sql: &str) -> BridgeResult<usize> {
        debug!(sql, "running mutation");
        let affected = self.store.execute(sql)?;
        info!(affected, "mutation finished");
        Ok(affected)
    }

    /// Replace a sheet's full contents (header and rows) with a query result.
    /// The sheet is created if it does not exist.
    pub fn rewrite_sheet_from_query(&mut self, sheet_name: &str, sql: &str) -> BridgeResult<()> {
        let frame = self.run_query(sql)?;
        info!(
            sheet = sheet_name,
            rows = frame.row_count(),
            "rewriting sheet from query result"
        );
        match self.sheets.iter_mut().find(|(name, _)| name == sheet_name) {
            Some((_, existing)) => *existing = frame,
            None => self.sheets.push((sheet_name.to_string(), frame)),
        }
        Ok(())
    }

    /// Serialize the in-memory sheets to disk, at `path` or the original path.
    pub fn save(&self, path: Option<&Path>) -> BridgeResult<()> {
        let target = path.unwrap_or(&self.path);
        writer::write_workbook(target, &self.sheets)?;
        info!(path = %target.display(), "workbook saved");
        Ok(())
    }

    /// Copy the original workbook file to a backup path before a destructive
    /// save. Defaults to `<stem>_backup<ext>` next to the source. The backup
    /// is never written again by this crate.
    pub fn backup_original(&self, backup_path: Option<&Path>) -> BridgeResult<PathBuf> {
        let target = match backup_path {
            Some(p) => p.to_path_buf(),
            None => derive_backup_path(&self.path),
        };
        std::fs::copy(&self.path, &target)?;
        info!(backup = %target.display(), "backup created");
        Ok(target)
    }

    /// Column names/types and row count for a mapped table. No side effects.
    pub fn describe_table(&self, table: &str) -> BridgeResult<TableInfo> {
        self.store.table_info(table)
    }

    /// Inventory of mapped table names. No side effects.
    pub fn list_tables(&self) -> BridgeResult<Vec<String>> {
        self.store.list_tables()
    }

    /// First `limit` rows of a table.
    pub fn preview(&self, table: &str, limit: usize) -> BridgeResult<Frame> {
        self.run_query(&format!(
            "SELECT * FROM {} LIMIT {}",
            quote_ident(table),
            limit
        ))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Frame> {
        self.sheets
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(_, frame)| frame)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn store(&self) -> &SqlStore {
        &self.store
    }
}

/// Sanitize a sheet name into a valid SQL identifier: non-word characters
/// become underscores, a leading non-letter gets an underscore prefix.
pub fn sanitize_table_name(name: &str) -> String {
    static NON_WORD: OnceLock<Regex> = OnceLock::new();
    let re = NON_WORD.get_or_init(|| Regex::new(r"\W").expect("valid regex"));

    let cleaned = re.replace_all(name, "_").into_owned();
    match cleaned.chars().next() {
        None => "unnamed_table".to_string(),
        Some(first) if first.is_alphabetic() || first == '_' => cleaned,
        Some(_) => format!("_{}", cleaned),
    }
}

fn derive_backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let file_name = match path.extension() {
        Some(ext) => format!("{}_backup.{}", stem, ext.to_string_lossy()),
        None => format!("{}_backup", stem),
    };
    path.with_file_name(file_name)
}

//==============================================================================
// Convenience free functions
//==============================================================================

/// One-shot: load a workbook, map every sheet, run a single read query.
pub fn quick_query(excel_path: impl AsRef<Path>, sql: &str) -> BridgeResult<Frame> {
    let mut workbook = SqlWorkbook::open(excel_path)?;
    workbook.map_sheets_to_tables(None)?;
    workbook.run_query(sql)
}

/// One-shot: rewrite one sheet of a workbook from a query and save, with an
/// optional backup of the original file first.
pub fn update_with_query(
    excel_path: impl AsRef<Path>,
    sheet_name: &str,
    sql: &str,
    output_path: Option<&Path>,
    backup: bool,
) -> BridgeResult<()> {
    let mut workbook = SqlWorkbook::open(excel_path)?;
    if backup {
        workbook.backup_original(None)?;
    }
    workbook.map_sheets_to_tables(None)?;
    workbook.rewrite_sheet_from_query(sheet_name, sql)?;
    workbook.save(output_path)
}
