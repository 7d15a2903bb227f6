//! Embedded SQLite store holding the mapped sheet tables.

use crate::error::{BridgeError, BridgeResult};
use crate::types::{CellValue, ColumnInfo, ColumnType, Frame, TableInfo};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Bool(b) => ToSqlOutput::Owned(Value::Integer(*b as i64)),
            CellValue::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            CellValue::Float(x) => ToSqlOutput::Owned(Value::Real(*x)),
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            CellValue::DateTime(dt) => {
                ToSqlOutput::Owned(Value::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            }
        })
    }
}

/// Owns the embedded database connection. Ephemeral by default, file-backed
/// when opened at a path. Dropped with the owning facade.
#[derive(Debug)]
pub struct SqlStore {
    conn: Connection,
}

impl SqlStore {
    pub fn in_memory() -> BridgeResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn open(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Drop and recreate a table from a frame, one SQL row per data row.
    /// Mirrors a "replace on conflict" bulk load.
    pub fn replace_table(
        &self,
        name: &str,
        frame: &Frame,
        types: &[ColumnType],
    ) -> BridgeResult<()> {
        if frame.columns.is_empty() {
            return Err(BridgeError::Query(format!(
                "cannot create table '{}' with no columns",
                name
            )));
        }

        self.conn
            .execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])?;

        let column_defs: Vec<String> = frame
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let ty = types.get(i).copied().unwrap_or(ColumnType::Text);
                format!("{} {}", quote_ident(col), ty.sql_name())
            })
            .collect();
        self.conn.execute(
            &format!("CREATE TABLE {} ({})", quote_ident(name), column_defs.join(", ")),
            [],
        )?;

        let placeholders: Vec<String> = (1..=frame.columns.len()).map(|i| format!("?{}", i)).collect();
        let mut insert = self.conn.prepare(&format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(name),
            placeholders.join(", ")
        ))?;
        for row in &frame.rows {
            insert.execute(params_from_iter(row.iter()))?;
        }
        Ok(())
    }

    /// Run a read query and collect the result set into a frame. Column names
    /// come from the statement, in result order.
    pub fn query(&self, sql: &str) -> BridgeResult<Frame> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut frame = Frame::new(columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(cell_from_ref(row.get_ref(i)?));
            }
            frame.push_row(cells);
        }
        Ok(frame)
    }

    /// Run an INSERT/UPDATE/DELETE statement; returns the affected row count.
    pub fn execute(&self, sql: &str) -> BridgeResult<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Column names/types and row count for a mapped table.
    pub fn table_info(&self, name: &str) -> BridgeResult<TableInfo> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(name)))?;
        let mut rows = stmt.query([])?;

        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            let col_name: String = row.get(1)?;
            let declared: String = row.get(2)?;
            columns.push(ColumnInfo {
                name: col_name,
                column_type: column_type_from_decl(&declared),
            });
        }
        // PRAGMA reports nothing at all for an unknown table.
        if columns.is_empty() {
            return Err(BridgeError::TableNotMapped(name.to_string()));
        }

        let row_count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
            [],
            |r| r.get(0),
        )?;

        Ok(TableInfo {
            name: name.to_string(),
            columns,
            row_count: row_count as usize,
        })
    }

    /// Names of all user tables in the store.
    pub fn list_tables(&self) -> BridgeResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

fn cell_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Int(i),
        ValueRef::Real(x) => CellValue::Float(x),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn column_type_from_decl(declared: &str) -> ColumnType {
    match declared.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT" => ColumnType::Integer,
        "REAL" | "FLOAT" | "DOUBLE" => ColumnType::Real,
        _ => ColumnType::Text,
    }
}

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
