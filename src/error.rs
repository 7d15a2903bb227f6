use std::path::PathBuf;
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("format error: {0}")]
    Format(String),

    #[error("table not mapped: {0}")]
    TableNotMapped(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("write error: {0}")]
    Write(String),
}

impl From<rusqlite::Error> for BridgeError {
    /// SQLite failures referencing a missing table surface as `TableNotMapped`
    /// so callers can distinguish "never loaded" from a malformed statement.
    fn from(err: rusqlite::Error) -> Self {
        let message = err.to_string();
        if let Some(table) = message.strip_prefix("no such table: ") {
            BridgeError::TableNotMapped(table.to_string())
        } else {
            BridgeError::Query(message)
        }
    }
}
