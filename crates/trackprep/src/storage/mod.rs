//! Storage layer for trackprep.
//!
//! Processed frames are written as CSV for inspection and as a `SQLite`
//! table for typed, queryable access.

pub mod schema;

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::frame::{Frame, Value};

/// Name of the table holding processed observations.
pub const OBSERVATIONS_TABLE: &str = "observations";

/// Create the parent directory of `path` if needed.
fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Write a frame as CSV with a header row.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv(frame: &Frame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(frame.column_names())?;
    for index in 0..frame.height() {
        if let Some(row) = frame.row(index) {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
    }
    writer.flush()?;

    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Missing => SqlValue::Null,
        Value::Number(n) => SqlValue::Real(*n),
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        other => SqlValue::Text(other.to_string()),
    }
}

/// `SQLite` database holding processed frames.
#[derive(Debug)]
pub struct SqliteExport {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteExport {
    /// Open or create a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialised.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        ensure_parent(&path)?;

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.execute(schema::CREATE_METADATA_TABLE, [])?;

        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        conn.execute(schema::CREATE_METADATA_TABLE, [])?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace `table` with the contents of `frame`.
    ///
    /// The table is dropped and recreated with column types inferred from
    /// the frame; all rows are inserted in one transaction. The row count and
    /// write time are recorded in the metadata table, along with the frame
    /// name of any column renamed by [`schema::sql_column_names`] under
    /// `{table}.column.{sql_name}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame has no columns or a statement fails.
    pub fn write_frame(&mut self, table: &str, frame: &Frame) -> Result<usize> {
        if frame.width() == 0 {
            return Err(Error::internal("cannot store a frame without columns"));
        }

        let renamed: Vec<(String, String)> = frame
            .column_names()
            .into_iter()
            .zip(schema::sql_column_names(frame))
            .filter(|(original, sql)| *original != sql.as_str())
            .map(|(original, sql)| (sql, original.to_string()))
            .collect();
        for (sql, original) in &renamed {
            warn!("Column '{original}' stored as '{sql}' in table {table}");
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!("DROP TABLE IF EXISTS {}", schema::quote_ident(table)),
            [],
        )?;
        tx.execute(&schema::create_table_sql(table, frame), [])?;
        {
            let mut stmt = tx.prepare(&schema::insert_sql(table, frame))?;
            for index in 0..frame.height() {
                if let Some(row) = frame.row(index) {
                    stmt.execute(params_from_iter(row.into_iter().map(to_sql)))?;
                }
            }
        }
        let entries = [
            (format!("{table}.row_count"), frame.height().to_string()),
            (format!("{table}.processed_at"), Utc::now().to_rfc3339()),
        ]
        .into_iter()
        .chain(
            renamed
                .into_iter()
                .map(|(sql, original)| (format!("{table}.column.{sql}"), original)),
        );
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                (key, value),
            )?;
        }
        tx.commit()?;

        debug!("Stored {} rows in table {table}", frame.height());
        Ok(frame.height())
    }

    /// Count rows in a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table does not exist.
    pub fn count(&self, table: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", schema::quote_ident(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Read a metadata value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn metadata(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Borrow the underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Files written by [`save`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SavedOutputs {
    /// CSV file, if written.
    pub csv: Option<PathBuf>,
    /// `SQLite` database, if written.
    pub sqlite: Option<PathBuf>,
}

/// Write the processed frame to every enabled output.
///
/// # Errors
///
/// Returns an error if any output cannot be written.
pub fn save(frame: &Frame, output: &OutputConfig) -> Result<SavedOutputs> {
    let mut saved = SavedOutputs::default();

    if output.write_sqlite {
        let path = output.output_dir.join(format!("{}.db", output.file_stem));
        let mut export = SqliteExport::open(&path)?;
        export.write_frame(OBSERVATIONS_TABLE, frame)?;
        info!("Saved data as SQLite: {}", path.display());
        saved.sqlite = Some(path);
    }

    if output.write_csv {
        let path = output.output_dir.join(format!("{}.csv", output.file_stem));
        write_csv(frame, &path)?;
        info!("Saved data as CSV: {}", path.display());
        saved.csv = Some(path);
    }

    Ok(saved)
}
