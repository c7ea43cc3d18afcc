//! SQLite log of scrape runs
//!
//! Keeps one row per run so the history of a CSV file (which runs appended
//! to it, how many rows, and how each run ended) survives across sessions.

use crate::storage::schema::initialize_schema;
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during run log operations
#[derive(Debug, Error)]
pub enum RunLogError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for run log operations
pub type RunLogResult<T> = Result<T, RunLogError>;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, category, output_path, config_hash, status, rows_written";

/// SQLite-backed run history
pub struct RunLog {
    conn: Connection,
}

impl RunLog {
    /// Opens (or creates) the run log at `path`
    pub fn open(path: &Path) -> RunLogResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory run log (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> RunLogResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Records the start of a run and returns its ID
    pub fn create_run(
        &mut self,
        category: &str,
        output_path: &str,
        config_hash: &str,
    ) -> RunLogResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, category, output_path, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                category,
                output_path,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Records how a run ended
    pub fn finish_run(&mut self, run_id: i64, status: RunStatus, rows_written: u64) -> RunLogResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, rows_written = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, rows_written as i64, run_id],
        )?;

        if updated == 0 {
            return Err(RunLogError::RunNotFound(run_id));
        }
        Ok(())
    }

    pub fn get_run(&self, run_id: i64) -> RunLogResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], row_to_run)
            .optional()?
            .ok_or(RunLogError::RunNotFound(run_id))
    }

    pub fn latest_run(&self) -> RunLogResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], row_to_run).optional()?)
    }

    /// Most recent runs first
    pub fn list_runs(&self, limit: u32) -> RunLogResult<Vec<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT ?1", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map(params![limit], row_to_run)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        category: row.get(3)?,
        output_path: row.get(4)?,
        config_hash: row.get(5)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(6)?).unwrap_or(RunStatus::Failed),
        rows_written: row.get::<_, i64>(7)? as u64,
    })
}
