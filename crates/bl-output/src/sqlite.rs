//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `boardings` and `bus_utilization`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{BoardingRow, OutputResult, UtilizationRow};

/// Writes run output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS boardings (
                 seq      INTEGER PRIMARY KEY,
                 time     REAL    NOT NULL,
                 bus_id   INTEGER NOT NULL,
                 terminal INTEGER NOT NULL,
                 wait     REAL    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS bus_utilization (
                 bus_id     INTEGER PRIMARY KEY,
                 passengers INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_boardings(&mut self, rows: &[BoardingRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO boardings (seq, time, bus_id, terminal, wait) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.seq, row.time, row.bus_id, row.terminal, row.wait])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_utilization(&mut self, rows: &[UtilizationRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            // A later write for the same bus replaces the earlier count.
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO bus_utilization (bus_id, passengers) VALUES (?1, ?2)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.bus_id, row.passengers])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
