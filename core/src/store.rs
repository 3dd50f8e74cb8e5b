//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never calls it; the runner writes after each command.

use rusqlite::{params, Connection, OptionalExtension};
use crate::{
    error::SimResult,
    event::EventLogEntry,
    types::SeasonNo,
};

pub struct SimStore {
    conn: Connection,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl SimStore {
    /// Open (or create) the league database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, now()],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, season, source, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.run_id,
                entry.season as i64,
                entry.source,
                entry.event_type,
                entry.payload,
                now(),
            ],
        )?;
        Ok(())
    }

    /// Append a command's events in one transaction.
    pub fn append_events(&mut self, entries: &[EventLogEntry]) -> SimResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_log (run_id, season, source, event_type, payload, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let created_at = now();
            for entry in entries {
                stmt.execute(params![
                    entry.run_id,
                    entry.season as i64,
                    entry.source,
                    entry.event_type,
                    entry.payload,
                    created_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Every event of a run, in the order it was written.
    pub fn events_for_run(&self, run_id: &str) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, season, source, event_type, payload
             FROM event_log WHERE run_id = ?1
             ORDER BY id ASC"
        )?;
        let entries = stmt.query_map(params![run_id], |row| {
            Ok(EventLogEntry {
                id:         Some(row.get(0)?),
                run_id:     row.get(1)?,
                season:     row.get::<_, i64>(2)? as SeasonNo,
                source:     row.get(3)?,
                event_type: row.get(4)?,
                payload:    row.get(5)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn count_events(&self, run_id: &str, event_type: &str) -> SimResult<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, season: SeasonNo, state_json: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot (run_id, season, state_json, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, season as i64, state_json, now()],
        )?;
        Ok(())
    }

    /// The most recently saved snapshot of a run.
    pub fn latest_snapshot(&self, run_id: &str) -> SimResult<Option<(SeasonNo, String)>> {
        let result = self.conn.query_row(
            "SELECT season, state_json FROM snapshot
             WHERE run_id = ?1
             ORDER BY id DESC LIMIT 1",
            params![run_id],
            |row| Ok((row.get::<_, i64>(0)? as SeasonNo, row.get::<_, String>(1)?)),
        ).optional()?;
        Ok(result)
    }
}
