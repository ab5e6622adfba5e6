//! Local search history.
//!
//! Queries the user typed into the marketplace search box, newest first.
//! Re-searching a query moves it to the front instead of duplicating it, and
//! only the last [`MAX_ENTRIES`] survive. Nothing here is sent to the server.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const MAX_ENTRIES: usize = 10;

/// How many entries the search box shows.
pub const DISPLAY_ENTRIES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchEntry {
    pub query: String,
    pub searched_at: DateTime<Utc>,
}

pub struct SearchHistory {
    conn: Mutex<Connection>,
}

impl SearchHistory {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open search history at {}", path.display()))?;
        conn.busy_timeout(Duration::from_millis(250))?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS searches(
                query TEXT PRIMARY KEY,
                searched_at INTEGER NOT NULL,
                seq INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_searches_seq ON searches(seq DESC);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record a search. Blank queries are ignored.
    pub fn add(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let conn = self.lock()?;
        let now = Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO searches(query, searched_at, seq)
             VALUES (?1, ?2, (SELECT COALESCE(MAX(seq), 0) + 1 FROM searches))
             ON CONFLICT(query) DO UPDATE SET searched_at = excluded.searched_at, seq = excluded.seq",
            params![query, now],
        )?;
        let trimmed = conn.execute(
            "DELETE FROM searches WHERE query NOT IN
             (SELECT query FROM searches ORDER BY seq DESC LIMIT ?1)",
            params![MAX_ENTRIES as i64],
        )?;
        if trimmed > 0 {
            log::debug!("[search] evicted {} old entries", trimmed);
        }
        Ok(())
    }

    /// Newest first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Result<Vec<SearchEntry>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT query, searched_at FROM searches ORDER BY seq DESC LIMIT ?1")?;
        let mut rows = stmt.query(params![limit as i64])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let ts: i64 = row.get(1)?;
            out.push(SearchEntry {
                query: row.get(0)?,
                searched_at: Utc.timestamp_millis_opt(ts).single().unwrap_or_default(),
            });
        }
        Ok(out)
    }

    pub fn all(&self) -> Result<Vec<SearchEntry>> {
        self.recent(MAX_ENTRIES)
    }

    pub fn remove(&self, query: &str) -> Result<bool> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM searches WHERE query = ?1", params![query.trim()])? > 0)
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.execute("DELETE FROM searches", [])?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("search history lock poisoned"))
    }
}
