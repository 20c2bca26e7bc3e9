//! SQLite outcome store
//!
//! Every run gets a row in `runs`; every outcome it produced gets a row in
//! `pages`. Nothing is read back by the traversal engine, so the store is a
//! write-mostly record of what a run did.

use crate::fetcher::CrawlOutcome;
use crate::stats::TraversalStatsSnapshot;
use crate::DeepCrawlError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// SQL schema for the outcome database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    strategy TEXT NOT NULL,
    start_url TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_processed INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    pages_skipped INTEGER NOT NULL DEFAULT 0,
    max_depth_reached INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    final_url TEXT NOT NULL,
    depth INTEGER,
    parent_url TEXT,
    score REAL,
    success INTEGER NOT NULL,
    status_code INTEGER,
    error_message TEXT,
    title TEXT,
    internal_links INTEGER NOT NULL,
    external_links INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);
CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);
"#;

/// Final state of a run row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// One row of the `runs` table
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub strategy: String,
    pub start_url: String,
    pub status: RunStatus,
    pub pages_processed: u64,
    pub pages_failed: u64,
    pub pages_skipped: u64,
    pub max_depth_reached: u32,
}

/// One row of the `pages` table
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub url: String,
    pub final_url: String,
    pub depth: Option<u32>,
    pub parent_url: Option<String>,
    pub score: Option<f64>,
    pub success: bool,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub title: Option<String>,
    pub internal_links: u64,
    pub external_links: u64,
}

/// Records runs and their outcomes in SQLite
pub struct OutcomeStore {
    conn: Connection,
}

impl OutcomeStore {
    /// Opens (or creates) the database at `path`
    pub fn open(path: &Path) -> Result<Self, DeepCrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self { conn })
    }

    /// Creates a throwaway in-memory database
    pub fn in_memory() -> Result<Self, DeepCrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Inserts a `running` row and returns its id
    pub fn start_run(
        &mut self,
        config_hash: &str,
        strategy: &str,
        start_url: &str,
    ) -> Result<i64, DeepCrawlError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, strategy, start_url, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                config_hash,
                strategy,
                start_url,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn record_outcome(&mut self, run_id: i64, outcome: &CrawlOutcome) -> Result<(), DeepCrawlError> {
        insert_page(&self.conn, run_id, outcome)?;
        Ok(())
    }

    /// Records a batch of outcomes in one transaction
    pub fn record_outcomes(
        &mut self,
        run_id: i64,
        outcomes: &[CrawlOutcome],
    ) -> Result<(), DeepCrawlError> {
        let tx = self.conn.transaction()?;
        for outcome in outcomes {
            insert_page(&tx, run_id, outcome)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Stamps the end time and copies the final counters onto the run row
    pub fn finish_run(
        &mut self,
        run_id: i64,
        stats: &TraversalStatsSnapshot,
        status: RunStatus,
    ) -> Result<(), DeepCrawlError> {
        let finished_at = stats.end_time.unwrap_or_else(Utc::now).to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2, pages_processed = ?3,
                 pages_failed = ?4, pages_skipped = ?5, max_depth_reached = ?6
             WHERE id = ?7",
            params![
                finished_at,
                status.to_db_string(),
                stats.pages_processed as i64,
                stats.pages_failed as i64,
                stats.pages_skipped as i64,
                stats.max_depth_reached,
                run_id
            ],
        )?;
        Ok(())
    }

    pub fn get_run(&self, run_id: i64) -> Result<Option<RunRecord>, DeepCrawlError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, strategy, start_url, status,
                    pages_processed, pages_failed, pages_skipped, max_depth_reached
             FROM runs WHERE id = ?1",
        )?;

        let run = stmt
            .query_row(params![run_id], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    strategy: row.get(4)?,
                    start_url: row.get(5)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(6)?)
                        .unwrap_or(RunStatus::Running),
                    pages_processed: row.get::<_, i64>(7)? as u64,
                    pages_failed: row.get::<_, i64>(8)? as u64,
                    pages_skipped: row.get::<_, i64>(9)? as u64,
                    max_depth_reached: row.get(10)?,
                })
            })
            .optional()?;

        Ok(run)
    }

    /// Pages of one run in the order they were recorded
    pub fn pages_for_run(&self, run_id: i64) -> Result<Vec<PageRecord>, DeepCrawlError> {
        let mut stmt = self.conn.prepare(
            "SELECT url, final_url, depth, parent_url, score, success, status_code,
                    error_message, title, internal_links, external_links
             FROM pages WHERE run_id = ?1 ORDER BY id",
        )?;

        let pages = stmt
            .query_map(params![run_id], |row| {
                Ok(PageRecord {
                    url: row.get(0)?,
                    final_url: row.get(1)?,
                    depth: row.get(2)?,
                    parent_url: row.get(3)?,
                    score: row.get(4)?,
                    success: row.get(5)?,
                    status_code: row.get(6)?,
                    error_message: row.get(7)?,
                    title: row.get(8)?,
                    internal_links: row.get::<_, i64>(9)? as u64,
                    external_links: row.get::<_, i64>(10)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    /// Number of recorded pages per depth for one run
    pub fn depth_breakdown(&self, run_id: i64) -> Result<BTreeMap<u32, u64>, DeepCrawlError> {
        let mut stmt = self.conn.prepare(
            "SELECT depth, COUNT(*) FROM pages
             WHERE run_id = ?1 AND depth IS NOT NULL
             GROUP BY depth",
        )?;

        let mut breakdown = BTreeMap::new();
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count as u64);
        }

        Ok(breakdown)
    }
}

fn insert_page(
    conn: &Connection,
    run_id: i64,
    outcome: &CrawlOutcome,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO pages (run_id, url, final_url, depth, parent_url, score, success,
                            status_code, error_message, title, internal_links,
                            external_links, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            run_id,
            outcome.requested_url,
            outcome.url,
            outcome.depth(),
            outcome.parent_url(),
            outcome.score(),
            outcome.success,
            outcome.status_code,
            outcome.error_message,
            outcome.title,
            outcome.links.internal.len() as i64,
            outcome.links.external.len() as i64,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{Link, Links};

    fn outcome(url: &str, depth: u32, parent: Option<&str>) -> CrawlOutcome {
        let mut outcome = CrawlOutcome::success(url, url).with_links(Links {
            internal: vec![Link::new("https://site.test/x", "x")],
            external: Vec::new(),
        });
        outcome.status_code = Some(200);
        outcome.metadata.depth = Some(depth);
        outcome.metadata.parent_url = parent.map(str::to_string);
        outcome
    }

    #[test]
    fn test_start_and_get_run() {
        let mut store = OutcomeStore::in_memory().unwrap();
        let run_id = store.start_run("abc123", "bfs", "https://site.test/").unwrap();

        let run = store.get_run(run_id).unwrap().unwrap();
        assert_eq!(run.config_hash, "abc123");
        assert_eq!(run.strategy, "bfs");
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());

        assert!(store.get_run(run_id + 1).unwrap().is_none());
    }

    #[test]
    fn test_record_outcomes_and_breakdown() {
        let mut store = OutcomeStore::in_memory().unwrap();
        let run_id = store.start_run("h", "dfs", "https://site.test/").unwrap();

        let mut failed = CrawlOutcome::failure("https://site.test/gone", "HTTP 404");
        failed.status_code = Some(404);
        failed.metadata.depth = Some(1);

        store
            .record_outcomes(
                run_id,
                &[
                    outcome("https://site.test/", 0, None),
                    outcome("https://site.test/a", 1, Some("https://site.test/")),
                    failed,
                ],
            )
            .unwrap();

        let pages = store.pages_for_run(run_id).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].depth, Some(0));
        assert_eq!(pages[0].internal_links, 1);
        assert_eq!(pages[1].parent_url.as_deref(), Some("https://site.test/"));
        assert!(!pages[2].success);
        assert_eq!(pages[2].error_message.as_deref(), Some("HTTP 404"));

        let breakdown = store.depth_breakdown(run_id).unwrap();
        assert_eq!(breakdown.get(&0), Some(&1));
        assert_eq!(breakdown.get(&1), Some(&2));
    }

    #[test]
    fn test_finish_run_copies_counters() {
        let mut store = OutcomeStore::in_memory().unwrap();
        let run_id = store.start_run("h", "best-first", "https://site.test/").unwrap();
        store
            .record_outcome(run_id, &outcome("https://site.test/", 0, None))
            .unwrap();

        let stats = TraversalStatsSnapshot {
            start_time: Some(Utc::now()),
            end_time: Some(Utc::now()),
            pages_processed: 4,
            pages_failed: 1,
            pages_skipped: 7,
            max_depth_reached: 2,
        };
        store
            .finish_run(run_id, &stats, RunStatus::Cancelled)
            .unwrap();

        let run = store.get_run(run_id).unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
        assert!(run.finished_at.is_some());
        assert_eq!(run.pages_processed, 4);
        assert_eq!(run.pages_failed, 1);
        assert_eq!(run.pages_skipped, 7);
        assert_eq!(run.max_depth_reached, 2);
    }

    #[test]
    fn test_runs_are_kept_apart() {
        let mut store = OutcomeStore::in_memory().unwrap();
        let first = store.start_run("h", "bfs", "https://site.test/").unwrap();
        let second = store.start_run("h", "bfs", "https://site.test/").unwrap();

        store
            .record_outcome(first, &outcome("https://site.test/", 0, None))
            .unwrap();

        assert_eq!(store.pages_for_run(first).unwrap().len(), 1);
        assert!(store.pages_for_run(second).unwrap().is_empty());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.db");
        {
            let mut store = OutcomeStore::open(&path).unwrap();
            store.start_run("h", "bfs", "https://site.test/").unwrap();
        }

        let store = OutcomeStore::open(&path).unwrap();
        assert!(store.get_run(1).unwrap().is_some());
    }
}
