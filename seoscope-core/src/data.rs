use crate::classify::Bucket;
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Last computed authority data for one canonical domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    pub opr_score: f64,
    pub authority_score: u8,
    pub traffic_bucket: Bucket,
    pub keywords_bucket: String,
    pub value_bucket: Bucket,
    pub synthetic: bool,
    pub last_fetched_at: DateTime<Utc>,
}

impl DomainRecord {
    pub fn is_fresh(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now - self.last_fetched_at < window
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS domains (
    domain TEXT PRIMARY KEY,
    opr_score REAL NOT NULL,
    authority_score INTEGER NOT NULL CHECK(authority_score BETWEEN 0 AND 100),
    traffic_bucket TEXT NOT NULL CHECK(traffic_bucket IN ('very_low', 'low', 'medium', 'high', 'very_high')),
    keywords_bucket TEXT NOT NULL,
    value_bucket TEXT NOT NULL CHECK(value_bucket IN ('very_low', 'low', 'medium', 'high', 'very_high')),
    synthetic BOOLEAN NOT NULL DEFAULT 0,
    last_fetched_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_domains_last_fetched ON domains(last_fetched_at);
            ",
        )
    }

    pub fn get_domain(&self, domain: &str) -> Result<Option<DomainRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT domain, opr_score, authority_score, traffic_bucket, keywords_bucket,
                    value_bucket, synthetic, last_fetched_at
             FROM domains WHERE domain = ?1",
        )?;

        let row = stmt.query_row(params![domain], RawRow::read).optional()?;
        row.map(RawRow::into_record).transpose()
    }

    /// Insert or replace the record keyed by its domain.
    pub fn upsert_domain(&self, record: &DomainRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO domains (
                domain, opr_score, authority_score, traffic_bucket, keywords_bucket,
                value_bucket, synthetic, last_fetched_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(domain) DO UPDATE SET
                opr_score = excluded.opr_score,
                authority_score = excluded.authority_score,
                traffic_bucket = excluded.traffic_bucket,
                keywords_bucket = excluded.keywords_bucket,
                value_bucket = excluded.value_bucket,
                synthetic = excluded.synthetic,
                last_fetched_at = excluded.last_fetched_at",
            params![
                &record.domain,
                record.opr_score,
                record.authority_score as i64,
                record.traffic_bucket.as_str(),
                &record.keywords_bucket,
                record.value_bucket.as_str(),
                record.synthetic,
                record.last_fetched_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn count_domains(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM domains", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Domains fetched before `cutoff`, oldest first.
    pub fn list_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<(String, DateTime<Utc>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT domain, last_fetched_at FROM domains
             WHERE last_fetched_at < ?1 ORDER BY last_fetched_at, domain",
        )?;

        let rows = stmt
            .query_map(params![cutoff.timestamp()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(domain, ts)| {
                let fetched = timestamp_to_utc(&domain, ts)?;
                Ok((domain, fetched))
            })
            .collect()
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}

struct RawRow {
    domain: String,
    opr_score: f64,
    authority_score: i64,
    traffic_bucket: String,
    keywords_bucket: String,
    value_bucket: String,
    synthetic: bool,
    last_fetched_at: i64,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            domain: row.get(0)?,
            opr_score: row.get(1)?,
            authority_score: row.get(2)?,
            traffic_bucket: row.get(3)?,
            keywords_bucket: row.get(4)?,
            value_bucket: row.get(5)?,
            synthetic: row.get(6)?,
            last_fetched_at: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<DomainRecord, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRecord {
            domain: self.domain.clone(),
            reason,
        };

        let authority_score = u8::try_from(self.authority_score)
            .ok()
            .filter(|s| *s <= 100)
            .ok_or_else(|| corrupt(format!("authority_score {}", self.authority_score)))?;
        let traffic_bucket = self.traffic_bucket.parse::<Bucket>().map_err(corrupt)?;
        let value_bucket = self.value_bucket.parse::<Bucket>().map_err(corrupt)?;
        let last_fetched_at = timestamp_to_utc(&self.domain, self.last_fetched_at)?;

        Ok(DomainRecord {
            domain: self.domain,
            opr_score: self.opr_score,
            authority_score,
            traffic_bucket,
            keywords_bucket: self.keywords_bucket,
            value_bucket,
            synthetic: self.synthetic,
            last_fetched_at,
        })
    }
}

fn timestamp_to_utc(domain: &str, ts: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| StoreError::CorruptRecord {
        domain: domain.to_string(),
        reason: format!("last_fetched_at {}", ts),
    })
}

/// Per-domain persistence consulted by the resolver.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn get(&self, domain: &str) -> Result<Option<DomainRecord>, StoreError>;
    async fn upsert(&self, record: &DomainRecord) -> Result<(), StoreError>;
}

/// [`Database`] behind a mutex, driven from the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(Database::new(path)?))
    }

    async fn with_db<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }

    pub async fn count_domains(&self) -> Result<i64, StoreError> {
        self.with_db(|db| db.count_domains()).await
    }

    pub async fn list_stale(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<(String, DateTime<Utc>)>, StoreError> {
        self.with_db(move |db| db.list_stale(cutoff)).await
    }
}

#[async_trait]
impl MetricsStore for SqliteStore {
    async fn get(&self, domain: &str) -> Result<Option<DomainRecord>, StoreError> {
        let domain = domain.to_string();
        self.with_db(move |db| db.get_domain(&domain)).await
    }

    async fn upsert(&self, record: &DomainRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.with_db(move |db| db.upsert_domain(&record)).await
    }
}
