//! SQLite-backed job store

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::persistence::{JobRecord, JobStore, RunRecord};

const DB_FILE: &str = "jobs.db";

/// Job store persisted as `<jobstore>/jobs.db`.
#[derive(Debug)]
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Initialize a fresh store. Refuses a location that already holds
    /// one; a previous run must be resumed with the restart flag instead.
    pub async fn create(dir: &Path) -> Result<Self> {
        let db_path = dir.join(DB_FILE);
        if db_path.exists() {
            bail!(
                "job store already exists at {}; pass --restart to resume it",
                dir.display()
            );
        }
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create job store directory {}", dir.display()))?;

        let store = Self::connect(&db_path, true).await?;
        store.init().await?;
        Ok(store)
    }

    /// Open an existing store for a restarted run.
    pub async fn open(dir: &Path) -> Result<Self> {
        let db_path = dir.join(DB_FILE);
        if !db_path.is_file() {
            bail!("no job store found at {}", dir.display());
        }
        Self::connect(&db_path, false).await
    }

    async fn connect(db_path: &PathBuf, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(create);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to open job store {}", db_path.display()))?;
        Ok(Self { pool })
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                spec TEXT NOT NULL,
                follow_on TEXT,
                parent TEXT,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }
}

#[async_trait::async_trait]
impl JobStore for SqliteJobStore {
    async fn save_job(&self, record: &JobRecord) -> Result<()> {
        // Upsert rather than replace so rowid keeps insertion order,
        // which load_jobs relies on to rebuild the graph deterministically.
        sqlx::query(
            r#"
            INSERT INTO jobs (id, spec, follow_on, parent, state, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                spec = excluded.spec,
                follow_on = excluded.follow_on,
                parent = excluded.parent,
                state = excluded.state,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.id)
        .bind(serde_json::to_string(&record.spec)?)
        .bind(&record.follow_on)
        .bind(&record.parent)
        .bind(serde_json::to_string(&record.state)?)
        .bind(Self::to_naive(record.updated_at))
        .execute(&self.pool)
        .await
        .context("failed to save job record")?;

        Ok(())
    }

    async fn load_jobs(&self) -> Result<Vec<JobRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, spec, follow_on, parent, state, updated_at
            FROM jobs
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load job records")?;

        rows.iter()
            .map(|row| {
                Ok(JobRecord {
                    id: row.get("id"),
                    spec: serde_json::from_str(&row.get::<String, _>("spec"))?,
                    follow_on: row.get("follow_on"),
                    parent: row.get("parent"),
                    state: serde_json::from_str(&row.get::<String, _>("state"))?,
                    updated_at: Self::from_naive(row.get("updated_at")),
                })
            })
            .collect()
    }

    async fn save_run(&self, run: &RunRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO runs (id, status, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                finished_at = excluded.finished_at
            "#,
        )
        .bind(run.run_id.to_string())
        .bind(serde_json::to_string(&run.status)?)
        .bind(Self::to_naive(run.started_at))
        .bind(run.finished_at.map(Self::to_naive))
        .execute(&self.pool)
        .await
        .context("failed to save run record")?;

        Ok(())
    }

    async fn load_run(&self) -> Result<Option<RunRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, status, started_at, finished_at
            FROM runs
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("failed to load run record")?;

        if let Some(row) = row {
            Ok(Some(RunRecord {
                run_id: Uuid::parse_str(&row.get::<String, _>("id"))?,
                status: serde_json::from_str(&row.get::<String, _>("status"))?,
                started_at: Self::from_naive(row.get("started_at")),
                finished_at: row
                    .get::<Option<NaiveDateTime>, _>("finished_at")
                    .map(Self::from_naive),
            }))
        } else {
            Ok(None)
        }
    }
}
