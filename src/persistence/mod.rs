//! Job store - the persisted record of graph state that makes runs resumable

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteJobStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::job::{JobNode, JobSpec, JobState, RunStatus};

/// One persisted job node: spec, edges, and current state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub spec: JobSpec,
    pub follow_on: Option<String>,
    pub parent: Option<String>,
    pub state: JobState,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn from_node(node: &JobNode) -> Self {
        JobRecord {
            id: node.id.clone(),
            spec: node.spec.clone(),
            follow_on: node.follow_on.clone(),
            parent: node.parent.clone(),
            state: node.state.clone(),
            updated_at: Utc::now(),
        }
    }

    pub fn into_node(self) -> JobNode {
        JobNode {
            id: self.id,
            spec: self.spec,
            follow_on: self.follow_on,
            parent: self.parent,
            state: self.state,
        }
    }
}

/// The persisted run header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunRecord {
    pub fn started() -> Self {
        RunRecord {
            run_id: Uuid::new_v4(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

/// Durable backend for job and run records.
#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or update one job record.
    async fn save_job(&self, record: &JobRecord) -> Result<()>;

    /// All job records in insertion order.
    async fn load_jobs(&self) -> Result<Vec<JobRecord>>;

    /// Insert or update the run header.
    async fn save_run(&self, run: &RunRecord) -> Result<()>;

    /// The run header, if a run was ever started here.
    async fn load_run(&self) -> Result<Option<RunRecord>>;
}

/// In-memory store for tests and ephemeral runs; does not survive the
/// process, so restart only works within one invocation.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: tokio::sync::RwLock<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    jobs: std::collections::HashMap<String, JobRecord>,
    order: Vec<String>,
    run: Option<RunRecord>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl JobStore for InMemoryJobStore {
    async fn save_job(&self, record: &JobRecord) -> Result<()> {
        let mut state = self.inner.write().await;
        if !state.jobs.contains_key(&record.id) {
            state.order.push(record.id.clone());
        }
        state.jobs.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn load_jobs(&self) -> Result<Vec<JobRecord>> {
        let state = self.inner.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.jobs.get(id).cloned())
            .collect())
    }

    async fn save_run(&self, run: &RunRecord) -> Result<()> {
        self.inner.write().await.run = Some(run.clone());
        Ok(())
    }

    async fn load_run(&self) -> Result<Option<RunRecord>> {
        Ok(self.inner.read().await.run.clone())
    }
}
