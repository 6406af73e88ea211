//! Job executor - runs one job node's body

use std::path::PathBuf;

use thiserror::Error;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::core::config::PipelineConfig;
use crate::core::job::{FanOutSource, JobNode, JobSpec};
use crate::core::stage::Stage;
use crate::execution::cleanup;
use crate::execution::invoker::{InvokeError, ProcessInvoker};

/// Failure of a single job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("{job} exceeded its runtime budget of {secs}s")]
    RuntimeExceeded { job: String, secs: u64 },

    #[error("failed to read fan-out source {path}: {source}")]
    FanOutSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration is missing --{0}")]
    MissingField(&'static str),
}

/// Executes one node and reports any dynamically created children.
pub struct JobExecutor<I> {
    invoker: I,
}

impl<I: ProcessInvoker> JobExecutor<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    /// Run the node's body. Stage jobs invoke the external tool under
    /// their runtime budget; fan-out jobs return the children to attach;
    /// cleanup never fails.
    pub async fn execute(
        &self,
        node: &JobNode,
        config: &PipelineConfig,
    ) -> Result<Vec<JobNode>, JobError> {
        match &node.spec {
            JobSpec::Stage {
                stage,
                index,
                resources,
            } => {
                let invocation = self.invoker.invoke(*stage, *index, resources.cores, config);
                match resources.runtime_secs {
                    Some(secs) => timeout(Duration::from_secs(secs), invocation)
                        .await
                        .map_err(|_| JobError::RuntimeExceeded {
                            job: node.unit_name(),
                            secs,
                        })??,
                    None => invocation.await?,
                }
                Ok(Vec::new())
            }

            JobSpec::FanOut { stage, source } => self.fan_out(node, *stage, *source, config).await,

            JobSpec::Cleanup => {
                let outcomes = cleanup::remove_split_artifacts(&config.outdir).await;
                for (path, outcome) in &outcomes {
                    debug!("cleanup {:?}: {}", outcome, path.display());
                }
                let removed = outcomes
                    .iter()
                    .filter(|(_, o)| *o == cleanup::DeleteOutcome::Removed)
                    .count();
                info!("{}: removed {} split artifacts", node.unit_name(), removed);
                Ok(Vec::new())
            }
        }
    }

    /// Read the source file and create one child per non-blank line.
    ///
    /// All-or-nothing: an unreadable source fails the job before any
    /// child exists.
    async fn fan_out(
        &self,
        node: &JobNode,
        stage: Stage,
        source: FanOutSource,
        config: &PipelineConfig,
    ) -> Result<Vec<JobNode>, JobError> {
        let path = match source {
            FanOutSource::ReferenceIndex => config
                .reference
                .clone()
                .ok_or(JobError::MissingField("reference"))?,
            FanOutSource::SplitList => config.split_list(),
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| JobError::FanOutSource {
                path: path.clone(),
                source,
            })?;

        let children: Vec<JobNode> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(ix, _)| JobNode::stage_child(&node.id, stage, ix as u32 + 1, config))
            .collect();

        info!(
            "{}: {} work units discovered in {}",
            node.unit_name(),
            children.len(),
            path.display()
        );
        Ok(children)
    }
}
