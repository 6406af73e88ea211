//! Execution engine and run controller

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::config::PipelineConfig;
use crate::core::graph::{JobGraph, PipelineBuilder};
use crate::core::job::{JobNode, JobState, RunStatus};
use crate::execution::executor::{JobError, JobExecutor};
use crate::execution::invoker::ProcessInvoker;
use crate::execution::scheduler::{ExecutionScheduler, SchedulingStrategy};
use crate::persistence::{JobRecord, JobStore, RunRecord};

/// Events emitted while a run progresses.
#[derive(Debug, Clone)]
pub enum JobEvent {
    RunStarted {
        run_id: Uuid,
        total_jobs: usize,
    },
    JobStarted {
        id: String,
        name: String,
    },
    /// A fan-out job attached this many children to the graph.
    FanOut {
        id: String,
        children: usize,
    },
    JobSucceeded {
        id: String,
    },
    JobFailed {
        id: String,
        error: String,
    },
    RunCompleted {
        run_id: Uuid,
        status: RunStatus,
    },
}

pub type EventHandler = Box<dyn Fn(&JobEvent) + Send + Sync>;

/// Fork-join engine: launches ready jobs up to the worker cap, attaches
/// fan-out children, and persists every state transition to the job store.
pub struct ExecutionEngine<I> {
    executor: Arc<JobExecutor<I>>,
    store: Arc<dyn JobStore>,
    scheduler: ExecutionScheduler,
    config: Arc<PipelineConfig>,
    event_handlers: Vec<EventHandler>,
}

impl<I: ProcessInvoker + 'static> ExecutionEngine<I> {
    pub fn new(
        invoker: I,
        store: Arc<dyn JobStore>,
        config: Arc<PipelineConfig>,
        strategy: SchedulingStrategy,
    ) -> Self {
        Self {
            executor: Arc::new(JobExecutor::new(invoker)),
            store,
            scheduler: ExecutionScheduler::new(strategy),
            config,
            event_handlers: Vec::new(),
        }
    }

    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&JobEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Box::new(handler));
    }

    fn emit(&self, event: JobEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    async fn transition(&self, graph: &mut JobGraph, id: &str, state: JobState) -> Result<()> {
        graph.set_state(id, state)?;
        if let Some(node) = graph.node(id) {
            self.store.save_job(&JobRecord::from_node(node)).await?;
        }
        Ok(())
    }

    /// Drive the graph to quiescence.
    ///
    /// Each pass launches every schedulable job, then waits for one
    /// completion; the loop ends when nothing is running and nothing can
    /// start. A failed job permanently blocks its dependents, so the
    /// store is left resumable rather than rolled back.
    pub async fn run(&self, graph: &mut JobGraph) -> Result<RunStatus> {
        let mut tasks: JoinSet<(String, Result<Vec<JobNode>, JobError>)> = JoinSet::new();

        loop {
            for id in self.scheduler.next_jobs(graph, tasks.len()) {
                self.transition(graph, &id, JobState::Running).await?;
                let node = graph
                    .node(&id)
                    .cloned()
                    .with_context(|| format!("job {id} missing from graph"))?;

                info!("starting {}", node.unit_name());
                self.emit(JobEvent::JobStarted {
                    id: id.clone(),
                    name: node.unit_name(),
                });

                let executor = Arc::clone(&self.executor);
                let config = Arc::clone(&self.config);
                tasks.spawn(async move {
                    let outcome = executor.execute(&node, &config).await;
                    (node.id, outcome)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let (id, outcome) = joined.context("job task panicked")?;

            match outcome {
                Ok(children) => {
                    // A resumed fan-out may rediscover children that are
                    // already in the graph; keep those and their states.
                    let fresh: Vec<JobNode> = children
                        .into_iter()
                        .filter(|c| graph.node(&c.id).is_none())
                        .collect();
                    if !fresh.is_empty() {
                        self.emit(JobEvent::FanOut {
                            id: id.clone(),
                            children: fresh.len(),
                        });
                    }
                    for child in fresh {
                        self.store.save_job(&JobRecord::from_node(&child)).await?;
                        graph.insert(child)?;
                    }
                    self.transition(graph, &id, JobState::Succeeded).await?;
                    self.emit(JobEvent::JobSucceeded { id });
                }
                Err(err) => {
                    let message = err.to_string();
                    error!("{} failed: {}", id, message);
                    self.transition(graph, &id, JobState::Failed { error: message.clone() })
                        .await?;
                    self.emit(JobEvent::JobFailed { id, error: message });
                }
            }
        }

        Ok(if graph.all_succeeded() {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        })
    }
}

/// Owns the lifecycle of a run against the job store: build-and-start
/// from scratch, or resume the persisted graph. The two modes are
/// mutually exclusive; a restart never rebuilds the graph.
pub struct RunController<I> {
    engine: ExecutionEngine<I>,
}

impl<I: ProcessInvoker + 'static> RunController<I> {
    pub fn new(
        invoker: I,
        store: Arc<dyn JobStore>,
        config: Arc<PipelineConfig>,
        strategy: SchedulingStrategy,
    ) -> Self {
        Self {
            engine: ExecutionEngine::new(invoker, store, config, strategy),
        }
    }

    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&JobEvent) + Send + Sync + 'static,
    {
        self.engine.add_event_handler(handler);
    }

    pub async fn run(&self, restart: bool) -> Result<RunStatus> {
        let mut run = if restart {
            let mut run = self
                .engine
                .store
                .load_run()
                .await?
                .context("job store has no recorded run to restart")?;
            run.status = RunStatus::Running;
            run.finished_at = None;
            run
        } else {
            RunRecord::started()
        };

        let mut graph = if restart {
            self.resume_graph().await?
        } else {
            self.fresh_graph().await?
        };

        self.engine.store.save_run(&run).await?;
        self.engine.emit(JobEvent::RunStarted {
            run_id: run.run_id,
            total_jobs: graph.len(),
        });
        info!(
            "run {} {} with {} jobs",
            run.run_id,
            if restart { "resumed" } else { "started" },
            graph.len()
        );

        let status = self.engine.run(&mut graph).await?;

        run.finish(status);
        self.engine.store.save_run(&run).await?;
        self.engine.emit(JobEvent::RunCompleted {
            run_id: run.run_id,
            status,
        });

        if status == RunStatus::Failed {
            for failed in graph.failed_jobs() {
                if let JobState::Failed { error } = &failed.state {
                    error!("{}: {}", failed.unit_name(), error);
                }
            }
        }

        Ok(status)
    }

    /// Build the fixed backbone and persist it before anything runs.
    async fn fresh_graph(&self) -> Result<JobGraph> {
        let existing = self.engine.store.load_jobs().await?;
        if !existing.is_empty() {
            bail!("job store already contains a run; pass --restart to resume it");
        }

        let graph = PipelineBuilder::build(&self.engine.config);
        for node in graph.iter() {
            self.engine.store.save_job(&JobRecord::from_node(node)).await?;
        }
        Ok(graph)
    }

    /// Reload the persisted graph, dynamic children included. Succeeded
    /// jobs stay done; interrupted and failed ones go back to pending.
    async fn resume_graph(&self) -> Result<JobGraph> {
        let records = self.engine.store.load_jobs().await?;
        if records.is_empty() {
            bail!("cannot restart an empty job store");
        }

        let mut graph = JobGraph::new();
        for record in records {
            let mut node = record.into_node();
            if !node.state.is_succeeded() {
                node.state = JobState::Pending;
                self.engine.store.save_job(&JobRecord::from_node(&node)).await?;
            }
            graph.insert(node)?;
        }
        Ok(graph)
    }
}
