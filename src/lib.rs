//! caveman-runner - fork-join orchestration of the cgpCaVEMan pipeline

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, FanOutSource, JobGraph, JobNode, JobSpec, JobState, PipelineBuilder,
    PipelineConfig, Resources, RunStatus, Stage,
};
pub use crate::execution::{
    build_arguments, CavemanInvoker, DeleteOutcome, ExecutionEngine, InvokeError, JobError,
    JobEvent, JobExecutor, ProcessInvoker, RunController, SchedulingStrategy,
};
pub use crate::persistence::{InMemoryJobStore, JobRecord, JobStore, RunRecord};

#[cfg(feature = "sqlite")]
pub use crate::persistence::SqliteJobStore;
