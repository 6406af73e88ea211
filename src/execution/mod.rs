//! Pipeline execution

pub mod cleanup;
pub mod engine;
pub mod executor;
pub mod invoker;
pub mod scheduler;

pub use cleanup::{remove_split_artifacts, DeleteOutcome};
pub use engine::{ExecutionEngine, JobEvent, RunController};
pub use executor::{JobError, JobExecutor};
pub use invoker::{build_arguments, CavemanInvoker, InvokeError, ProcessInvoker, CAVEMAN_BIN};
pub use scheduler::{ExecutionScheduler, SchedulingStrategy};
