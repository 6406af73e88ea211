//! Core domain models
//!
//! The typed configuration forwarded to caveman.pl, the fixed stage set,
//! and the job graph the engine executes.

pub mod config;
pub mod graph;
pub mod job;
pub mod stage;

pub use config::{ConfigError, PipelineConfig, ARGUMENTS};
pub use graph::{GraphError, JobGraph, PipelineBuilder};
pub use job::{FanOutSource, JobNode, JobSpec, JobState, RunStatus};
pub use stage::{Resources, Stage};
