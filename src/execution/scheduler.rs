//! Scheduler - selects which ready jobs to launch

use crate::core::graph::JobGraph;

/// How many ready jobs may run at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingStrategy {
    /// Launch every ready job immediately.
    Parallel,

    /// At most N concurrently running jobs.
    LimitedParallel(usize),
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::LimitedParallel(4)
    }
}

/// Picks the next batch of jobs to launch from the graph's ready set.
pub struct ExecutionScheduler {
    strategy: SchedulingStrategy,
}

impl ExecutionScheduler {
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self { strategy }
    }

    pub fn next_jobs(&self, graph: &JobGraph, running: usize) -> Vec<String> {
        let ready = graph.ready_jobs();
        match self.strategy {
            SchedulingStrategy::Parallel => ready,
            SchedulingStrategy::LimitedParallel(max) => {
                let slots = max.saturating_sub(running);
                ready.into_iter().take(slots).collect()
            }
        }
    }
}
