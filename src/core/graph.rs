//! Job graph and the fixed pipeline backbone

use std::collections::HashMap;

use thiserror::Error;

use crate::core::config::PipelineConfig;
use crate::core::job::{FanOutSource, JobNode, JobSpec, JobState};
use crate::core::stage::Stage;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate job id {0}")]
    DuplicateJob(String),

    #[error("unknown job id {0}")]
    UnknownJob(String),
}

/// The set of job nodes plus follow-on and dynamic-child edges.
///
/// Built once per run; mutated only by fan-out jobs attaching children
/// during execution. Iteration order is insertion order so persisted
/// runs reload deterministically.
#[derive(Debug, Clone, Default)]
pub struct JobGraph {
    nodes: HashMap<String, JobNode>,
    order: Vec<String>,
}

impl JobGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: JobNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateJob(node.id));
        }
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&JobNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &JobNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Dynamic children of a fan-out node.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a JobNode> {
        self.iter().filter(move |n| n.parent.as_deref() == Some(id))
    }

    /// The node whose follow-on edge points at `id`, if any.
    fn predecessor(&self, id: &str) -> Option<&JobNode> {
        self.iter().find(|n| n.follow_on.as_deref() == Some(id))
    }

    /// A node and all of its dynamic children have succeeded.
    ///
    /// This is the fork-join gate: a follow-on becomes eligible only once
    /// its predecessor's whole subtree is done.
    pub fn subtree_succeeded(&self, id: &str) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        node.state.is_succeeded()
            && self.children(id).all(|c| self.subtree_succeeded(&c.id))
    }

    /// Pending jobs whose predecessor edges are all satisfied.
    pub fn ready_jobs(&self) -> Vec<String> {
        self.iter()
            .filter(|n| n.state == JobState::Pending)
            .filter(|n| self.is_eligible(n))
            .map(|n| n.id.clone())
            .collect()
    }

    fn is_eligible(&self, node: &JobNode) -> bool {
        // A dynamic child runs once its creator's own body has finished;
        // its siblings impose no ordering on it.
        if let Some(parent) = &node.parent {
            return self
                .nodes
                .get(parent)
                .map(|p| p.state.is_succeeded())
                .unwrap_or(false);
        }
        match self.predecessor(&node.id) {
            Some(pred) => self.subtree_succeeded(&pred.id),
            None => true,
        }
    }

    pub fn running_count(&self) -> usize {
        self.iter().filter(|n| n.state == JobState::Running).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.iter().all(|n| n.state.is_succeeded())
    }

    pub fn failed_jobs(&self) -> Vec<&JobNode> {
        self.iter()
            .filter(|n| matches!(n.state, JobState::Failed { .. }))
            .collect()
    }

    pub fn set_state(&mut self, id: &str, state: JobState) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownJob(id.to_string()))?;
        node.state = state;
        Ok(())
    }
}

/// Builds the fixed ten-node backbone:
/// setup → split (fan-out) → cleanup → split_concat → mstep (fan-out) →
/// merge → estep (fan-out) → merge_results → add_ids → flag.
pub struct PipelineBuilder;

impl PipelineBuilder {
    pub fn build(config: &PipelineConfig) -> JobGraph {
        let mut backbone = vec![
            JobNode::stage(Stage::Setup, config),
            JobNode::new(
                "split",
                JobSpec::FanOut {
                    stage: Stage::Split,
                    source: FanOutSource::ReferenceIndex,
                },
            ),
            JobNode::new("cleanup", JobSpec::Cleanup),
            JobNode::stage(Stage::SplitConcat, config),
            JobNode::new(
                "mstep",
                JobSpec::FanOut {
                    stage: Stage::Mstep,
                    source: FanOutSource::SplitList,
                },
            ),
            JobNode::stage(Stage::Merge, config),
            JobNode::new(
                "estep",
                JobSpec::FanOut {
                    stage: Stage::Estep,
                    source: FanOutSource::SplitList,
                },
            ),
            JobNode::stage(Stage::MergeResults, config),
            JobNode::stage(Stage::AddIds, config),
            JobNode::stage(Stage::Flag, config),
        ];

        for i in 0..backbone.len() - 1 {
            let next = backbone[i + 1].id.clone();
            backbone[i].follow_on = Some(next);
        }

        let mut graph = JobGraph::new();
        for node in backbone {
            // Backbone ids are distinct by construction.
            let _ = graph.insert(node);
        }
        graph
    }
}
