//! Job domain model

use serde::{Deserialize, Serialize};

use crate::core::config::PipelineConfig;
use crate::core::stage::{Resources, Stage};

/// What a job does when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobSpec {
    /// Invoke caveman.pl for one stage at one 1-based index.
    Stage {
        stage: Stage,
        index: u32,
        resources: Resources,
    },

    /// Discover N work units from a file and attach N stage children.
    FanOut { stage: Stage, source: FanOutSource },

    /// Remove non-primary-contig split artifacts before concatenation.
    Cleanup,
}

/// Where a fan-out job discovers its work units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutSource {
    /// One child per non-blank line of the reference `.fai` index.
    ReferenceIndex,

    /// One child per non-blank line of `tmpCaveman/splitList`.
    SplitList,
}

/// Lifecycle of a single job node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed { error: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed { .. })
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, JobState::Succeeded)
    }
}

/// Overall status of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// One node of the job graph.
///
/// `follow_on` is the static "runs after me and all my descendants" edge;
/// `parent` links a dynamically created fan-out child back to its creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNode {
    pub id: String,
    pub spec: JobSpec,
    pub follow_on: Option<String>,
    pub parent: Option<String>,
    pub state: JobState,
}

impl JobNode {
    pub fn new(id: impl Into<String>, spec: JobSpec) -> Self {
        JobNode {
            id: id.into(),
            spec,
            follow_on: None,
            parent: None,
            state: JobState::Pending,
        }
    }

    /// A backbone job that invokes one stage at index 1.
    pub fn stage(stage: Stage, config: &PipelineConfig) -> Self {
        JobNode::new(
            stage.process_name(),
            JobSpec::Stage {
                stage,
                index: 1,
                resources: Resources::for_stage(stage, config),
            },
        )
    }

    /// A fan-out child for `stage` at a discovered 1-based index.
    pub fn stage_child(
        parent_id: &str,
        stage: Stage,
        index: u32,
        config: &PipelineConfig,
    ) -> Self {
        let mut node = JobNode::new(
            format!("{}.{}", stage.process_name(), index),
            JobSpec::Stage {
                stage,
                index,
                resources: Resources::for_stage(stage, config),
            },
        );
        node.parent = Some(parent_id.to_string());
        node
    }

    /// Human-readable unit name used in logs and events.
    pub fn unit_name(&self) -> String {
        match &self.spec {
            JobSpec::Stage { stage, index, .. } => {
                format!("{} {}", stage.display_name(), index)
            }
            JobSpec::FanOut { stage, .. } => {
                format!("{} scatter", stage.display_name())
            }
            JobSpec::Cleanup => "CavemanRemoveContigs".to_string(),
        }
    }
}
