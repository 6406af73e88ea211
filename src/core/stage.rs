//! Pipeline stage names and per-job resource requirements

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::config::{PipelineConfig, DEFAULT_MEMORY};

/// The nine fixed caveman.pl processes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Setup,
    Split,
    SplitConcat,
    Mstep,
    Merge,
    Estep,
    MergeResults,
    AddIds,
    Flag,
}

impl Stage {
    /// The exact string passed to `caveman.pl -process`.
    pub fn process_name(&self) -> &'static str {
        match self {
            Stage::Setup => "setup",
            Stage::Split => "split",
            Stage::SplitConcat => "split_concat",
            Stage::Mstep => "mstep",
            Stage::Merge => "merge",
            Stage::Estep => "estep",
            Stage::MergeResults => "merge_results",
            Stage::AddIds => "add_ids",
            Stage::Flag => "flag",
        }
    }

    /// Capitalized form used in job unit names, e.g. "CavemanSplitConcat".
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Setup => "CavemanSetup",
            Stage::Split => "CavemanSplit",
            Stage::SplitConcat => "CavemanSplitConcat",
            Stage::Mstep => "CavemanMstep",
            Stage::Merge => "CavemanMerge",
            Stage::Estep => "CavemanEstep",
            Stage::MergeResults => "CavemanMergeResults",
            Stage::AddIds => "CavemanAddIds",
            Stage::Flag => "CavemanFlag",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.process_name())
    }
}

/// Resource requirements a job declares to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Memory budget, e.g. "5G".
    pub memory: String,

    /// Cores; forwarded to the tool as `-threads`.
    pub cores: u32,

    /// Wall-clock budget in seconds. None means uncapped.
    pub runtime_secs: Option<u64>,
}

impl Resources {
    /// All jobs are short low-memory jobs unless otherwise specified;
    /// the flag stage runs long and carries no runtime cap.
    pub fn for_stage(stage: Stage, config: &PipelineConfig) -> Self {
        Resources {
            memory: config
                .max_memory
                .clone()
                .unwrap_or_else(|| DEFAULT_MEMORY.to_string()),
            cores: 1,
            runtime_secs: match stage {
                Stage::Flag => None,
                _ => Some(config.short_job_secs),
            },
        }
    }
}
