//! caveman.pl subprocess invocation

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::config::{PipelineConfig, ARGUMENTS};
use crate::core::stage::Stage;

/// The external tool binary, resolved through PATH.
pub const CAVEMAN_BIN: &str = "caveman.pl";

/// Failure to run the external tool.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} exited with code {code}: {stderr}")]
    Exit {
        stage: Stage,
        code: i32,
        stderr: String,
    },
}

/// Executes one pipeline stage as an external process.
///
/// The engine is generic over this trait so tests can substitute a mock
/// that records invocations and fakes the tool's file side effects.
#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    async fn invoke(
        &self,
        stage: Stage,
        index: u32,
        threads: u32,
        config: &PipelineConfig,
    ) -> Result<(), InvokeError>;
}

/// Build the full argument list for one invocation.
///
/// Fixed prefix (`-process/-index/-threads/-logs`) followed by one
/// `-<name> <value>` pair per set configuration field, iterated in the
/// enumerated [`ARGUMENTS`] order. Deterministic: identical inputs yield
/// byte-identical lists.
pub fn build_arguments(
    stage: Stage,
    index: u32,
    threads: u32,
    config: &PipelineConfig,
) -> Vec<String> {
    let mut args = vec![
        "-process".to_string(),
        stage.process_name().to_string(),
        "-index".to_string(),
        index.to_string(),
        "-threads".to_string(),
        threads.to_string(),
        "-logs".to_string(),
        config.clogs_dir().display().to_string(),
    ];

    for (name, accessor) in ARGUMENTS {
        if let Some(value) = accessor(config) {
            if !value.is_empty() {
                args.push(format!("-{name}"));
                args.push(value);
            }
        }
    }

    args
}

/// Invoker that shells out to the real caveman.pl.
#[derive(Debug, Clone)]
pub struct CavemanInvoker {
    binary: String,
}

impl CavemanInvoker {
    pub fn new() -> Self {
        CavemanInvoker {
            binary: CAVEMAN_BIN.to_string(),
        }
    }

    /// Override the binary path, e.g. for a containerized wrapper.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        CavemanInvoker {
            binary: binary.into(),
        }
    }
}

impl Default for CavemanInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessInvoker for CavemanInvoker {
    async fn invoke(
        &self,
        stage: Stage,
        index: u32,
        threads: u32,
        config: &PipelineConfig,
    ) -> Result<(), InvokeError> {
        let args = build_arguments(stage, index, threads, config);
        debug!("{} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(&config.outdir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| InvokeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            warn!("{} {} exited with code {}: {}", stage, index, code, stderr);
            return Err(InvokeError::Exit {
                stage,
                code,
                stderr,
            });
        }

        Ok(())
    }
}
