//! Test: Fan-out - dynamic child discovery from reference index and splitList

use crate::helpers::*;
use caveman_runner::core::job::{FanOutSource, JobNode, JobSpec};
use caveman_runner::core::stage::Stage;
use caveman_runner::execution::{JobError, JobExecutor};

fn fan_out_node(id: &str, stage: Stage, source: FanOutSource) -> JobNode {
    JobNode::new(id, JobSpec::FanOut { stage, source })
}

/// K non-blank reference lines produce exactly K split children, 1..K.
#[tokio::test]
async fn test_reference_fanout_creates_one_child_per_contig() {
    let ws = workspace_with_contigs(&["chr1", "chr2", "", "chr3"]);
    let executor = JobExecutor::new(MockInvoker::new());

    let node = fan_out_node("split", Stage::Split, FanOutSource::ReferenceIndex);
    let children = executor.execute(&node, &ws.config).await.unwrap();

    assert_eq!(children.len(), 3);
    for (ix, child) in children.iter().enumerate() {
        assert_eq!(child.id, format!("split.{}", ix + 1));
        assert_eq!(child.parent.as_deref(), Some("split"));
        assert!(matches!(
            child.spec,
            JobSpec::Stage {
                stage: Stage::Split,
                ..
            }
        ));
    }
}

/// Blank-only reference yields zero children and the job still succeeds.
#[tokio::test]
async fn test_empty_reference_fanout_succeeds_with_no_children() {
    let ws = workspace_with_contigs(&["", ""]);
    let executor = JobExecutor::new(MockInvoker::new());

    let node = fan_out_node("split", Stage::Split, FanOutSource::ReferenceIndex);
    let children = executor.execute(&node, &ws.config).await.unwrap();

    assert!(children.is_empty());
}

/// M manifest entries produce M mstep children at indices 1..M.
#[tokio::test]
async fn test_split_list_fanout_counts_non_blank_lines() {
    let ws = workspace_with_contigs(&["chr1"]);
    std::fs::create_dir_all(ws.config.tmp_dir()).unwrap();
    std::fs::write(ws.config.split_list(), "a\n\nb\n   \nc\nd\n").unwrap();

    let executor = JobExecutor::new(MockInvoker::new());
    let node = fan_out_node("mstep", Stage::Mstep, FanOutSource::SplitList);
    let children = executor.execute(&node, &ws.config).await.unwrap();

    let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["mstep.1", "mstep.2", "mstep.3", "mstep.4"]);
}

/// An empty manifest is not an error; the pipeline just has no parallel
/// work for that stage.
#[tokio::test]
async fn test_empty_split_list_fanout_succeeds() {
    let ws = workspace_with_contigs(&["chr1"]);
    std::fs::create_dir_all(ws.config.tmp_dir()).unwrap();
    std::fs::write(ws.config.split_list(), "").unwrap();

    let executor = JobExecutor::new(MockInvoker::new());
    let node = fan_out_node("estep", Stage::Estep, FanOutSource::SplitList);
    let children = executor.execute(&node, &ws.config).await.unwrap();

    assert!(children.is_empty());
}

/// A missing manifest fails the fan-out job; no partial fan-out happens.
#[tokio::test]
async fn test_missing_split_list_is_fatal() {
    let ws = workspace_with_contigs(&["chr1"]);

    let executor = JobExecutor::new(MockInvoker::new());
    let node = fan_out_node("mstep", Stage::Mstep, FanOutSource::SplitList);
    let err = executor.execute(&node, &ws.config).await.unwrap_err();

    match err {
        JobError::FanOutSource { path, .. } => {
            assert_eq!(path, ws.config.split_list());
        }
        other => panic!("expected FanOutSource error, got {other:?}"),
    }
}
