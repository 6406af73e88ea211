//! Test: Cleanup - best-effort removal of non-primary-contig artifacts

use crate::helpers::*;
use caveman_runner::core::job::{JobNode, JobSpec};
use caveman_runner::execution::{remove_split_artifacts, DeleteOutcome, JobExecutor};

fn seed_tmp_caveman(ws: &TestWorkspace, names: &[&str]) {
    let tmp = ws.config.tmp_dir();
    std::fs::create_dir_all(&tmp).unwrap();
    for name in names {
        std::fs::write(tmp.join(name), b"fragment").unwrap();
    }
}

/// Only the four documented classes are deleted; primary contigs and the
/// concatenated manifest survive.
#[tokio::test]
async fn test_removes_exactly_the_documented_patterns() {
    let ws = workspace_with_contigs(&["chr21"]);
    seed_tmp_caveman(
        &ws,
        &[
            "splitList.GL000207.1",
            "splitList.hs37d5",
            "splitList.MT",
            "splitList.NC_007605",
            "splitList.1",
            "splitList.X",
            "splitList",
        ],
    );

    let outcomes = remove_split_artifacts(&ws.config.outdir).await;
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|(_, o)| *o == DeleteOutcome::Removed));

    let tmp = ws.config.tmp_dir();
    assert!(!tmp.join("splitList.GL000207.1").exists());
    assert!(!tmp.join("splitList.hs37d5").exists());
    assert!(!tmp.join("splitList.MT").exists());
    assert!(!tmp.join("splitList.NC_007605").exists());
    assert!(tmp.join("splitList.1").exists());
    assert!(tmp.join("splitList.X").exists());
    assert!(tmp.join("splitList").exists());
}

/// Cleaning an already-clean directory is a quiet no-op.
#[tokio::test]
async fn test_repeated_cleanup_succeeds() {
    let ws = workspace_with_contigs(&["chr21"]);
    seed_tmp_caveman(&ws, &["splitList.MT", "splitList.1"]);

    let first = remove_split_artifacts(&ws.config.outdir).await;
    assert_eq!(first.len(), 1);

    let second = remove_split_artifacts(&ws.config.outdir).await;
    assert!(second.is_empty());
    assert!(ws.config.tmp_dir().join("splitList.1").exists());
}

/// No tmpCaveman directory at all still succeeds with no outcomes.
#[tokio::test]
async fn test_missing_tmp_dir_is_not_an_error() {
    let ws = workspace_with_contigs(&["chr21"]);
    let outcomes = remove_split_artifacts(&ws.config.outdir).await;
    assert!(outcomes.is_empty());
}

/// The cleanup job node itself never fails and attaches no children.
#[tokio::test]
async fn test_cleanup_job_succeeds() {
    let ws = workspace_with_contigs(&["chr21"]);
    seed_tmp_caveman(&ws, &["splitList.GL000191.1"]);

    let executor = JobExecutor::new(MockInvoker::new());
    let node = JobNode::new("cleanup", JobSpec::Cleanup);
    let children = executor.execute(&node, &ws.config).await.unwrap();

    assert!(children.is_empty());
    assert!(!ws.config.tmp_dir().join("splitList.GL000191.1").exists());
}
