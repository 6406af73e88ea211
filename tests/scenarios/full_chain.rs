//! Test: Full chain - setup through flag with fan-out in between

use std::sync::Arc;

use crate::helpers::*;
use caveman_runner::core::job::{JobState, RunStatus};
use caveman_runner::core::stage::Stage;
use caveman_runner::persistence::InMemoryJobStore;

/// One contig, one manifest chunk: every stage runs exactly once, in
/// dependency order, and the flagged VCF appears in the output directory.
#[tokio::test]
async fn test_single_contig_chain() {
    let ws = workspace_with_contigs(&["chr21"]);
    let store = Arc::new(InMemoryJobStore::new());
    let invoker = MockInvoker::new().with_split_list_lines(1);
    let recorder = invoker.recorder();

    let status = run_pipeline(invoker, store.clone(), ws.config.clone(), false).await;
    assert_eq!(status, RunStatus::Completed);
    assert!(flagged_vcf(&ws.config.outdir).is_file());

    let calls = recorder.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (Stage::Setup, 1),
            (Stage::Split, 1),
            (Stage::SplitConcat, 1),
            (Stage::Mstep, 1),
            (Stage::Merge, 1),
            (Stage::Estep, 1),
            (Stage::MergeResults, 1),
            (Stage::AddIds, 1),
            (Stage::Flag, 1),
        ]
    );

    // 10 backbone nodes plus split.1, mstep.1, estep.1
    let states = job_states(store.as_ref()).await;
    assert_eq!(states.len(), 13);
    assert!(states.values().all(|s| *s == JobState::Succeeded));
}

/// Three contigs and two manifest chunks: children fan out in parallel
/// but never cross their fork-join barriers.
#[tokio::test]
async fn test_fanned_out_chain_respects_barriers() {
    let ws = workspace_with_contigs(&["chr1", "chr2", "chr3"]);
    let store = Arc::new(InMemoryJobStore::new());
    let invoker = MockInvoker::new().with_split_list_lines(2);
    let recorder = invoker.recorder();

    let status = run_pipeline(invoker, store.clone(), ws.config.clone(), false).await;
    assert_eq!(status, RunStatus::Completed);

    let calls = recorder.lock().unwrap().clone();
    let pos = |stage, index| call_position(&calls, stage, index);

    for index in 1..=3 {
        assert!(pos(Stage::Setup, 1) < pos(Stage::Split, index));
        assert!(pos(Stage::Split, index) < pos(Stage::SplitConcat, 1));
    }
    for index in 1..=2 {
        assert!(pos(Stage::SplitConcat, 1) < pos(Stage::Mstep, index));
        assert!(pos(Stage::Mstep, index) < pos(Stage::Merge, 1));
        assert!(pos(Stage::Merge, 1) < pos(Stage::Estep, index));
        assert!(pos(Stage::Estep, index) < pos(Stage::MergeResults, 1));
    }
    assert!(pos(Stage::MergeResults, 1) < pos(Stage::AddIds, 1));
    assert!(pos(Stage::AddIds, 1) < pos(Stage::Flag, 1));

    // 10 backbone + 3 split + 2 mstep + 2 estep
    assert_eq!(job_states(store.as_ref()).await.len(), 17);
}

/// A mid-chain failure halts scheduling of everything downstream.
#[tokio::test]
async fn test_failure_blocks_downstream_stages() {
    let ws = workspace_with_contigs(&["chr1"]);
    let store = Arc::new(InMemoryJobStore::new());
    let invoker = MockInvoker::new().failing_on(Stage::SplitConcat);
    let recorder = invoker.recorder();

    let status = run_pipeline(invoker, store.clone(), ws.config.clone(), false).await;
    assert_eq!(status, RunStatus::Failed);

    let calls = recorder.lock().unwrap().clone();
    assert!(calls.iter().all(|(stage, _)| !matches!(
        stage,
        Stage::Mstep | Stage::Merge | Stage::Estep | Stage::MergeResults | Stage::AddIds | Stage::Flag
    )));

    let states = job_states(store.as_ref()).await;
    assert!(matches!(states["split_concat"], JobState::Failed { .. }));
    assert_eq!(states["mstep"], JobState::Pending);
    assert_eq!(states["flag"], JobState::Pending);
    assert_eq!(states["setup"], JobState::Succeeded);
    assert!(!flagged_vcf(&ws.config.outdir).exists());
}
