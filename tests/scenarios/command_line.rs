//! Test: Command construction - fixed field order, omission, idempotence

use crate::helpers::*;
use caveman_runner::core::stage::Stage;
use caveman_runner::execution::build_arguments;

/// The whole argument list for a populated config, in the documented
/// order: fixed prefix, then set fields in enumerated order.
#[test]
fn test_full_argument_list() {
    let ws = workspace_with_contigs(&["chr21"]);
    let c = &*ws.config;

    let args = build_arguments(Stage::Setup, 1, 1, c);

    let display = |p: &std::path::Path| p.display().to_string();
    let expected = vec![
        "-process".to_string(),
        "setup".to_string(),
        "-index".to_string(),
        "1".to_string(),
        "-threads".to_string(),
        "1".to_string(),
        "-logs".to_string(),
        display(&c.clogs_dir()),
        "-species-assembly".to_string(),
        "GRCh37d5".to_string(),
        "-norm-cn-default".to_string(),
        "2".to_string(),
        "-normal-bam".to_string(),
        display(c.normal_bam.as_ref().unwrap()),
        "-outdir".to_string(),
        display(&c.outdir),
        "-reference".to_string(),
        display(c.reference.as_ref().unwrap()),
        "-seqType".to_string(),
        "genome".to_string(),
        "-species".to_string(),
        "Human".to_string(),
        "-tum-cn-default".to_string(),
        "2".to_string(),
        "-tumour-bam".to_string(),
        display(c.tumour_bam.as_ref().unwrap()),
    ];
    assert_eq!(args, expected);
}

/// Two invocations with the same inputs are byte-identical.
#[test]
fn test_command_construction_is_idempotent() {
    let ws = workspace_with_contigs(&["chr21"]);
    let first = build_arguments(Stage::Estep, 7, 2, &ws.config);
    let second = build_arguments(Stage::Estep, 7, 2, &ws.config);
    assert_eq!(first, second);
}

/// Empty values are omitted entirely, not forwarded as empty strings.
#[test]
fn test_empty_values_are_omitted() {
    let ws = workspace_with_contigs(&["chr21"]);
    let mut config = (*ws.config).clone();
    config.species = Some(String::new());
    config.normal_contamination = None;

    let args = build_arguments(Stage::Merge, 1, 1, &config);
    assert!(!args.contains(&"-species".to_string()));
    assert!(!args.contains(&"-normal-contamination".to_string()));
    assert!(!args.iter().any(|a| a.is_empty()));
}

/// The stage's process name and index are forwarded as given.
#[test]
fn test_stage_and_index_forwarding() {
    let ws = workspace_with_contigs(&["chr21"]);
    let args = build_arguments(Stage::MergeResults, 1, 4, &ws.config);
    assert_eq!(args[1], "merge_results");
    assert_eq!(args[5], "4");
}
