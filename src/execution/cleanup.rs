//! Removal of non-primary-contig split artifacts
//!
//! Results for decoy/non-standard contigs must not reach the merge
//! stages, so their splitList fragments are deleted between the split
//! fan-out and split_concat.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::RegexSet;
use tracing::{debug, info};

/// What happened to one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    /// Already gone; a race with another process, not an error.
    Absent,
    /// Could not be deleted; logged and ignored.
    Denied,
}

/// The four artifact classes that are never merged: GL-prefixed and
/// hs-prefixed contigs, the mitochondrial contig, and NC-prefixed decoys.
fn artifact_patterns() -> &'static RegexSet {
    static PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        RegexSet::new([
            r"^splitList\.GL",
            r"^splitList\.hs",
            r"^splitList\.MT$",
            r"^splitList\.NC",
        ])
        .expect("artifact patterns are valid")
    })
}

/// Delete matching files under `<outdir>/tmpCaveman`, best-effort.
///
/// Never fails: a missing directory yields no outcomes, and per-file
/// errors are folded into the returned outcomes.
pub async fn remove_split_artifacts(outdir: &Path) -> Vec<(PathBuf, DeleteOutcome)> {
    let tmpdir = outdir.join("tmpCaveman");
    let mut outcomes = Vec::new();

    let mut entries = match tokio::fs::read_dir(&tmpdir).await {
        Ok(entries) => entries,
        Err(err) => {
            debug!("no split artifacts to clean under {}: {}", tmpdir.display(), err);
            return outcomes;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !artifact_patterns().is_match(name) {
            continue;
        }

        let path = entry.path();
        let outcome = match tokio::fs::remove_file(&path).await {
            Ok(()) => DeleteOutcome::Removed,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DeleteOutcome::Absent,
            Err(err) => {
                info!("could not remove {}: {}", path.display(), err);
                DeleteOutcome::Denied
            }
        };
        outcomes.push((path, outcome));
    }

    outcomes
}
