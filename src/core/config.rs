//! Pipeline configuration forwarded to caveman.pl

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default per-job memory when no global override is given.
pub const DEFAULT_MEMORY: &str = "5G";

/// Default runtime budget (seconds) for short jobs.
pub const DEFAULT_SHORT_JOB_SECS: u64 = 90;

/// Configuration for one pipeline run.
///
/// One field per caveman.pl argument, plus the two orchestration-only
/// settings (`max_memory`, `short_job_secs`). Constructed once from the
/// parsed CLI, validated, then shared read-only across every job.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub annot_bed_files: Option<PathBuf>,
    pub species_assembly: Option<String>,
    pub flag_bed_files: Option<PathBuf>,
    pub flag_config: Option<PathBuf>,
    pub flag_to_vcf_config: Option<PathBuf>,
    pub germline_indel: Option<PathBuf>,
    pub ignore_file: Option<PathBuf>,
    pub norm_cn_default: Option<String>,
    pub normal_bam: Option<PathBuf>,
    pub normal_cn: Option<PathBuf>,
    pub normal_contamination: Option<String>,
    pub normal_protocol: Option<String>,

    /// Output directory; also the working directory of every invocation.
    pub outdir: PathBuf,

    /// Reference index (`.fai`) file; drives the split fan-out.
    pub reference: Option<PathBuf>,

    pub seq_type: Option<String>,
    pub species: Option<String>,
    pub tum_cn_default: Option<String>,
    pub tumour_bam: Option<PathBuf>,
    pub tumour_cn: Option<PathBuf>,
    pub tumour_protocol: Option<String>,
    pub unmatched_vcf: Option<PathBuf>,

    /// Global memory override for every job, e.g. "1G", "1000M".
    pub max_memory: Option<String>,

    /// Runtime budget of short jobs, in seconds.
    pub short_job_secs: u64,
}

type FieldAccessor = fn(&PipelineConfig) -> Option<String>;

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.display().to_string())
}

/// The fixed, ordered table of caveman.pl arguments.
///
/// Names are forwarded verbatim (prefixed with `-`), so the iteration
/// order here is the on-the-wire argument order of every invocation.
pub const ARGUMENTS: &[(&str, FieldAccessor)] = &[
    ("annot-bed-files", |c| path_value(&c.annot_bed_files)),
    ("species-assembly", |c| c.species_assembly.clone()),
    ("flag-bed-files", |c| path_value(&c.flag_bed_files)),
    ("flagConfig", |c| path_value(&c.flag_config)),
    ("flagToVcfConfig", |c| path_value(&c.flag_to_vcf_config)),
    ("germline-indel", |c| path_value(&c.germline_indel)),
    ("ignore-file", |c| path_value(&c.ignore_file)),
    ("norm-cn-default", |c| c.norm_cn_default.clone()),
    ("normal-bam", |c| path_value(&c.normal_bam)),
    ("normal-cn", |c| path_value(&c.normal_cn)),
    ("normal-contamination", |c| c.normal_contamination.clone()),
    ("normal-protocol", |c| c.normal_protocol.clone()),
    ("outdir", |c| Some(c.outdir.display().to_string())),
    ("reference", |c| path_value(&c.reference)),
    ("seqType", |c| c.seq_type.clone()),
    ("species", |c| c.species.clone()),
    ("tum-cn-default", |c| c.tum_cn_default.clone()),
    ("tumour-bam", |c| path_value(&c.tumour_bam)),
    ("tumour-cn", |c| path_value(&c.tumour_cn)),
    ("tumour-protocol", |c| c.tumour_protocol.clone()),
    ("unmatched-vcf", |c| path_value(&c.unmatched_vcf)),
];

/// Configuration problems caught before any job is created.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required option --{0}")]
    Missing(&'static str),

    #[error("reference {0} must end in .fai")]
    ReferenceIndexSuffix(PathBuf),

    #[error("{0} should be an existing file")]
    MissingBamIndex(PathBuf),
}

impl PipelineConfig {
    /// Check the run is viable before building the job graph.
    ///
    /// The reference must be the `.fai` index (not the fasta itself) and
    /// both BAMs must carry a sibling `.bai` index.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reference = self
            .reference
            .as_ref()
            .ok_or(ConfigError::Missing("reference"))?;
        if reference.extension().and_then(|e| e.to_str()) != Some("fai") {
            return Err(ConfigError::ReferenceIndexSuffix(reference.clone()));
        }

        let tumour = self
            .tumour_bam
            .as_ref()
            .ok_or(ConfigError::Missing("tumour-bam"))?;
        validate_bam(tumour)?;

        let normal = self
            .normal_bam
            .as_ref()
            .ok_or(ConfigError::Missing("normal-bam"))?;
        validate_bam(normal)?;

        Ok(())
    }

    /// Intermediate directory caveman.pl writes per-contig artifacts to.
    pub fn tmp_dir(&self) -> PathBuf {
        self.outdir.join("tmpCaveman")
    }

    /// The splitList manifest produced by split_concat.
    pub fn split_list(&self) -> PathBuf {
        self.tmp_dir().join("splitList")
    }

    /// Directory caveman.pl is told to write its own logs to.
    pub fn clogs_dir(&self) -> PathBuf {
        self.outdir.join("clogs")
    }
}

fn validate_bam(bam: &Path) -> Result<(), ConfigError> {
    let mut index = bam.as_os_str().to_os_string();
    index.push(".bai");
    let index = PathBuf::from(index);
    if !index.is_file() {
        return Err(ConfigError::MissingBamIndex(index));
    }
    Ok(())
}
