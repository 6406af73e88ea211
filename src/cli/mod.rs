//! Command-line interface

pub mod output;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::core::config::{PipelineConfig, DEFAULT_SHORT_JOB_SECS};

/// Run the cgpCaVEMan variant-calling pipeline.
///
/// Option names mirror caveman.pl's own arguments exactly, since values
/// are forwarded verbatim to every stage invocation.
#[derive(Debug, Parser, Clone)]
#[command(name = "caveman-runner")]
#[command(version)]
#[command(about = "Run the cgpCaVEMan variant-calling pipeline", long_about = None)]
pub struct Cli {
    /// Directory holding the persisted job store
    pub jobstore: PathBuf,

    /// Resume an interrupted run from its last checkpoint
    #[arg(long)]
    pub restart: bool,

    /// Output directory (also each stage's working directory)
    #[arg(long)]
    pub outdir: PathBuf,

    /// Reference index (.fai) file
    #[arg(long)]
    pub reference: Option<PathBuf>,

    #[arg(long = "tumour-bam")]
    pub tumour_bam: Option<PathBuf>,

    #[arg(long = "normal-bam")]
    pub normal_bam: Option<PathBuf>,

    #[arg(long = "annot-bed-files")]
    pub annot_bed_files: Option<PathBuf>,

    #[arg(long = "species-assembly")]
    pub species_assembly: Option<String>,

    #[arg(long = "flag-bed-files")]
    pub flag_bed_files: Option<PathBuf>,

    #[arg(long = "flagConfig")]
    pub flag_config: Option<PathBuf>,

    #[arg(long = "flagToVcfConfig")]
    pub flag_to_vcf_config: Option<PathBuf>,

    #[arg(long = "germline-indel")]
    pub germline_indel: Option<PathBuf>,

    #[arg(long = "ignore-file")]
    pub ignore_file: Option<PathBuf>,

    #[arg(long = "norm-cn-default")]
    pub norm_cn_default: Option<String>,

    #[arg(long = "normal-cn")]
    pub normal_cn: Option<PathBuf>,

    #[arg(long = "normal-contamination")]
    pub normal_contamination: Option<String>,

    #[arg(long = "normal-protocol")]
    pub normal_protocol: Option<String>,

    #[arg(long = "seqType")]
    pub seq_type: Option<String>,

    #[arg(long)]
    pub species: Option<String>,

    #[arg(long = "tum-cn-default")]
    pub tum_cn_default: Option<String>,

    #[arg(long = "tumour-cn")]
    pub tumour_cn: Option<PathBuf>,

    #[arg(long = "tumour-protocol")]
    pub tumour_protocol: Option<String>,

    #[arg(long = "unmatched-vcf")]
    pub unmatched_vcf: Option<PathBuf>,

    /// Max ram usage of any job, e.g. 1G, 1000M
    #[arg(long = "max-memory-usage")]
    pub max_memory_usage: Option<String>,

    /// Runtime budget of short jobs, in seconds
    #[arg(long = "short-job", default_value_t = DEFAULT_SHORT_JOB_SECS)]
    pub short_job: u64,

    /// Max concurrently running jobs
    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Build the shared run configuration, absolutizing every path.
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            annot_bed_files: self.annot_bed_files.as_deref().map(absolutize),
            species_assembly: self.species_assembly.clone(),
            flag_bed_files: self.flag_bed_files.as_deref().map(absolutize),
            flag_config: self.flag_config.as_deref().map(absolutize),
            flag_to_vcf_config: self.flag_to_vcf_config.as_deref().map(absolutize),
            germline_indel: self.germline_indel.as_deref().map(absolutize),
            ignore_file: self.ignore_file.as_deref().map(absolutize),
            norm_cn_default: self.norm_cn_default.clone(),
            normal_bam: self.normal_bam.as_deref().map(absolutize),
            normal_cn: self.normal_cn.as_deref().map(absolutize),
            normal_contamination: self.normal_contamination.clone(),
            normal_protocol: self.normal_protocol.clone(),
            outdir: absolutize(&self.outdir),
            reference: self.reference.as_deref().map(absolutize),
            seq_type: self.seq_type.clone(),
            species: self.species.clone(),
            tum_cn_default: self.tum_cn_default.clone(),
            tumour_bam: self.tumour_bam.as_deref().map(absolutize),
            tumour_cn: self.tumour_cn.as_deref().map(absolutize),
            tumour_protocol: self.tumour_protocol.clone(),
            unmatched_vcf: self.unmatched_vcf.as_deref().map(absolutize),
            max_memory: self.max_memory_usage.clone(),
            short_job_secs: self.short_job,
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
