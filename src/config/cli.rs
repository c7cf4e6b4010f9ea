//! CLI argument parsing using clap

use crate::config::{ArtifactConfig, LauncherConfig, RunRequest};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Run mode (default) - execute a single optimization run
    Run,
    /// Batch mode - execute every run queued in the trigger file
    Batch,
}

/// optrun - Distributed optimization run orchestrator
#[derive(Parser, Debug)]
#[command(name = "optrun")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Execution mode: run or batch
    #[arg(long, value_enum, default_value = "run")]
    pub mode: ExecutionMode,

    /// TOML file supplying the run request (run mode; overrides parameter flags)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Batch trigger file, one JSON run request per line (batch mode)
    #[arg(long, default_value = "Runfile")]
    pub runfile: PathBuf,

    // === Run Parameters ===
    /// Design lift coefficient to target
    #[arg(long)]
    pub target_cl: Option<f64>,

    /// Number of shape coefficients for the chord line
    #[arg(long)]
    pub n_chord: Option<usize>,

    /// Number of shape coefficients for the thickness distribution
    #[arg(long)]
    pub n_thick: Option<usize>,

    /// Bits encoding each chord-line coefficient
    #[arg(long, default_value = "8")]
    pub bits_chord: u32,

    /// Bits encoding each thickness coefficient
    #[arg(long, default_value = "8")]
    pub bits_thick: u32,

    /// Bits encoding the trailing-edge thickness
    #[arg(long, default_value = "8")]
    pub bits_te: u32,

    /// Number of generations for the genetic algorithm
    #[arg(short = 'g', long, default_value = "100")]
    pub generations: u32,

    /// Let the trailing-edge thickness vary instead of fixing it
    #[arg(long)]
    pub free_te: bool,

    /// Disable the thickness constraint
    #[arg(long)]
    pub no_constrain_thickness: bool,

    /// Disable the area constraint
    #[arg(long)]
    pub no_constrain_area: bool,

    /// Disable the moment-coefficient constraint
    #[arg(long)]
    pub no_constrain_moment: bool,

    /// Maximum absolute moment coefficient (initial value used if omitted)
    #[arg(long)]
    pub moment_ref: Option<f64>,

    /// Seed for the initial-population random number generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of worker processes in the pool
    #[arg(short = 'n', long, default_value = "28")]
    pub pool_size: usize,

    /// Email the results when the run completes
    #[arg(long)]
    pub report: bool,

    /// Destination folder name (a UTC timestamp is derived when omitted)
    #[arg(short = 'o', long)]
    pub output_folder: Option<String>,

    // === Environment ===
    /// Working directory the worker pool runs in
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Shared-results root under which bundles are published
    #[arg(long)]
    pub share_root: Option<PathBuf>,

    /// Process-group launcher binary
    #[arg(long, default_value = "mpirun")]
    pub launcher_bin: String,

    /// Wall-clock limit on the pool wait, in seconds (unlimited when omitted)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// SMTP credentials file (overrides the SMTP_SETTINGS environment variable)
    #[arg(long)]
    pub smtp_settings: Option<PathBuf>,

    /// Validate and print the run request without launching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build a run request from the parameter flags
    ///
    /// Only meaningful in run mode without `--config`; the three required
    /// parameters must all be present.
    pub fn to_run_request(&self) -> crate::Result<RunRequest> {
        let target_cl = self
            .target_cl
            .ok_or_else(|| anyhow::anyhow!("--target-cl is required (or use --config)"))?;
        let n_chord = self
            .n_chord
            .ok_or_else(|| anyhow::anyhow!("--n-chord is required (or use --config)"))?;
        let n_thick = self
            .n_thick
            .ok_or_else(|| anyhow::anyhow!("--n-thick is required (or use --config)"))?;

        Ok(RunRequest {
            target_cl,
            n_chord,
            n_thick,
            bits_chord: self.bits_chord,
            bits_thick: self.bits_thick,
            bits_te: self.bits_te,
            generations: self.generations,
            fix_te: !self.free_te,
            constrain_thickness: !self.no_constrain_thickness,
            constrain_area: !self.no_constrain_area,
            constrain_moment: !self.no_constrain_moment,
            moment_ref: self.moment_ref,
            seed: self.seed,
            pool_size: self.pool_size,
            report: self.report,
            output_folder: self.output_folder.clone(),
        })
    }

    /// Build the artifact configuration from the environment flags
    pub fn to_artifact_config(&self) -> ArtifactConfig {
        let mut artifacts = ArtifactConfig::default();
        self.apply_paths(&mut artifacts);
        artifacts
    }

    /// Overlay the path flags onto an existing artifact configuration
    pub fn apply_paths(&self, artifacts: &mut ArtifactConfig) {
        if let Some(ref work_dir) = self.work_dir {
            artifacts.work_dir = work_dir.clone();
        }
        if let Some(ref share_root) = self.share_root {
            artifacts.share_root = share_root.clone();
        }
    }

    /// Build the launcher configuration from the environment flags
    pub fn to_launcher_config(&self) -> LauncherConfig {
        LauncherConfig {
            launcher_bin: self.launcher_bin.clone(),
            timeout_secs: self.timeout,
            debug: self.debug,
            ..LauncherConfig::default()
        }
    }
}
