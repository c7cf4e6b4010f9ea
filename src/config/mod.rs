//! Configuration module
//!
//! Handles CLI argument parsing, TOML run-request files, the batch trigger
//! file, and validation of run parameters.

pub mod cli;
pub mod runfile;
pub mod toml;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Full parameter set for one optimization run
///
/// Immutable once handed to the orchestrator. Field defaults mirror the worker
/// program's contract; the positional argument order derived from these fields
/// is fixed and versioned (see `launcher::args`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Design lift coefficient the optimizer targets
    pub target_cl: f64,
    /// Number of shape coefficients for the chord line
    pub n_chord: usize,
    /// Number of shape coefficients for the thickness distribution
    pub n_thick: usize,
    /// Bits encoding each chord-line coefficient
    #[serde(default = "default_bits")]
    pub bits_chord: u32,
    /// Bits encoding each thickness coefficient
    #[serde(default = "default_bits")]
    pub bits_thick: u32,
    /// Bits encoding the trailing-edge thickness
    #[serde(default = "default_bits")]
    pub bits_te: u32,
    /// Number of generations for the genetic algorithm
    #[serde(default = "default_generations")]
    pub generations: u32,
    /// Keep the trailing-edge thickness fixed
    #[serde(default = "default_true")]
    pub fix_te: bool,
    /// Constrain the thickness distribution
    #[serde(default = "default_true")]
    pub constrain_thickness: bool,
    /// Constrain the cross-sectional area
    #[serde(default = "default_true")]
    pub constrain_area: bool,
    /// Constrain the moment coefficient
    #[serde(default = "default_true")]
    pub constrain_moment: bool,
    /// Maximum absolute moment coefficient; initial value is used when absent
    #[serde(default)]
    pub moment_ref: Option<f64>,
    /// Seed for the initial-population random number generator
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of worker processes in the pool
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Email the results when the run completes
    #[serde(default)]
    pub report: bool,
    /// Destination folder name; a UTC timestamp identifier is derived when absent
    #[serde(default)]
    pub output_folder: Option<String>,
}

fn default_bits() -> u32 {
    8
}

fn default_generations() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> usize {
    28
}

impl RunRequest {
    /// Validate the run request
    pub fn validate(&self) -> Result<(), String> {
        if self.pool_size == 0 {
            return Err("pool_size must be greater than 0".to_string());
        }
        if self.n_chord == 0 || self.n_thick == 0 {
            return Err("n_chord and n_thick must be greater than 0".to_string());
        }
        if self.bits_chord == 0 || self.bits_thick == 0 || self.bits_te == 0 {
            return Err("bit widths must be greater than 0".to_string());
        }
        if self.generations == 0 {
            return Err("generations must be greater than 0".to_string());
        }
        if let Some(ref folder) = self.output_folder {
            if folder.is_empty() {
                return Err("output_folder cannot be empty if specified".to_string());
            }
            if folder.contains('/') || folder.contains("..") {
                return Err(format!(
                    "output_folder must be a plain directory name, got '{}'",
                    folder
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for RunRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cl={}, coeffs={}x{}, bits={}/{}/{}, gen={}, pool={}",
            self.target_cl,
            self.n_chord,
            self.n_thick,
            self.bits_chord,
            self.bits_thick,
            self.bits_te,
            self.generations,
            self.pool_size
        )?;
        if let Some(seed) = self.seed {
            write!(f, ", seed={}", seed)?;
        }
        if self.report {
            write!(f, ", report")?;
        }
        if let Some(ref folder) = self.output_folder {
            write!(f, ", folder={}", folder)?;
        }
        Ok(())
    }
}

/// Fixed artifact names and run-scoped paths
///
/// The worker contract fixes the names of the files a run produces. They are
/// carried in an explicit struct, not process-wide globals, so every component
/// resolves paths against the same working directory and concurrent
/// orchestrations can each use their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Working directory the worker pool runs in and writes its outputs to
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Shared-results root under which bundles are published
    #[serde(default = "default_share_root")]
    pub share_root: PathBuf,
    /// Textual representation of the optimized result
    #[serde(default = "default_repr_file")]
    pub repr_file: String,
    /// Rendered image of the optimized result
    #[serde(default = "default_image_file")]
    pub image_file: String,
    /// Data table of the optimized result
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// Consolidated execution log written by the launcher
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Base name for per-worker database files, suffixed `_<rank>`
    #[serde(default = "default_worker_base")]
    pub worker_base: String,
    /// Name of the archive packing every per-worker file
    #[serde(default = "default_archive_file")]
    pub archive_file: String,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_share_root() -> PathBuf {
    PathBuf::from("share")
}

fn default_repr_file() -> String {
    "repr.txt".to_string()
}

fn default_image_file() -> String {
    "optimized.png".to_string()
}

fn default_data_file() -> String {
    "optimized.dat".to_string()
}

fn default_log_file() -> String {
    "log.txt".to_string()
}

fn default_worker_base() -> String {
    "log.sql".to_string()
}

fn default_archive_file() -> String {
    "log.sql.zip".to_string()
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            share_root: default_share_root(),
            repr_file: default_repr_file(),
            image_file: default_image_file(),
            data_file: default_data_file(),
            log_file: default_log_file(),
            worker_base: default_worker_base(),
            archive_file: default_archive_file(),
        }
    }
}

impl ArtifactConfig {
    /// All artifact paths are resolved against the working directory
    fn in_work_dir(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    pub fn repr_path(&self) -> PathBuf {
        self.in_work_dir(&self.repr_file)
    }

    pub fn image_path(&self) -> PathBuf {
        self.in_work_dir(&self.image_file)
    }

    pub fn data_path(&self) -> PathBuf {
        self.in_work_dir(&self.data_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.in_work_dir(&self.log_file)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.in_work_dir(&self.archive_file)
    }

    /// Name of the private output file for one worker rank
    pub fn worker_file_name(&self, rank: usize) -> String {
        format!("{}_{}", self.worker_base, rank)
    }

    /// Path of the private output file for one worker rank
    pub fn worker_path(&self, rank: usize) -> PathBuf {
        self.in_work_dir(&self.worker_file_name(rank))
    }

    /// Rebase the working directory and share root onto another directory
    pub fn rooted_at(mut self, dir: &Path) -> Self {
        self.share_root = dir.join(&self.share_root);
        self.work_dir = dir.to_path_buf();
        self
    }
}

/// Pool launcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Process-group launcher binary
    #[serde(default = "default_launcher_bin")]
    pub launcher_bin: String,
    /// Worker command the launcher fans out, e.g. `python3 problem.py`
    #[serde(default = "default_worker_cmd")]
    pub worker_cmd: Vec<String>,
    /// Wall-clock limit on the pool wait; unlimited when absent
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Enable debug output around pool launches
    #[serde(default)]
    pub debug: bool,
}

fn default_launcher_bin() -> String {
    "mpirun".to_string()
}

fn default_worker_cmd() -> Vec<String> {
    vec!["python3".to_string(), "problem.py".to_string()]
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            launcher_bin: default_launcher_bin(),
            worker_cmd: default_worker_cmd(),
            timeout_secs: None,
            debug: false,
        }
    }
}
