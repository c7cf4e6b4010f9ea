//! Stage failure taxonomy for the run pipeline
//!
//! Every stage of a run reports failure through one of these variants. The
//! orchestrator maps them onto its hard-stop/soft-failure policy: launch,
//! collection, packaging, and publication errors abort the run; notification
//! errors only produce a warning because the bundle is already published.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the stages of a run
#[derive(Error, Debug)]
pub enum StageError {
    /// The pool launcher process could not be started at all
    #[error("failed to start pool launcher '{command}': {source}")]
    LaunchFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The worker pool ran but exited non-zero; its output was still captured
    #[error("worker pool exited with status {code:?}")]
    WorkerFailure { code: Option<i32> },

    /// The worker pool exceeded the configured wall-clock limit and was killed
    #[error("worker pool timed out after {seconds}s")]
    WorkerTimeout { seconds: u64 },

    /// The captured pool output could not be written to the log artifact
    #[error("failed to write run log '{name}': {source}")]
    LogWriteFailure {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// An expected shared or per-worker artifact is absent or unreadable
    #[error("missing artifact '{name}'{}", rank_suffix(.rank))]
    ArtifactMissing { name: String, rank: Option<usize> },

    /// Archive construction failed
    #[error("failed to package '{name}' into archive: {source}")]
    PackagingFailure {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The destination directory for this run identifier already exists
    #[error("destination '{}' already exists; refusing to overwrite a published run", .path.display())]
    DestinationConflict { path: PathBuf },

    /// The copy sequence into the staging directory failed partway
    #[error("failed to publish '{name}': {source}")]
    PublishFailure {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Credential resolution, message composition, or SMTP transmission failed
    #[error("notification failed: {0}")]
    NotificationFailure(String),
}

fn rank_suffix(rank: &Option<usize>) -> String {
    match rank {
        Some(r) => format!(" for worker rank {}", r),
        None => String::new(),
    }
}

impl StageError {
    /// True for failures the orchestrator treats as best-effort rather than fatal
    pub fn is_soft(&self) -> bool {
        matches!(self, StageError::NotificationFailure(_))
    }
}

/// Result type for stage operations
pub type StageResult<T> = std::result::Result<T, StageError>;
