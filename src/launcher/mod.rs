//! Worker-pool launch abstraction
//!
//! A run's workers execute as N cooperating OS processes started by a
//! process-group launcher (MPI today). Their internal coordination protocol is
//! opaque to the orchestrator; the only synchronization point is "block until
//! the whole pool has exited". The `PoolLauncher` trait keeps the launch
//! mechanism pluggable so local fan-out, containerized fan-out, or a cluster
//! scheduler can be substituted without touching the orchestrator.

pub mod args;
pub mod mock;
pub mod mpi;

pub use mpi::MpiPoolLauncher;

use crate::error::StageResult;

/// Outcome of one worker-pool launch
///
/// The combined stdout/stderr stream is captured even when the pool exits
/// non-zero so the log artifact can always be written.
#[derive(Debug, Clone)]
pub struct LaunchOutcome {
    /// Combined stdout + stderr of the launcher and all workers
    pub combined_output: String,
    /// Exit code of the pool launcher, if the process exited normally
    pub exit_code: Option<i32>,
}

impl LaunchOutcome {
    /// True if the whole pool exited cleanly
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launch backend for a cooperating worker pool
///
/// Implementations start exactly `pool_size` workers sharing one positional
/// argument vector, block until the pool has fully exited, and capture its
/// combined output as a single text blob.
pub trait PoolLauncher {
    /// Start the pool and wait for it to exit
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailure` if the launcher process cannot be started at
    /// all, and `WorkerTimeout` if a configured wall-clock limit expires. A
    /// non-zero pool exit is not an error here; callers inspect
    /// `LaunchOutcome::success` so the output can still be logged.
    fn launch(&self, pool_size: usize, args: &[String]) -> StageResult<LaunchOutcome>;
}
