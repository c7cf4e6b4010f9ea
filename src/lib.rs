//! optrun - Distributed optimization run orchestrator
//!
//! optrun drives one distributed optimization run end to end: it launches a
//! fixed-size pool of cooperating worker processes, waits for them to converge,
//! collects each worker's partial output, packs everything into a single result
//! bundle, and publishes that bundle under a unique run identifier. Optionally
//! it emails a summary of the result to a configured recipient.
//!
//! # Architecture
//!
//! - **Pluggable pool launchers**: MPI subprocess fan-out today, swappable via trait
//! - **Artifact collection**: validates shared and per-worker outputs before packing
//! - **Atomic publication**: results are staged and renamed into the shared root
//! - **Batch mode**: a line-oriented trigger file queues multiple runs

pub mod artifact;
pub mod bundle;
pub mod config;
pub mod error;
pub mod launcher;
pub mod notify;
pub mod orchestrator;
pub mod publish;
pub mod records;
pub mod util;

// Re-export commonly used types
pub use config::RunRequest;
pub use error::StageError;
pub use orchestrator::{Orchestrator, RunOutcome};

/// Result type used throughout optrun
pub type Result<T> = anyhow::Result<T>;
