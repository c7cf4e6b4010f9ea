//! Utility modules

pub mod run_id;

pub use run_id::RunId;
