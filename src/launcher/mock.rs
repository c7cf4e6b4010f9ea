//! Mock pool launcher for testing
//!
//! Simulates a worker pool without starting any processes, making
//! orchestration tests fast and deterministic. The mock can be scripted to
//! produce output text, an exit code, and the worker artifacts a real pool
//! would leave in the working directory. Launch calls are recorded so tests
//! can assert on the argument vector the orchestrator built.

use crate::error::{StageError, StageResult};
use crate::launcher::{LaunchOutcome, PoolLauncher};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Scriptable launcher that fakes a worker pool
pub struct MockLauncher {
    /// Directory where simulated worker artifacts are written
    work_dir: PathBuf,

    /// Text returned as the pool's combined output
    output: String,

    /// Exit code reported for the pool
    exit_code: Option<i32>,

    /// Files (name, contents) written to the working directory on launch
    produced_files: Vec<(String, Vec<u8>)>,

    /// When set, launch fails outright as if the binary were missing
    fail_to_spawn: bool,

    /// Recorded (pool_size, args) for every launch call
    calls: Mutex<Vec<(usize, Vec<String>)>>,
}

impl MockLauncher {
    pub fn new(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            output: "mock pool converged\n".to_string(),
            exit_code: Some(0),
            produced_files: Vec::new(),
            fail_to_spawn: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the combined output text the pool reports
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the pool's exit code
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Add a file the simulated pool writes into the working directory
    pub fn producing(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.produced_files.push((name.into(), contents.into()));
        self
    }

    /// Make launch fail as if the launcher binary were absent
    pub fn failing_to_spawn(mut self) -> Self {
        self.fail_to_spawn = true;
        self
    }

    /// Launch calls recorded so far
    pub fn calls(&self) -> Vec<(usize, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PoolLauncher for MockLauncher {
    fn launch(&self, pool_size: usize, args: &[String]) -> StageResult<LaunchOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((pool_size, args.to_vec()));

        if self.fail_to_spawn {
            return Err(StageError::LaunchFailure {
                command: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock spawn failure"),
            });
        }

        for (name, contents) in &self.produced_files {
            fs::write(self.work_dir.join(name), contents).map_err(|source| {
                StageError::LaunchFailure {
                    command: "mock".to_string(),
                    source,
                }
            })?;
        }

        Ok(LaunchOutcome {
            combined_output: self.output.clone(),
            exit_code: self.exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_writes_scripted_files_and_records_call() {
        let dir = TempDir::new().unwrap();
        let launcher = MockLauncher::new(dir.path().to_path_buf())
            .producing("repr.txt", "NACA-ish")
            .with_output("done\n");

        let outcome = launcher.launch(4, &["1.0".to_string()]).unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.combined_output, "done\n");
        assert!(dir.path().join("repr.txt").exists());
        assert_eq!(launcher.calls(), vec![(4, vec!["1.0".to_string()])]);
    }

    #[test]
    fn test_mock_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let launcher = MockLauncher::new(dir.path().to_path_buf()).failing_to_spawn();
        assert!(matches!(
            launcher.launch(1, &[]).unwrap_err(),
            StageError::LaunchFailure { .. }
        ));
    }
}
