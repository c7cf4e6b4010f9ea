//! MPI subprocess launch backend
//!
//! Fans the worker pool out with `mpirun -np N <worker command> <args...>` in
//! the run's working directory. Stdout and stderr share a single pipe so the
//! captured blob keeps the pool's actual output order. An optional wall-clock
//! limit escalates SIGTERM then SIGKILL; without one the wait is unbounded.

use crate::config::LauncherConfig;
use crate::error::{StageError, StageResult};
use crate::launcher::{LaunchOutcome, PoolLauncher};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Grace period between SIGTERM and SIGKILL on timeout
const TERM_GRACE: Duration = Duration::from_secs(5);

/// Interval at which the pool wait polls for exit
const WAIT_POLL: Duration = Duration::from_millis(100);

/// Process-group pool launcher backed by mpirun
pub struct MpiPoolLauncher {
    config: LauncherConfig,
    work_dir: PathBuf,
}

impl MpiPoolLauncher {
    pub fn new(config: LauncherConfig, work_dir: PathBuf) -> Self {
        Self { config, work_dir }
    }

    fn command_line(&self, pool_size: usize, args: &[String]) -> String {
        let mut parts = vec![
            self.config.launcher_bin.clone(),
            "-np".to_string(),
            pool_size.to_string(),
        ];
        parts.extend(self.config.worker_cmd.iter().cloned());
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }

    /// Wait for pool exit, enforcing the configured wall-clock limit
    fn wait_with_timeout(&self, child: &mut Child) -> StageResult<ExitStatus> {
        let deadline = self
            .config
            .timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        loop {
            if let Some(status) = child.try_wait().map_err(|source| StageError::LaunchFailure {
                command: self.config.launcher_bin.clone(),
                source,
            })? {
                return Ok(status);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    self.terminate(child);
                    return Err(StageError::WorkerTimeout {
                        seconds: self.config.timeout_secs.unwrap_or(0),
                    });
                }
            }

            thread::sleep(WAIT_POLL);
        }
    }

    /// SIGTERM the launcher, wait out the grace period, then SIGKILL
    fn terminate(&self, child: &mut Child) {
        unsafe {
            libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
        }
        let grace_end = Instant::now() + TERM_GRACE;
        while Instant::now() < grace_end {
            if matches!(child.try_wait(), Ok(Some(_))) {
                return;
            }
            thread::sleep(WAIT_POLL);
        }
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl PoolLauncher for MpiPoolLauncher {
    fn launch(&self, pool_size: usize, args: &[String]) -> StageResult<LaunchOutcome> {
        if self.config.debug {
            eprintln!("DEBUG: launching pool: {}", self.command_line(pool_size, args));
        }

        // Both streams write to the same pipe so the captured log keeps the
        // order the pool actually produced
        let (mut reader, writer) = io::pipe().map_err(|source| StageError::LaunchFailure {
            command: self.command_line(pool_size, args),
            source,
        })?;
        let writer_err = writer
            .try_clone()
            .map_err(|source| StageError::LaunchFailure {
                command: self.command_line(pool_size, args),
                source,
            })?;

        let mut command = Command::new(&self.config.launcher_bin);
        command
            .arg("-np")
            .arg(pool_size.to_string())
            .args(&self.config.worker_cmd)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err);

        let mut child = command.spawn().map_err(|source| StageError::LaunchFailure {
            command: self.command_line(pool_size, args),
            source,
        })?;
        // The command still holds our write ends; close them so the reader
        // sees EOF once the pool exits
        drop(command);

        if self.config.debug {
            eprintln!("DEBUG: pool launcher started (PID: {})", child.id());
        }

        // Drain the pipe off-thread so a chatty pool cannot deadlock the wait
        let reader_handle = thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = reader.read_to_end(&mut bytes);
            String::from_utf8_lossy(&bytes).into_owned()
        });

        let status = self.wait_with_timeout(&mut child)?;
        let combined_output = reader_handle.join().unwrap_or_default();

        Ok(LaunchOutcome {
            combined_output,
            exit_code: status.code(),
        })
    }
}
