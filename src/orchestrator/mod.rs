//! Run orchestration
//!
//! The orchestrator is the only component invoked from outside. It drives one
//! run through a strictly linear sequence: launch the worker pool, write the
//! captured log, determine the run identifier, collect and validate artifacts,
//! pack the per-worker archive, publish the bundle, and finally send the
//! completion report when requested.
//!
//! Failure policy: launch, collection, packaging, and publication failures are
//! hard stops that terminate the run with a structured `RunOutcome::Failed`;
//! the orchestrator itself never panics or propagates a stage error out of
//! `run`. Notification is best effort: once the bundle is published, a mail
//! failure only attaches a warning to an otherwise successful outcome.

use crate::artifact;
use crate::bundle;
use crate::config::{ArtifactConfig, RunRequest};
use crate::error::{StageError, StageResult};
use crate::launcher::{args, LaunchOutcome, PoolLauncher};
use crate::notify::{self, SmtpSettings};
use crate::publish;
use crate::util::RunId;
use crate::Result;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Pipeline stage a run is in, or failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Launching,
    Collecting,
    Packaging,
    Publishing,
    Notifying,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Launching => write!(f, "launching"),
            RunStage::Collecting => write!(f, "collecting"),
            RunStage::Packaging => write!(f, "packaging"),
            RunStage::Publishing => write!(f, "publishing"),
            RunStage::Notifying => write!(f, "notifying"),
        }
    }
}

/// Terminal result of one orchestrated run
#[derive(Debug)]
pub enum RunOutcome {
    /// The bundle was published; notification may still have failed softly
    Published {
        run_id: RunId,
        destination: PathBuf,
        /// Present when reporting was requested but delivery failed
        notification_warning: Option<String>,
    },
    /// A hard-stop stage failed; no bundle was published for this attempt
    Failed { stage: RunStage, error: StageError },
}

impl RunOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RunOutcome::Published { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Published {
                run_id,
                destination,
                notification_warning,
            } => {
                write!(f, "published {} at {}", run_id, destination.display())?;
                if let Some(warning) = notification_warning {
                    write!(f, " (notification failed: {})", warning)?;
                }
                Ok(())
            }
            RunOutcome::Failed { stage, error } => {
                write!(f, "failed while {}: {}", stage, error)
            }
        }
    }
}

/// Top-level driver for one optimization run
pub struct Orchestrator<L: PoolLauncher> {
    launcher: L,
    artifacts: ArtifactConfig,
    smtp_settings_path: Option<PathBuf>,
}

impl<L: PoolLauncher> Orchestrator<L> {
    pub fn new(launcher: L, artifacts: ArtifactConfig) -> Self {
        Self {
            launcher,
            artifacts,
            smtp_settings_path: None,
        }
    }

    /// Load SMTP credentials from this file instead of resolving the
    /// `SMTP_SETTINGS` environment variable
    pub fn with_smtp_settings_path(mut self, path: PathBuf) -> Self {
        self.smtp_settings_path = Some(path);
        self
    }

    /// Execute one run to completion
    ///
    /// Returns `Err` only for an invalid request; every stage failure is
    /// reported through `RunOutcome::Failed`.
    pub fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        request
            .validate()
            .map_err(|msg| anyhow::anyhow!("invalid run request: {msg}"))?;

        println!("Starting run: {}", request);

        let outcome = match self.launch_and_log(request) {
            Ok(outcome) => outcome,
            Err(error) => return Ok(failed(RunStage::Launching, error)),
        };
        if !outcome.success() {
            // log is already on disk; the run still fails hard
            return Ok(failed(
                RunStage::Launching,
                StageError::WorkerFailure {
                    code: outcome.exit_code,
                },
            ));
        }

        let run_id = match request.output_folder {
            Some(ref folder) => RunId::supplied(folder.clone()),
            None => RunId::from_now(),
        };

        let manifest = match artifact::collect(request.pool_size, &self.artifacts) {
            Ok(manifest) => manifest,
            Err(error) => return Ok(failed(RunStage::Collecting, error)),
        };

        let archive_path = match bundle::pack(&manifest, &self.artifacts) {
            Ok(path) => path,
            Err(error) => return Ok(failed(RunStage::Packaging, error)),
        };

        let destination = match publish::publish(
            &run_id,
            &manifest,
            &archive_path,
            &self.artifacts.share_root,
        ) {
            Ok(path) => path,
            Err(error) => return Ok(failed(RunStage::Publishing, error)),
        };
        println!("Published results to {}", destination.display());

        let notification_warning = if request.report {
            match self.notify() {
                Ok(()) => {
                    println!("Report sent");
                    None
                }
                Err(error) => {
                    eprintln!("Warning: {}", error);
                    Some(error.to_string())
                }
            }
        } else {
            None
        };

        Ok(RunOutcome::Published {
            run_id,
            destination,
            notification_warning,
        })
    }

    /// Launch the pool and persist its combined output immediately
    ///
    /// The log artifact is written before anything else looks at the outcome
    /// so diagnostic output survives even if later stages fail.
    fn launch_and_log(&self, request: &RunRequest) -> StageResult<LaunchOutcome> {
        let args = args::argument_vector(request);
        let outcome = self.launcher.launch(request.pool_size, &args)?;

        print!("{}", outcome.combined_output);

        fs::write(self.artifacts.log_path(), &outcome.combined_output).map_err(|source| {
            StageError::LogWriteFailure {
                name: self.artifacts.log_file.clone(),
                source,
            }
        })?;

        Ok(outcome)
    }

    fn notify(&self) -> StageResult<()> {
        let settings = match self.smtp_settings_path {
            Some(ref path) => SmtpSettings::from_file(path)?,
            None => SmtpSettings::from_env()?,
        };
        notify::send_report(&settings, &self.artifacts)
    }
}

fn failed(stage: RunStage, error: StageError) -> RunOutcome {
    eprintln!("Run failed while {}: {}", stage, error);
    RunOutcome::Failed { stage, error }
}
