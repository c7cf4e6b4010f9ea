//! optrun CLI entry point

use anyhow::Result;
use optrun::config::cli::{Cli, ExecutionMode};
use optrun::config::{runfile, toml as toml_config, ArtifactConfig, LauncherConfig, RunRequest};
use optrun::launcher::MpiPoolLauncher;
use optrun::{Orchestrator, RunOutcome};

fn main() -> Result<()> {
    println!("optrun v{}", env!("CARGO_PKG_VERSION"));
    println!("Distributed optimization run orchestrator");
    println!();

    let cli = Cli::parse_args();

    match cli.mode {
        ExecutionMode::Run => run_single(cli),
        ExecutionMode::Batch => run_batch(cli),
    }
}

/// Execute one run described by CLI flags or a TOML config file
fn run_single(cli: Cli) -> Result<()> {
    let (request, artifacts, launcher_config) = build_run(&cli)?;
    request
        .validate()
        .map_err(|msg| anyhow::anyhow!("Invalid run request: {msg}"))?;

    if cli.debug {
        eprintln!("DEBUG: run request: {}", request);
        eprintln!("DEBUG: work dir: {}", artifacts.work_dir.display());
        eprintln!("DEBUG: share root: {}", artifacts.share_root.display());
    }

    if cli.dry_run {
        println!("Run request: {}", request);
        println!("Share root:  {}", artifacts.share_root.display());
        println!("Launcher:    {}", launcher_config.launcher_bin);
        println!();
        println!("Dry run mode - run request validated successfully");
        return Ok(());
    }

    let orchestrator = build_orchestrator(&cli, artifacts, launcher_config);
    let outcome = orchestrator.run(&request)?;
    match outcome {
        RunOutcome::Published { .. } => {
            println!("{}", outcome);
            Ok(())
        }
        RunOutcome::Failed { .. } => anyhow::bail!("Run {}", outcome),
    }
}

/// Execute every run queued in the trigger file, one at a time
///
/// A failed run is reported and the batch moves on to the next line; the
/// process exit status reflects whether every run published.
fn run_batch(cli: Cli) -> Result<()> {
    let requests = runfile::parse(&cli.runfile)?;
    if requests.is_empty() {
        println!("Nothing queued in {}", cli.runfile.display());
        return Ok(());
    }
    println!(
        "Processing {} queued run(s) from {}",
        requests.len(),
        cli.runfile.display()
    );
    if cli.debug {
        eprintln!("DEBUG: trigger file: {}", cli.runfile.display());
    }

    let artifacts = cli.to_artifact_config();
    let launcher_config = cli.to_launcher_config();

    let mut failures = 0usize;
    for (index, request) in requests.iter().enumerate() {
        println!();
        println!("=== Run {}/{} ===", index + 1, requests.len());

        if cli.dry_run {
            println!("Run request: {}", request);
            continue;
        }

        let orchestrator = build_orchestrator(&cli, artifacts.clone(), launcher_config.clone());
        match orchestrator.run(request)? {
            outcome @ RunOutcome::Published { .. } => println!("{}", outcome),
            RunOutcome::Failed { .. } => failures += 1,
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} run(s) failed", requests.len());
    }
    Ok(())
}

/// Resolve the request and environment for run mode
fn build_run(cli: &Cli) -> Result<(RunRequest, ArtifactConfig, LauncherConfig)> {
    if let Some(ref path) = cli.config {
        let config = toml_config::load(path)?;
        let mut artifacts = config.artifacts.unwrap_or_default();
        cli.apply_paths(&mut artifacts);
        let mut launcher = config.launcher.unwrap_or_else(|| cli.to_launcher_config());
        launcher.debug = launcher.debug || cli.debug;
        Ok((config.run, artifacts, launcher))
    } else {
        Ok((
            cli.to_run_request()?,
            cli.to_artifact_config(),
            cli.to_launcher_config(),
        ))
    }
}

fn build_orchestrator(
    cli: &Cli,
    artifacts: ArtifactConfig,
    launcher_config: LauncherConfig,
) -> Orchestrator<MpiPoolLauncher> {
    let launcher = MpiPoolLauncher::new(launcher_config, artifacts.work_dir.clone());
    let mut orchestrator = Orchestrator::new(launcher, artifacts);
    if let Some(ref path) = cli.smtp_settings {
        orchestrator = orchestrator.with_smtp_settings_path(path.clone());
    }
    orchestrator
}
