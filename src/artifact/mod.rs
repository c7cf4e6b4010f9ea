//! Artifact collection and validation
//!
//! After the worker pool exits, the working directory must hold four shared
//! artifacts plus one private file per worker rank. The collector verifies
//! every one of them exists and is readable before any packaging side effect
//! happens; a partial bundle is never packaged.

use crate::config::ArtifactConfig;
use crate::error::{StageError, StageResult};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Validated manifest of all files making up one result bundle
///
/// Per-worker entries are ordered by rank so downstream packaging is
/// deterministic.
#[derive(Debug, Clone)]
pub struct BundleManifest {
    /// Shared artifacts in publication order: repr, image, data table, log
    pub shared: Vec<PathBuf>,
    /// One `(rank, path)` entry per worker, ascending by rank
    pub workers: Vec<(usize, PathBuf)>,
}

/// Verify that every expected artifact of a run exists and is readable
///
/// Checks the four shared artifacts and a per-worker file for every rank in
/// `[0, pool_size)`. The first missing or unreadable file aborts collection
/// with `ArtifactMissing` naming the file and, for per-worker files, the rank.
pub fn collect(pool_size: usize, config: &ArtifactConfig) -> StageResult<BundleManifest> {
    let shared = vec![
        config.repr_path(),
        config.image_path(),
        config.data_path(),
        config.log_path(),
    ];
    for path in &shared {
        check_readable(path, None)?;
    }

    let mut workers = Vec::with_capacity(pool_size);
    for rank in 0..pool_size {
        let path = config.worker_path(rank);
        check_readable(&path, Some(rank))?;
        workers.push((rank, path));
    }

    Ok(BundleManifest { shared, workers })
}

fn check_readable(path: &Path, rank: Option<usize>) -> StageResult<()> {
    match File::open(path) {
        Ok(_) => Ok(()),
        Err(_) => Err(StageError::ArtifactMissing {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            rank,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn populate(dir: &TempDir, pool_size: usize) -> ArtifactConfig {
        let config = ArtifactConfig::default().rooted_at(dir.path());
        fs::write(config.repr_path(), "repr").unwrap();
        fs::write(config.image_path(), [0x89, 0x50]).unwrap();
        fs::write(config.data_path(), "0.0 1.0").unwrap();
        fs::write(config.log_path(), "log").unwrap();
        for rank in 0..pool_size {
            fs::write(config.worker_path(rank), format!("db {}", rank)).unwrap();
        }
        config
    }

    #[test]
    fn test_complete_set_collects() {
        let dir = TempDir::new().unwrap();
        let config = populate(&dir, 4);
        let manifest = collect(4, &config).unwrap();
        assert_eq!(manifest.shared.len(), 4);
        assert_eq!(manifest.workers.len(), 4);
        // rank ordering is part of the packaging contract
        let ranks: Vec<usize> = manifest.workers.iter().map(|(r, _)| *r).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_missing_shared_artifact_rejected() {
        let dir = TempDir::new().unwrap();
        let config = populate(&dir, 1);
        fs::remove_file(config.image_path()).unwrap();
        let err = collect(1, &config).unwrap_err();
        match err {
            StageError::ArtifactMissing { name, rank } => {
                assert_eq!(name, "optimized.png");
                assert_eq!(rank, None);
            }
            other => panic!("expected ArtifactMissing, got {other}"),
        }
    }

    #[test]
    fn test_missing_worker_file_names_rank() {
        let dir = TempDir::new().unwrap();
        let config = populate(&dir, 4);
        fs::remove_file(config.worker_path(2)).unwrap();
        let err = collect(4, &config).unwrap_err();
        match err {
            StageError::ArtifactMissing { name, rank } => {
                assert_eq!(name, "log.sql_2");
                assert_eq!(rank, Some(2));
            }
            other => panic!("expected ArtifactMissing, got {other}"),
        }
    }

    #[test]
    fn test_pool_size_bounds_worker_set() {
        let dir = TempDir::new().unwrap();
        // files for ranks 0..2 exist but a pool of 3 was requested
        let config = populate(&dir, 2);
        let err = collect(3, &config).unwrap_err();
        assert!(matches!(
            err,
            StageError::ArtifactMissing { rank: Some(2), .. }
        ));
    }
}
