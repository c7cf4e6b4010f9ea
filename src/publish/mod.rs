//! Bundle publication into the shared-results root
//!
//! A run's bundle becomes discoverable at `<share_root>/<run_id>`. Publication
//! must never expose a partially populated directory, so the five artifacts are
//! first copied into a hidden staging sibling inside the share root and the
//! staging directory is renamed onto the final path in one step. The rename is
//! atomic because staging and destination share a filesystem.
//!
//! An existing destination is a hard conflict: published bundles are immutable
//! and are never merged into or overwritten.

use crate::artifact::BundleManifest;
use crate::error::{StageError, StageResult};
use crate::util::RunId;
use std::fs;
use std::path::{Path, PathBuf};

/// Copy the bundle into the shared root under the run identifier
///
/// Copies the four shared artifacts, in manifest order, then the archive.
/// Returns the final destination path.
pub fn publish(
    run_id: &RunId,
    manifest: &BundleManifest,
    archive_path: &Path,
    share_root: &Path,
) -> StageResult<PathBuf> {
    let destination = share_root.join(run_id.as_str());
    if destination.exists() {
        return Err(StageError::DestinationConflict { path: destination });
    }

    fs::create_dir_all(share_root).map_err(|source| StageError::PublishFailure {
        name: share_root.display().to_string(),
        source,
    })?;

    // the pid suffix keeps concurrent publishers of the same identifier from
    // sharing a staging directory
    let staging = share_root.join(format!(".staging-{}-{}", run_id, std::process::id()));
    fs::create_dir(&staging).map_err(|source| StageError::PublishFailure {
        name: staging.display().to_string(),
        source,
    })?;

    let result = copy_bundle(manifest, archive_path, &staging);
    if let Err(err) = result {
        let _ = fs::remove_dir_all(&staging);
        return Err(err);
    }

    match fs::rename(&staging, &destination) {
        Ok(()) => Ok(destination),
        Err(source) => {
            let _ = fs::remove_dir_all(&staging);
            // a concurrent run may have claimed the identifier while we staged
            if destination.exists() {
                Err(StageError::DestinationConflict { path: destination })
            } else {
                Err(StageError::PublishFailure {
                    name: destination.display().to_string(),
                    source,
                })
            }
        }
    }
}

fn copy_bundle(
    manifest: &BundleManifest,
    archive_path: &Path,
    staging: &Path,
) -> StageResult<()> {
    for path in &manifest.shared {
        copy_into(path, staging)?;
    }
    copy_into(archive_path, staging)
}

fn copy_into(source_path: &Path, staging: &Path) -> StageResult<()> {
    let name = source_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_path.display().to_string());
    fs::copy(source_path, staging.join(&name))
        .map(|_| ())
        .map_err(|source| StageError::PublishFailure { name, source })
}
