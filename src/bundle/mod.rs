//! Result bundle packaging
//!
//! Packs every per-worker output file into one deflate-compressed zip archive.
//! Files keep their original names and are written in rank order, so the same
//! manifest always yields the same archive layout. A file that disappears
//! between collection and archiving fails the stage rather than being skipped.

use crate::artifact::BundleManifest;
use crate::config::ArtifactConfig;
use crate::error::{StageError, StageResult};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write the archive of per-worker files and return its path
pub fn pack(manifest: &BundleManifest, config: &ArtifactConfig) -> StageResult<PathBuf> {
    let archive_path = config.archive_path();
    let file = File::create(&archive_path).map_err(|source| StageError::PackagingFailure {
        name: config.archive_file.clone(),
        source,
    })?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (rank, path) in &manifest.workers {
        let name = config.worker_file_name(*rank);
        zip.start_file(name.as_str(), options)
            .map_err(|e| packaging_failure(&name, e))?;
        let mut input = File::open(path).map_err(|source| StageError::PackagingFailure {
            name: name.clone(),
            source,
        })?;
        io::copy(&mut input, &mut zip).map_err(|source| StageError::PackagingFailure {
            name: name.clone(),
            source,
        })?;
    }

    zip.finish()
        .map_err(|e| packaging_failure(&config.archive_file, e))?;

    Ok(archive_path)
}

fn packaging_failure(name: &str, err: zip::result::ZipError) -> StageError {
    StageError::PackagingFailure {
        name: name.to_string(),
        source: io::Error::new(io::ErrorKind::Other, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact;
    use std::fs;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn workspace(pool_size: usize) -> (TempDir, ArtifactConfig) {
        let dir = TempDir::new().unwrap();
        let config = ArtifactConfig::default().rooted_at(dir.path());
        fs::write(config.repr_path(), "repr").unwrap();
        fs::write(config.image_path(), "png").unwrap();
        fs::write(config.data_path(), "dat").unwrap();
        fs::write(config.log_path(), "log").unwrap();
        for rank in 0..pool_size {
            fs::write(config.worker_path(rank), format!("worker {}", rank)).unwrap();
        }
        (dir, config)
    }

    #[test]
    fn test_archive_contains_exactly_the_worker_files() {
        let (_dir, config) = workspace(4);
        let manifest = artifact::collect(4, &config).unwrap();
        let archive_path = pack(&manifest, &config).unwrap();

        let mut archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 4);
        for rank in 0..4 {
            let name = config.worker_file_name(rank);
            let mut entry = archive.by_name(&name).unwrap();
            let mut contents = String::new();
            io::Read::read_to_string(&mut entry, &mut contents).unwrap();
            assert_eq!(contents, format!("worker {}", rank));
        }
    }

    #[test]
    fn test_single_worker_archive_has_one_member() {
        let (_dir, config) = workspace(1);
        let manifest = artifact::collect(1, &config).unwrap();
        let archive_path = pack(&manifest, &config).unwrap();
        let archive = ZipArchive::new(File::open(archive_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_file_vanishing_after_collection_fails_packaging() {
        let (_dir, config) = workspace(2);
        let manifest = artifact::collect(2, &config).unwrap();
        fs::remove_file(config.worker_path(1)).unwrap();
        let err = pack(&manifest, &config).unwrap_err();
        assert!(matches!(err, StageError::PackagingFailure { .. }));
    }
}
