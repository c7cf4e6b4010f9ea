//! TOML run configuration files
//!
//! A run can be described in a TOML file instead of CLI flags: a `[run]` table
//! holding the request plus optional `[artifacts]` and `[launcher]` tables for
//! environment overrides.

use crate::config::{ArtifactConfig, LauncherConfig, RunRequest};
use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a TOML run configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlRunConfig {
    /// The run request itself
    pub run: RunRequest,
    /// Artifact name / path overrides
    #[serde(default)]
    pub artifacts: Option<ArtifactConfig>,
    /// Pool launcher overrides
    #[serde(default)]
    pub launcher: Option<LauncherConfig>,
}

/// Load and validate a TOML run configuration
pub fn load(path: &Path) -> Result<TomlRunConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: TomlRunConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .run
        .validate()
        .map_err(|msg| anyhow::anyhow!("Invalid run request in {}: {msg}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = "[run]\ntarget_cl = 1.0\nn_chord = 3\nn_thick = 3\n";

    #[test]
    fn test_minimal_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, MINIMAL).unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.run.target_cl, 1.0);
        assert_eq!(config.run.bits_chord, 8);
        assert_eq!(config.run.pool_size, 28);
        assert!(config.artifacts.is_none());
        assert!(config.launcher.is_none());
    }

    #[test]
    fn test_full_file_with_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(
            &path,
            r#"
[run]
target_cl = 0.5
n_chord = 6
n_thick = 6
generations = 250
seed = 42
report = true
output_folder = "cl05_baseline"

[artifacts]
share_root = "/mnt/results"

[launcher]
launcher_bin = "srun"
timeout_secs = 3600
"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.run.generations, 250);
        assert_eq!(config.run.seed, Some(42));
        assert_eq!(
            config.artifacts.unwrap().share_root,
            std::path::PathBuf::from("/mnt/results")
        );
        let launcher = config.launcher.unwrap();
        assert_eq!(launcher.launcher_bin, "srun");
        assert_eq!(launcher.timeout_secs, Some(3600));
    }

    #[test]
    fn test_invalid_request_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "[run]\ntarget_cl = 1.0\nn_chord = 0\nn_thick = 3\n").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_missing_file_rejected() {
        assert!(load(Path::new("/nonexistent/run.toml")).is_err());
    }
}
