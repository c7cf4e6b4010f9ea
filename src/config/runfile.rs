//! Batch trigger file parsing
//!
//! A Runfile queues multiple runs: one JSON object per line, each describing a
//! run request. Blank lines and `#` comments are skipped. Lines are parsed and
//! validated field by field before any run is dispatched; trigger-file content
//! is never evaluated as code.

use crate::config::RunRequest;
use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Parse every queued run request from a trigger file
///
/// Fails on the first malformed or invalid line, naming its line number, so a
/// bad batch is rejected up front rather than partway through.
pub fn parse(path: &Path) -> Result<Vec<RunRequest>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read trigger file {}", path.display()))?;

    let mut requests = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let request: RunRequest = serde_json::from_str(line).with_context(|| {
            format!(
                "{}:{}: line is not a valid run request",
                path.display(),
                index + 1
            )
        })?;
        request.validate().map_err(|msg| {
            anyhow::anyhow!("{}:{}: invalid run request: {msg}", path.display(), index + 1)
        })?;
        requests.push(request);
    }

    Ok(requests)
}
