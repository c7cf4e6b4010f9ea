//! Run identifier derivation
//!
//! A run identifier names the directory under the shared-results root where a
//! run's bundle is published. When the caller does not supply one, it is
//! derived from the current UTC instant at second resolution, formatted without
//! `:` or `-` so it is safe in paths and URLs, and suffixed with `Z` to mark it
//! as UTC (e.g. `20260831T142501Z`).

use chrono::{DateTime, Utc};
use std::fmt;

/// Unique name for one run's published output location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId(String);

impl RunId {
    /// Use a caller-supplied folder name verbatim
    pub fn supplied(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive an identifier from the current UTC instant
    pub fn from_now() -> Self {
        Self::from_instant(Utc::now())
    }

    /// Derive an identifier from a fixed instant (deterministic)
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(format!("{}Z", instant.format("%Y%m%dT%H%M%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_derivation_is_deterministic() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap();
        assert_eq!(RunId::from_instant(instant), RunId::from_instant(instant));
        assert_eq!(RunId::from_instant(instant).as_str(), "20240307T090542Z");
    }

    #[test]
    fn test_distinct_seconds_produce_distinct_ids() {
        let a = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 43).unwrap();
        assert_ne!(RunId::from_instant(a), RunId::from_instant(b));
    }

    #[test]
    fn test_id_is_path_safe() {
        let instant = Utc.with_ymd_and_hms(2031, 12, 31, 23, 59, 59).unwrap();
        let id = RunId::from_instant(instant);
        assert!(!id.as_str().contains(':'));
        assert!(!id.as_str().contains('-'));
        assert!(!id.as_str().contains('/'));
        assert!(id.as_str().ends_with('Z'));
    }

    #[test]
    fn test_supplied_name_used_verbatim() {
        assert_eq!(RunId::supplied("baseline_cl05").as_str(), "baseline_cl05");
    }
}
