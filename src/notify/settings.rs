//! SMTP credential resolution
//!
//! Credentials live outside the repository in a plain `key = value` text file;
//! the file's path is supplied through the `SMTP_SETTINGS` environment
//! variable. All five keys are required: host, port, user, password, receiver.

use crate::error::{StageError, StageResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable naming the credentials file
pub const SMTP_SETTINGS_ENV: &str = "SMTP_SETTINGS";

/// Mail submission credentials
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub receiver: String,
}

impl SmtpSettings {
    /// Resolve the credentials file path from the environment and load it
    pub fn from_env() -> StageResult<Self> {
        let path = env::var(SMTP_SETTINGS_ENV).map_err(|_| {
            StageError::NotificationFailure(format!(
                "{SMTP_SETTINGS_ENV} environment variable is not set"
            ))
        })?;
        Self::from_file(Path::new(&path))
    }

    /// Load credentials from a `key = value` file
    pub fn from_file(path: &Path) -> StageResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            StageError::NotificationFailure(format!(
                "cannot read credentials file '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> StageResult<Self> {
        let mut values = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                StageError::NotificationFailure(format!(
                    "malformed credentials line (expected key = value): '{line}'"
                ))
            })?;
            values.insert(key.trim().to_string(), value.trim().to_string());
        }

        let take = |key: &str| -> StageResult<String> {
            values.get(key).cloned().ok_or_else(|| {
                StageError::NotificationFailure(format!("credentials file is missing '{key}'"))
            })
        };

        let port_text = take("port")?;
        let port = port_text.parse().map_err(|_| {
            StageError::NotificationFailure(format!("invalid port '{port_text}'"))
        })?;

        Ok(Self {
            host: take("host")?,
            port,
            user: take("user")?,
            password: take("password")?,
            receiver: take("receiver")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GOOD: &str = "host = smtp.example.com\nport = 465\nuser = a@example.com\npassword = hunter2\nreceiver = b@example.com\n";

    #[test]
    fn test_parse_key_value_lines() {
        let settings = SmtpSettings::parse(GOOD).unwrap();
        assert_eq!(settings.host, "smtp.example.com");
        assert_eq!(settings.port, 465);
        assert_eq!(settings.user, "a@example.com");
        assert_eq!(settings.receiver, "b@example.com");
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = SmtpSettings::parse("host = h\nport = 465\n").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_malformed_line_rejected() {
        let err = SmtpSettings::parse("host smtp.example.com\n").unwrap_err();
        assert!(matches!(err, StageError::NotificationFailure(_)));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let bad = GOOD.replace("465", "secure");
        assert!(SmtpSettings::parse(&bad).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("smtp.conf");
        fs::write(&path, GOOD).unwrap();
        assert!(SmtpSettings::from_file(&path).is_ok());
        assert!(SmtpSettings::from_file(&dir.path().join("absent")).is_err());
    }
}
