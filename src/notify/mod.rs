//! Completion report delivery over SMTP
//!
//! When a run requests reporting, one message is composed and sent after the
//! bundle has been published: the body is the textual result representation,
//! with the rendered image, the data table, and the consolidated log attached
//! (the per-worker archive is not mailed). Transport credentials come from a
//! `key = value` file whose path is named by the `SMTP_SETTINGS` environment
//! variable, and submission goes over an implicit-TLS relay.
//!
//! Every failure here is a `NotificationFailure`; the published bundle is
//! never affected.

pub mod settings;

pub use settings::SmtpSettings;

use crate::config::ArtifactConfig;
use crate::error::{StageError, StageResult};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::fs;
use std::path::Path;

const SUBJECT: &str = "Optimization run complete";

/// Compose and transmit the completion report
pub fn send_report(settings: &SmtpSettings, config: &ArtifactConfig) -> StageResult<()> {
    let message = compose(settings, config)?;

    let mailer = SmtpTransport::relay(&settings.host)
        .map_err(|e| notification(format!("SMTP relay setup failed: {e}")))?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.user.clone(),
            settings.password.clone(),
        ))
        .build();

    mailer
        .send(&message)
        .map(|_| ())
        .map_err(|e| notification(format!("SMTP transmission failed: {e}")))
}

/// Build the report message from the run's artifacts
fn compose(settings: &SmtpSettings, config: &ArtifactConfig) -> StageResult<Message> {
    let from: Mailbox = parse_mailbox(&settings.user)?;
    let to: Mailbox = parse_mailbox(&settings.receiver)?;

    let body = read_text(&config.repr_path())?;
    let image = read_bytes(&config.image_path())?;
    let data_table = read_text(&config.data_path())?;
    let log = read_text(&config.log_path())?;

    let multipart = MultiPart::mixed()
        .singlepart(SinglePart::plain(body))
        .singlepart(
            Attachment::new(config.image_file.clone()).body(
                image,
                ContentType::parse("image/png")
                    .map_err(|e| notification(format!("bad attachment type: {e}")))?,
            ),
        )
        .singlepart(Attachment::new(config.data_file.clone()).body(data_table, ContentType::TEXT_PLAIN))
        .singlepart(Attachment::new(config.log_file.clone()).body(log, ContentType::TEXT_PLAIN));

    Message::builder()
        .from(from)
        .to(to)
        .subject(SUBJECT)
        .multipart(multipart)
        .map_err(|e| notification(format!("failed to compose report: {e}")))
}

fn parse_mailbox(address: &str) -> StageResult<Mailbox> {
    address
        .parse()
        .map_err(|e| notification(format!("invalid mail address '{address}': {e}")))
}

fn read_text(path: &Path) -> StageResult<String> {
    fs::read_to_string(path)
        .map_err(|e| notification(format!("cannot read '{}': {e}", path.display())))
}

fn read_bytes(path: &Path) -> StageResult<Vec<u8>> {
    fs::read(path).map_err(|e| notification(format!("cannot read '{}': {e}", path.display())))
}

fn notification(message: String) -> StageError {
    StageError::NotificationFailure(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifacts() -> (TempDir, ArtifactConfig) {
        let dir = TempDir::new().unwrap();
        let config = ArtifactConfig::default().rooted_at(dir.path());
        fs::write(config.repr_path(), "Optimized airfoil: cl=0.5").unwrap();
        fs::write(config.image_path(), [0x89, 0x50, 0x4e, 0x47]).unwrap();
        fs::write(config.data_path(), "1.0 0.0\n0.9 0.01\n").unwrap();
        fs::write(config.log_path(), "generation 100 done\n").unwrap();
        (dir, config)
    }

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 465,
            user: "runner@example.com".to_string(),
            password: "secret".to_string(),
            receiver: "team@example.com".to_string(),
        }
    }

    #[test]
    fn test_compose_builds_body_plus_three_attachments() {
        let (_dir, config) = artifacts();
        let message = compose(&settings(), &config).unwrap();
        let rendered = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(rendered.contains("Optimization run complete"));
        assert!(rendered.contains("optimized.png"));
        assert!(rendered.contains("optimized.dat"));
        assert!(rendered.contains("log.txt"));
        // archive is deliberately not attached
        assert!(!rendered.contains("log.sql.zip"));
    }

    #[test]
    fn test_compose_fails_without_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = ArtifactConfig::default().rooted_at(dir.path());
        let err = compose(&settings(), &config).unwrap_err();
        assert!(matches!(err, StageError::NotificationFailure(_)));
    }

    #[test]
    fn test_bad_address_is_notification_failure() {
        let (_dir, config) = artifacts();
        let mut bad = settings();
        bad.receiver = "not an address".to_string();
        let err = compose(&bad, &config).unwrap_err();
        assert!(matches!(err, StageError::NotificationFailure(_)));
    }
}
