//! Registration notification e-mail.
//!
//! Two transports implement [`Notifier`]: [`OutboxMailer`] spools one
//! `.eml` file per message, [`HttpMailer`] posts JSON to a mail relay.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use giftdraw_core::{
    settings::{NotifySettings, NotifyTransport},
    store::root_at,
    EventName,
};
use giftdraw_renderer::RenderedMessage;

use crate::error::{http_err, io_err, SyncError};

pub const DEFAULT_FROM: &str = "giftdraw <no-reply@localhost>";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn from_rendered(to: &[String], msg: &RenderedMessage) -> Self {
        Self {
            to: to.to_vec(),
            subject: msg.subject.clone().unwrap_or_default(),
            body: msg.body.clone(),
        }
    }
}

pub trait Notifier {
    fn send(&self, email: &Email) -> Result<(), SyncError>;
}

/// `<home>/.giftdraw/outbox/<event>/`
pub fn outbox_dir_at(home: &Path, event: &EventName) -> PathBuf {
    root_at(home).join("outbox").join(&event.0)
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

pub struct OutboxMailer {
    dir: PathBuf,
    from: String,
}

impl OutboxMailer {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, from: DEFAULT_FROM.to_string() }
    }

    fn render_eml(&self, email: &Email) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nMIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\r\n{}",
            self.from,
            email.to.join(", "),
            email.subject,
            Utc::now().to_rfc2822(),
            email.body.replace('\n', "\r\n"),
        )
    }
}

impl Notifier for OutboxMailer {
    fn send(&self, email: &Email) -> Result<(), SyncError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
        let eml = self.render_eml(email);
        for n in 0u32.. {
            let path = self.dir.join(format!("{stamp}-{n}.eml"));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(eml.as_bytes()).map_err(|e| io_err(&path, e))?;
                    tracing::info!("queued notification: {}", path.display());
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(io_err(&path, e)),
            }
        }
        Err(io_err(&self.dir, std::io::Error::other("outbox name space exhausted")))
    }
}

// ---------------------------------------------------------------------------
// HTTP relay
// ---------------------------------------------------------------------------

pub struct HttpMailer {
    agent: ureq::Agent,
    endpoint: String,
    token: String,
    from: String,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(endpoint: &str, token_env: &str, from: Option<&str>) -> Result<Self, SyncError> {
        let token = std::env::var(token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::MissingToken { var: token_env.to_string() })?;
        Ok(Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
            endpoint: endpoint.to_string(),
            token,
            from: from.unwrap_or(DEFAULT_FROM).to_string(),
        })
    }
}

impl Notifier for HttpMailer {
    fn send(&self, email: &Email) -> Result<(), SyncError> {
        let payload = RelayPayload {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        };
        self.agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.token))
            .send_json(serde_json::to_value(&payload)?)
            .map_err(|e| http_err(&self.endpoint, e))?;
        tracing::info!(recipients = email.to.len(), "notification sent");
        Ok(())
    }
}

/// Build the configured transport, or `None` when the host list is empty.
pub fn notifier_from_settings(
    home: &Path,
    event: &EventName,
    settings: &NotifySettings,
) -> Result<Option<Box<dyn Notifier>>, SyncError> {
    if settings.hosts.is_empty() {
        return Ok(None);
    }
    let notifier: Box<dyn Notifier> = match &settings.transport {
        NotifyTransport::Outbox => Box::new(OutboxMailer::new(outbox_dir_at(home, event))),
        NotifyTransport::Http { endpoint, token_env, from } => {
            Box::new(HttpMailer::new(endpoint, token_env, from.as_deref())?)
        }
    };
    Ok(Some(notifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn email() -> Email {
        Email {
            to: vec!["mama@example.com".into(), "papa@example.com".into()],
            subject: "[shower] Nuevo registro: Ana (Juguetes)".into(),
            body: "Ana se acaba de registrar.\nCategoría: Juguetes\n".into(),
        }
    }

    #[test]
    fn outbox_writes_one_eml_per_message() {
        let tmp = TempDir::new().unwrap();
        let mailer = OutboxMailer::new(tmp.path().join("outbox"));
        mailer.send(&email()).unwrap();
        mailer.send(&email()).unwrap();

        let files: Vec<_> = std::fs::read_dir(tmp.path().join("outbox"))
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(files.len(), 2);

        let content = std::fs::read_to_string(files[0].path()).unwrap();
        assert!(content.contains("To: mama@example.com, papa@example.com\r\n"));
        assert!(content.contains("Subject: [shower] Nuevo registro: Ana (Juguetes)\r\n"));
        assert!(content.contains("\r\n\r\nAna se acaba de registrar.\r\n"));
    }

    #[test]
    fn empty_host_list_disables_notification() {
        let tmp = TempDir::new().unwrap();
        let settings = NotifySettings { hosts: vec![], transport: NotifyTransport::Outbox };
        let notifier = notifier_from_settings(tmp.path(), &EventName::from("e"), &settings).unwrap();
        assert!(notifier.is_none());
    }

    #[test]
    fn http_transport_requires_token() {
        let tmp = TempDir::new().unwrap();
        let settings = NotifySettings {
            hosts: vec!["mama@example.com".into()],
            transport: NotifyTransport::Http {
                endpoint: "https://mail.example.com/send".into(),
                token_env: "GIFTDRAW_TEST_UNSET_MAIL_TOKEN".into(),
                from: None,
            },
        };
        let err = notifier_from_settings(tmp.path(), &EventName::from("e"), &settings)
            .err()
            .expect("must fail");
        assert!(matches!(err, SyncError::MissingToken { .. }), "got: {err}");
    }
}
