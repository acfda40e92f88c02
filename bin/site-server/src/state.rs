//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::{Config, MailTransport};
use crate::contact::mail::{LogMailer, Mailer, SendmailMailer};
use crate::contact::record::SubmissionLog;
use crate::contact::ContactService;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Contact-form pipeline with its log and mail transport.
    pub contact: Arc<ContactService>,
}

impl AppState {
    /// Wire the contact pipeline from configuration alone.
    pub fn from_config(config: Config) -> Self {
        let mailer: Arc<dyn Mailer> = match config.mail_transport {
            MailTransport::Sendmail => Arc::new(SendmailMailer::new(
                config.sendmail_path.clone(),
                config.mail_from.clone(),
                config.mail_timeout,
            )),
            MailTransport::Log => Arc::new(LogMailer),
        };
        Self::with_mailer(config, mailer)
    }

    /// Like [`AppState::from_config`] but with a caller-supplied transport.
    pub fn with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let contact = ContactService::new(
            SubmissionLog::new(config.submissions_path.clone()),
            mailer,
            config.contact_recipient.clone(),
        );
        Self {
            config: Arc::new(config),
            contact: Arc::new(contact),
        }
    }
}
