//! Contact-form pipeline: validate → record (best-effort) → notify.
//!
//! The two side effects fail differently. A recorder failure is logged and
//! swallowed so a storage hiccup never loses a real contact attempt; a
//! delivery failure ends the request with [`ContactError::DeliveryFailed`].
//! A submission can therefore be recorded while its sender sees a 500.

pub mod mail;
pub mod record;
pub mod submission;

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::ContactError;
use mail::{Mailer, NotificationMessage};
use record::{SubmissionLog, SubmissionRecord};
use submission::SubmissionRequest;

/// Connection details recorded alongside a submission.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub source_address: Option<String>,
    pub user_agent: Option<String>,
}

/// What happened to an accepted submission besides delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// `false` when the submission log could not be written.
    pub recorded: bool,
}

/// Runs the contact pipeline against explicitly provided collaborators.
pub struct ContactService {
    log: SubmissionLog,
    mailer: Arc<dyn Mailer>,
    recipient: String,
}

impl std::fmt::Debug for ContactService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactService")
            .field("log", &self.log.path())
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}

impl ContactService {
    pub fn new(log: SubmissionLog, mailer: Arc<dyn Mailer>, recipient: impl Into<String>) -> Self {
        Self {
            log,
            mailer,
            recipient: recipient.into(),
        }
    }

    /// Process one raw request body.
    ///
    /// Validation failures return before any side effect.
    pub async fn submit(&self, body: &[u8], meta: RequestMeta) -> Result<Receipt, ContactError> {
        let submission = match SubmissionRequest::from_json(body)?.validate() {
            Ok(s) => s,
            Err(ContactError::Rejected) => {
                info!(source = ?meta.source_address, "honeypot filled; submission dropped");
                return Err(ContactError::Rejected);
            }
            Err(e) => return Err(e),
        };

        let record = SubmissionRecord::new(
            &submission,
            meta.source_address,
            meta.user_agent,
            Utc::now(),
        );
        let recorded = match self.log.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not record contact submission; continuing with delivery");
                false
            }
        };

        let message = NotificationMessage::for_submission(&submission, &self.recipient);
        if let Err(e) = self.mailer.send(&message).await {
            error!(error = %e, recorded, "contact notification delivery failed");
            return Err(ContactError::DeliveryFailed);
        }

        info!(recorded, "contact submission delivered");
        Ok(Receipt { recorded })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::mail::{MailError, Mailer, NotificationMessage};

    /// Captures messages; fails every send when `fail` is set.
    #[derive(Debug, Default)]
    pub struct RecordingMailer {
        pub fail: bool,
        pub sent: Mutex<Vec<NotificationMessage>>,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<NotificationMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &NotificationMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Io(std::io::Error::other("connection refused")));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}
