//! Notification email composition and delivery.
//!
//! Delivery is attempted exactly once per accepted submission. There is no
//! queue and no retry: the caller learns success or failure immediately and
//! reports it to the submitter.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::submission::Submission;

/// Subject line of every notification.
pub const SUBJECT: &str = "New website contact form submission";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to start mail transport {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mail transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mail transport exited with {status}: {stderr}")]
    Exit { status: std::process::ExitStatus, stderr: String },

    #[error("mail transport did not finish within {0:?}")]
    Timeout(Duration),
}

/// A plain-text notification derived from one [`Submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    pub fn for_submission(submission: &Submission, recipient: &str) -> Self {
        Self {
            to: recipient.to_owned(),
            reply_to: submission.email.clone(),
            subject: SUBJECT.to_owned(),
            body: format!(
                "Name: {}\nEmail: {}\n\nMessage:\n{}\n",
                submission.name, submission.email, submission.message
            ),
        }
    }

    /// Render as an RFC 5322 message suitable for `sendmail -t`.
    ///
    /// `reply_to` has already passed address validation, which excludes
    /// line breaks, so it cannot smuggle extra headers.
    pub fn to_rfc5322(&self, from: Option<&str>) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);
        out.push_str(&format!("To: {}\n", self.to));
        if let Some(from) = from {
            out.push_str(&format!("From: {from}\n"));
        }
        out.push_str(&format!("Reply-To: {}\n", self.reply_to));
        out.push_str(&format!("Subject: {}\n", self.subject));
        out.push_str("MIME-Version: 1.0\n");
        out.push_str("Content-Type: text/plain; charset=UTF-8\n");
        out.push_str("Content-Transfer-Encoding: 8bit\n");
        out.push('\n');
        out.push_str(&self.body);
        out
    }
}

/// Outbound mail transport.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Hand `message` to the transport once.
    async fn send(&self, message: &NotificationMessage) -> Result<(), MailError>;
}

/// Delivers through a local `sendmail`-compatible MTA.
#[derive(Debug, Clone)]
pub struct SendmailMailer {
    program: PathBuf,
    args: Vec<String>,
    from: Option<String>,
    timeout: Duration,
}

impl SendmailMailer {
    /// Runs `program -t -i`: recipients come from the headers and a lone `.`
    /// line in the body does not end the message.
    pub fn new(program: impl Into<PathBuf>, from: Option<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: vec!["-t".to_owned(), "-i".to_owned()],
            from,
            timeout,
        }
    }

    /// Replace the default `-t -i` arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    async fn run(&self, payload: &[u8]) -> Result<(), MailError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MailError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(payload).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(MailError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Mailer for SendmailMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<(), MailError> {
        let payload = message.to_rfc5322(self.from.as_deref());
        debug!(program = %self.program.display(), bytes = payload.len(), "invoking sendmail");
        tokio::time::timeout(self.timeout, self.run(payload.as_bytes()))
            .await
            .map_err(|_| MailError::Timeout(self.timeout))?
    }
}

/// Logs the message instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &NotificationMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            reply_to = %message.reply_to,
            subject = %message.subject,
            body = %message.body,
            "mail transport is 'log'; notification not sent"
        );
        Ok(())
    }
}
