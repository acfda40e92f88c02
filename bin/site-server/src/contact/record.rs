//! Append-only JSON Lines log of accepted submissions.
//!
//! The log is write-only from the server's point of view: records are
//! appended, never read back, rewritten or removed. Each append takes an
//! exclusive OS lock on the file for the duration of a single `write_all`, so
//! concurrent writers (including other processes) never interleave lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use super::submission::Submission;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("submission log I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode submission record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("submission log writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// One line of the submission log.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecord {
    /// UTC, ISO-8601, second precision (`2024-05-01T09:30:00+00:00`).
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(rename = "ip")]
    pub source_address: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
}

impl SubmissionRecord {
    pub fn new(
        submission: &Submission,
        source_address: Option<String>,
        user_agent: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: iso8601(at),
            name: submission.name.clone(),
            email: submission.email.clone(),
            message: submission.message.clone(),
            source_address,
            user_agent,
        }
    }

    /// Serialise as a single newline-terminated line.
    fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Format a timestamp the way every response and record in this server does.
pub fn iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Handle to the submission log file.
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    path: PathBuf,
}

impl SubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record` as one line. Blocking file work runs on the blocking
    /// pool so request tasks are never stalled behind the lock.
    pub async fn append(&self, record: &SubmissionRecord) -> Result<(), RecordError> {
        let line = record.to_line()?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_locked(&path, &line)).await?
    }
}

fn append_locked(path: &Path, line: &[u8]) -> Result<(), RecordError> {
    let io_err = |source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    // Released when `file` is dropped.
    file.lock().map_err(io_err)?;
    file.write_all(line).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn ada() -> Submission {
        Submission {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "Hello".into(),
        }
    }

    #[test]
    fn record_uses_log_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let record = SubmissionRecord::new(&ada(), Some("203.0.113.9".into()), None, at);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["timestamp"], "2024-05-01T09:30:00+00:00");
        assert_eq!(value["ip"], "203.0.113.9");
        assert!(value["userAgent"].is_null());
        assert_eq!(value["name"], "Ada");
    }

    #[test]
    fn non_ascii_text_is_written_unescaped() {
        let mut s = ada();
        s.message = "Grüße — 你好".into();
        let record = SubmissionRecord::new(&s, None, None, Utc::now());
        let line = String::from_utf8(record.to_line().unwrap()).unwrap();
        assert!(line.contains("Grüße — 你好"));
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[tokio::test]
    async fn append_creates_parent_and_adds_one_line_per_call() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = SubmissionLog::new(dir.path().join("data/contact-submissions.jsonl"));
        let record = SubmissionRecord::new(&ada(), None, Some("curl/8".into()), Utc::now());

        log.append(&record).await.unwrap();
        log.append(&record).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(v["userAgent"], "curl/8");
        }
    }

    #[tokio::test]
    async fn append_reports_unwritable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory where the file should be.
        let log = SubmissionLog::new(dir.path());
        let record = SubmissionRecord::new(&ada(), None, None, Utc::now());
        assert!(matches!(log.append(&record).await, Err(RecordError::Io { .. })));
    }

    #[tokio::test]
    async fn concurrent_appends_never_interleave() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = SubmissionLog::new(dir.path().join("log.jsonl"));
        let big = "x".repeat(64 * 1024);

        let mut tasks = Vec::new();
        for i in 0..32 {
            let log = log.clone();
            let mut s = ada();
            s.message = format!("{i}:{big}");
            tasks.push(tokio::spawn(async move {
                let record = SubmissionRecord::new(&s, None, None, Utc::now());
                log.append(&record).await
            }));
        }
        for t in tasks {
            t.await.unwrap().unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        let mut seen: Vec<usize> = content
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                let msg = v["message"].as_str().unwrap();
                msg.split(':').next().unwrap().parse().unwrap()
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
    }
}
