//! Server configuration, loaded from environment variables at startup.
//!
//! Handlers never read the environment themselves; everything they need is
//! resolved here once and handed to [`crate::state::AppState`].

use std::path::PathBuf;
use std::time::Duration;

/// Recipient used when `CONTACT_TO` is unset or empty.
pub const FALLBACK_RECIPIENT: &str = "office@example.edu";

/// How notification emails leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// Pipe the message to a local `sendmail`-compatible MTA.
    Sendmail,
    /// Log the rendered message and report success. Development only.
    Log,
}

impl std::str::FromStr for MailTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sendmail" => Ok(Self::Sendmail),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown mail transport '{other}'")),
        }
    }
}

/// Runtime configuration for site-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Address that receives contact notifications.
    pub contact_recipient: String,

    /// Append-only JSON Lines file recording accepted submissions.
    pub submissions_path: PathBuf,

    pub mail_transport: MailTransport,

    /// MTA binary used by [`MailTransport::Sendmail`].
    pub sendmail_path: PathBuf,

    /// Optional `From:` header; the MTA picks its own default when unset.
    pub mail_from: Option<String>,

    /// Upper bound on a single delivery attempt.
    pub mail_timeout: Duration,

    /// Largest accepted `/api/contact` body, in bytes.
    pub max_body_bytes: usize,

    /// Comma-separated CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup. Empty and
    /// whitespace-only values count as unset for the optional settings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Lookup(lookup);

        let mail_transport = env
            .non_empty("SITE_MAIL_TRANSPORT")
            .and_then(|v| match v.parse() {
                Ok(t) => Some(t),
                Err(e) => {
                    eprintln!("WARN: SITE_MAIL_TRANSPORT: {e}; falling back to 'sendmail'");
                    None
                }
            })
            .unwrap_or(MailTransport::Sendmail);

        Self {
            bind_address: env.or("SITE_BIND", "0.0.0.0:3000"),
            contact_recipient: env
                .non_empty("CONTACT_TO")
                .unwrap_or_else(|| FALLBACK_RECIPIENT.to_owned()),
            submissions_path: PathBuf::from(
                env.or("SITE_SUBMISSIONS_PATH", "data/contact-submissions.jsonl"),
            ),
            mail_transport,
            sendmail_path: PathBuf::from(env.or("SITE_SENDMAIL_PATH", "/usr/sbin/sendmail")),
            mail_from: env.non_empty("SITE_MAIL_FROM"),
            mail_timeout: Duration::from_secs(env.parse("SITE_MAIL_TIMEOUT_SECS", 30)),
            max_body_bytes: env.parse("SITE_MAX_BODY_BYTES", 64 * 1024),
            cors_allowed_origins: env.non_empty("SITE_CORS_ORIGINS"),
            enable_swagger: env.flag("SITE_ENABLE_SWAGGER", true),
            log_level: env.or("SITE_LOG", "info"),
            log_json: env.flag("SITE_LOG_JSON", false),
        }
    }
}

impl Default for Config {
    /// The configuration `from_env` yields with an empty environment.
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            contact_recipient: FALLBACK_RECIPIENT.to_owned(),
            submissions_path: PathBuf::from("data/contact-submissions.jsonl"),
            mail_transport: MailTransport::Sendmail,
            sendmail_path: PathBuf::from("/usr/sbin/sendmail"),
            mail_from: None,
            mail_timeout: Duration::from_secs(30),
            max_body_bytes: 64 * 1024,
            cors_allowed_origins: None,
            enable_swagger: true,
            log_level: "info".to_owned(),
            log_json: false,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

struct Lookup<F>(F);

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    fn or(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_owned())
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.0)(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        (self.0)(key)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }
}
