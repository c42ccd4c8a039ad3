//! Configuration loaded from environment variables

use std::path::PathBuf;

use sbs_core::message::MessageKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("LISTENER_KIND is not set (expected transponder, position, identification or velocity)")]
    MissingKind,
    #[error("invalid LISTENER_KIND: {0}")]
    InvalidKind(String),
}

/// Listener configuration; one process consumes exactly one queue.
#[derive(Debug, Clone)]
pub struct Config {
    /// Message kind (and therefore queue) this listener is bound to
    pub kind: MessageKind,

    /// Broker URL for the per-kind queues
    pub broker_url: String,

    /// Directory the CSV sink writes into
    pub output_dir: PathBuf,

    /// Dedup key set bound; oldest keys are evicted past this
    pub dedup_capacity: usize,

    /// Extra alert codes beyond the canonical distress set
    pub alert_extra_codes: Vec<String>,

    /// SMTP settings for the alert notifier; absent means alerts are logged
    /// only
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub recipients: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let kind = std::env::var("LISTENER_KIND")
            .map_err(|_| ConfigError::MissingKind)?
            .parse::<MessageKind>()
            .map_err(ConfigError::InvalidKind)?;

        Ok(Self {
            kind,

            broker_url: std::env::var("BROKER_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),

            dedup_capacity: std::env::var("DEDUP_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100_000),

            alert_extra_codes: std::env::var("ALERT_EXTRA_CODES")
                .map(|s| {
                    s.split(',')
                        .map(|code| code.trim().to_string())
                        .filter(|code| !code.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            smtp: SmtpConfig::from_env(),
        })
    }
}

impl SmtpConfig {
    /// SMTP settings, present only when every required variable is set.
    fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let username = std::env::var("SMTP_USERNAME").ok()?;
        let password = std::env::var("SMTP_PASSWORD").ok()?;
        let sender = std::env::var("ALERT_SENDER").ok()?;
        let recipients: Vec<String> = std::env::var("ALERT_RECIPIENTS")
            .ok()?
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            return None;
        }

        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username,
            password,
            sender,
            recipients,
        })
    }
}
