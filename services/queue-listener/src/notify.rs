//! Fire-and-forget email notification for transponder alerts.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::error;

use crate::config::SmtpConfig;

/// SMTP notifier; runs disabled (alerts are logged only) when no SMTP
/// settings are configured or the configured addresses fail to parse.
pub struct EmailNotifier {
    inner: Option<Inner>,
}

struct Inner {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Self {
        let inner = smtp.and_then(|smtp| match Inner::build(smtp) {
            Ok(inner) => Some(inner),
            Err(e) => {
                error!("Email notifier disabled: {}", e);
                None
            }
        });
        Self { inner }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Send a notification. Failures are logged, never propagated; alert
    /// delivery is best-effort by design.
    pub async fn notify(&self, subject: &str, body: &str) {
        let Some(inner) = &self.inner else {
            return;
        };

        let mut builder = Message::builder()
            .from(inner.sender.clone())
            .subject(subject);
        for recipient in &inner.recipients {
            builder = builder.to(recipient.clone());
        }
        let email = match builder.body(body.to_string()) {
            Ok(email) => email,
            Err(e) => {
                error!("Error building alert email: {}", e);
                return;
            }
        };

        if let Err(e) = inner.transport.send(email).await {
            error!("Error sending email: {}", e);
        }
    }
}

impl Inner {
    fn build(smtp: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();
        let sender: Mailbox = smtp.sender.parse()?;
        let recipients = smtp
            .recipients
            .iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<Mailbox>, _>>()?;
        Ok(Self {
            transport,
            sender,
            recipients,
        })
    }
}
