//! SMTP delivery via lettre (STARTTLS, authenticated).

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use super::Mailer;
use crate::config::SmtpConfig;
use crate::error::MailError;

/// Sends mail through an authenticated SMTP relay.
///
/// A fresh transport is opened for every message.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the message that `send` would transmit.
    pub fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, MailError> {
        let from: Mailbox = self
            .config
            .sender
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
                role: "from",
                address: self.config.sender.clone(),
                reason: e.to_string(),
            })?;
        let to: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
                role: "to",
                address: to.to_string(),
                reason: e.to_string(),
            })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, MailError> {
        let creds = Credentials::new(
            self.config.sender.clone(),
            self.config.password.expose_secret().to_string(),
        );

        Ok(SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.config.port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let email = self.build_message(recipient, subject, body)?;
        let transport = self.transport()?;

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| MailError::Transport(format!("SMTP send task panicked: {e}")))?
            .map_err(|e| MailError::Transport(format!("SMTP send failed: {e}")))?;

        tracing::debug!("SMTP accepted message for {recipient}");
        Ok(())
    }
}
