//! Outbound mail abstraction.

pub mod smtp;
#[cfg(test)]
pub(crate) mod recording;

pub use smtp::SmtpMailer;

use async_trait::async_trait;

use crate::error::MailError;

/// Delivers one plain-text message to one recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Mailer that logs messages instead of sending them (dry runs).
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(recipient, subject, "Dry run, digest not sent:\n{body}");
        Ok(())
    }
}
