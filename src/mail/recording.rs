//! In-memory `Mailer` for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::Mailer;
use crate::error::MailError;

#[derive(Default)]
pub(crate) struct RecordingMailer {
    /// Recipients whose delivery is rejected.
    pub fail_for: Vec<String>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub(crate) fn failing_for(mut self, recipient: &str) -> Self {
        self.fail_for.push(recipient.to_string());
        self
    }

    /// `(recipient, subject)` pairs in delivery order.
    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn recipients(&self) -> Vec<String> {
        self.sent().into_iter().map(|(recipient, _)| recipient).collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        if self.fail_for.iter().any(|r| r == recipient) {
            return Err(MailError::Transport("rejected".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string()));
        Ok(())
    }
}
