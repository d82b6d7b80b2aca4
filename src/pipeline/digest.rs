//! Digest rendering and delivery.

use chrono::NaiveDate;

use crate::error::DispatchFailure;
use crate::mail::Mailer;
use crate::pipeline::types::{Digest, ManagerGroup, QuoteSummary};

const SIGN_OFF: &str = "Best regards,\nYour Friendly Quote Bot";

/// Subject line for a digest covering `count` quotes.
pub fn subject_line(count: usize) -> String {
    format!("[Quote Summary] {count} quotes are still in Preparation for you")
}

fn quote_line(quote: &QuoteSummary) -> String {
    format!(
        "- {} | {} | {} | {}",
        quote.quote_number, quote.project_name, quote.created, quote.customer_name
    )
}

/// Render the plain-text body: greeting, one line per quote, sign-off.
pub fn format_body(group: &ManagerGroup, today: NaiveDate) -> String {
    let lines: Vec<String> = group.quotes().iter().map(quote_line).collect();
    format!(
        "Hello,\n\nHere is the list of your quotes as of today ({}):\n\n{}\n\n{SIGN_OFF}",
        today.format("%Y-%m-%d"),
        lines.join("\n"),
    )
}

impl Digest {
    pub fn for_group(group: &ManagerGroup, today: NaiveDate) -> Self {
        Self {
            recipient: group.email().to_string(),
            subject: subject_line(group.len()),
            body: format_body(group, today),
        }
    }
}

/// Send one group's digest. Failures are logged and returned, never fatal.
pub async fn dispatch(
    mailer: &dyn Mailer,
    group: &ManagerGroup,
    today: NaiveDate,
) -> Result<(), DispatchFailure> {
    let digest = Digest::for_group(group, today);

    match mailer
        .send(&digest.recipient, &digest.subject, &digest.body)
        .await
    {
        Ok(()) => {
            tracing::info!(quotes = group.len(), "Email sent to {}", digest.recipient);
            Ok(())
        }
        Err(source) => {
            let failure = DispatchFailure {
                recipient: digest.recipient,
                source,
            };
            tracing::warn!("{failure}");
            Err(failure)
        }
    }
}
