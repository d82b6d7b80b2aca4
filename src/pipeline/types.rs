//! Shared types for the digest pipeline.

use chrono::NaiveDate;

use crate::service::CreationDate;

// ── Quote summary ───────────────────────────────────────────────────

/// A fully resolved quote, ready for grouping.
///
/// Only built when every lookup for the quote succeeded; there is no
/// partially populated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSummary {
    /// Day this summary was produced (not the quote's own date).
    pub retrieved_on: NaiveDate,
    pub quote_id: i64,
    /// Human-facing quote number, may be alphanumeric.
    pub quote_number: String,
    pub project_name: String,
    pub project_subject: String,
    pub status: i32,
    pub created: CreationDate,
    pub category: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub project_manager_id: i64,
    /// Empty when the project manager has no address on file.
    pub project_manager_email: String,
    pub currency: String,
}

impl QuoteSummary {
    /// Grouping key, or `None` if the project manager has no usable address.
    pub fn manager_email(&self) -> Option<&str> {
        let email = self.project_manager_email.as_str();
        (!email.trim().is_empty()).then_some(email)
    }
}

// ── Manager group ───────────────────────────────────────────────────

/// Quotes sharing one project-manager email, in retrieval order.
///
/// Never empty: a group only comes into existence with its first quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerGroup {
    email: String,
    quotes: Vec<QuoteSummary>,
}

impl ManagerGroup {
    pub(crate) fn new(email: String, first: QuoteSummary) -> Self {
        Self {
            email,
            quotes: vec![first],
        }
    }

    pub(crate) fn push(&mut self, quote: QuoteSummary) {
        self.quotes.push(quote);
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn quotes(&self) -> &[QuoteSummary] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

// ── Digest ──────────────────────────────────────────────────────────

/// One rendered message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}
