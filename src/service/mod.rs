//! Quote service abstraction.
//!
//! The pipeline only sees the `QuoteService` trait. Responses arrive as
//! typed records; identifiers are already coerced to integers and dates to
//! `CreationDate` by the implementation, so a bad field surfaces as a
//! `ServiceError` on the call that returned it.

pub mod plunet;
pub(crate) mod soap;
#[cfg(test)]
pub(crate) mod stub;

pub use plunet::PlunetClient;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use secrecy::SecretString;

use crate::error::ServiceError;

/// Status value the service uses for quotes still in preparation.
pub const QUOTE_STATUS_PREPARATION: i32 = 9;

/// `dateRelation` value meaning "created within the time frame".
pub const DATE_RELATION_WITHIN: i32 = 1;

/// Session token returned by `login`, valid for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Login credentials for the quote service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Date window for a quote search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFrame {
    pub date_from: NaiveDate,
    pub date_relation: i32,
    pub date_to: NaiveDate,
}

/// Filter passed to the quote search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSearchFilter {
    pub language_code: String,
    pub quote_status: i32,
    pub time_frame: TimeFrame,
}

/// Raw search response: a status code plus matching quote ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// `0` on success.
    pub return_code: i32,
    pub data: Vec<i64>,
}

impl SearchResult {
    pub fn is_success(&self) -> bool {
        self.return_code == 0
    }
}

/// Core fields of a quote record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteObject {
    pub quote_id: i64,
    pub quote_number: String,
    pub project_name: String,
    pub subject: String,
    pub status: i32,
}

/// Quote creation timestamp as delivered by the service.
///
/// Well-formed `xsd:dateTime` values become `Timestamp`; anything else is
/// kept verbatim so it can still be shown to the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationDate {
    Timestamp(NaiveDateTime),
    Raw(String),
}

impl CreationDate {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::Timestamp(dt.naive_local());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return Self::Timestamp(dt);
        }
        Self::Raw(raw.to_string())
    }
}

impl std::fmt::Display for CreationDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M")),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// Remote operations the digest pipeline depends on.
///
/// Every call is one request/response round trip. Implementations must
/// return an error rather than a placeholder when a required field is
/// missing or malformed.
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Open a session.
    async fn login(&self, credentials: &Credentials) -> Result<Session, ServiceError>;

    /// Search quotes. A non-zero `return_code` is reported in the result, not as an error.
    async fn search_quotes(
        &self,
        session: &Session,
        filter: &QuoteSearchFilter,
    ) -> Result<SearchResult, ServiceError>;

    async fn quote_object(&self, session: &Session, quote_id: i64)
    -> Result<QuoteObject, ServiceError>;

    async fn creation_date(
        &self,
        session: &Session,
        quote_id: i64,
    ) -> Result<CreationDate, ServiceError>;

    async fn project_category(
        &self,
        session: &Session,
        language_code: &str,
        quote_id: i64,
    ) -> Result<String, ServiceError>;

    async fn customer_id(&self, session: &Session, quote_id: i64) -> Result<i64, ServiceError>;

    async fn customer_full_name(
        &self,
        session: &Session,
        customer_id: i64,
    ) -> Result<String, ServiceError>;

    async fn project_manager_id(&self, session: &Session, quote_id: i64)
    -> Result<i64, ServiceError>;

    /// Email of a staff resource. An empty string means the resource has none.
    async fn resource_email(
        &self,
        session: &Session,
        resource_id: i64,
    ) -> Result<String, ServiceError>;

    async fn currency(&self, session: &Session, quote_id: i64) -> Result<String, ServiceError>;
}
