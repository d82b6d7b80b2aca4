//! In-memory `QuoteService` for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    CreationDate, Credentials, QuoteObject, QuoteSearchFilter, QuoteService, SearchResult, Session,
};
use crate::error::ServiceError;

#[derive(Debug, Clone)]
pub(crate) struct StubQuote {
    pub number: String,
    pub created: String,
    pub customer_id: i64,
    pub manager_id: i64,
}

#[derive(Default)]
pub(crate) struct StubService {
    pub login_fails: bool,
    pub search: Option<SearchResult>,
    pub quotes: HashMap<i64, StubQuote>,
    pub customers: HashMap<i64, String>,
    pub emails: HashMap<i64, String>,
    /// Operations (by name) that fail for the given quote id.
    pub failing: HashSet<(&'static str, i64)>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl StubService {
    pub(crate) fn with_quote(mut self, id: i64, customer: &str, email: &str) -> Self {
        let customer_id = 1000 + id;
        let manager_id = 2000 + id;
        self.quotes.insert(
            id,
            StubQuote {
                number: format!("Q-{id}"),
                created: "2026-09-01T08:30:00".into(),
                customer_id,
                manager_id,
            },
        );
        self.customers.insert(customer_id, customer.into());
        self.emails.insert(manager_id, email.into());
        self
    }

    pub(crate) fn failing_on(mut self, operation: &'static str, id: i64) -> Self {
        self.failing.insert((operation, id));
        self
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, id: i64) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(operation);
        if self.failing.contains(&(operation, id)) {
            return Err(ServiceError::Fault {
                operation: operation.into(),
                reason: "stub failure".into(),
            });
        }
        Ok(())
    }

    fn quote(&self, operation: &'static str, id: i64) -> Result<&StubQuote, ServiceError> {
        self.record(operation, id)?;
        self.quotes.get(&id).ok_or_else(|| ServiceError::Status {
            operation: operation.into(),
            code: -24,
            message: "unknown quote".into(),
        })
    }
}

#[async_trait]
impl QuoteService for StubService {
    async fn login(&self, _credentials: &Credentials) -> Result<Session, ServiceError> {
        self.record("login", 0)?;
        if self.login_fails {
            return Err(ServiceError::Status {
                operation: "login".into(),
                code: -1,
                message: "refused".into(),
            });
        }
        Ok(Session::new("stub-session"))
    }

    async fn search_quotes(
        &self,
        _session: &Session,
        _filter: &QuoteSearchFilter,
    ) -> Result<SearchResult, ServiceError> {
        self.record("search", 0)?;
        Ok(self.search.clone().unwrap_or_else(|| {
            let mut ids: Vec<i64> = self.quotes.keys().copied().collect();
            ids.sort_unstable();
            SearchResult { return_code: 0, data: ids }
        }))
    }

    async fn quote_object(&self, _session: &Session, quote_id: i64) -> Result<QuoteObject, ServiceError> {
        let q = self.quote("getQuoteObject", quote_id)?;
        Ok(QuoteObject {
            quote_id,
            quote_number: q.number.clone(),
            project_name: format!("Project {quote_id}"),
            subject: "Subject".into(),
            status: 9,
        })
    }

    async fn creation_date(&self, _session: &Session, quote_id: i64) -> Result<CreationDate, ServiceError> {
        Ok(CreationDate::parse(&self.quote("getCreationDate", quote_id)?.created))
    }

    async fn project_category(
        &self,
        _session: &Session,
        _language_code: &str,
        quote_id: i64,
    ) -> Result<String, ServiceError> {
        self.quote("getProjectCategory", quote_id)?;
        Ok("Technical".into())
    }

    async fn customer_id(&self, _session: &Session, quote_id: i64) -> Result<i64, ServiceError> {
        Ok(self.quote("getCustomerID", quote_id)?.customer_id)
    }

    async fn customer_full_name(&self, _session: &Session, customer_id: i64) -> Result<String, ServiceError> {
        self.record("getFullName", customer_id - 1000)?;
        self.customers
            .get(&customer_id)
            .cloned()
            .ok_or_else(|| ServiceError::missing("getFullName", "data"))
    }

    async fn project_manager_id(&self, _session: &Session, quote_id: i64) -> Result<i64, ServiceError> {
        Ok(self.quote("getProjectmanagerID", quote_id)?.manager_id)
    }

    async fn resource_email(&self, _session: &Session, resource_id: i64) -> Result<String, ServiceError> {
        self.record("getEmail", resource_id - 2000)?;
        Ok(self.emails.get(&resource_id).cloned().unwrap_or_default())
    }

    async fn currency(&self, _session: &Session, quote_id: i64) -> Result<String, ServiceError> {
        self.quote("getCurrency", quote_id)?;
        Ok("EUR".into())
    }
}
