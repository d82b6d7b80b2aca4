//! Plunet BusinessManager client — SOAP over HTTP via reqwest.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::soap::{ApiResult, Envelope, parse_i64};
use super::{
    CreationDate, Credentials, QuoteObject, QuoteSearchFilter, QuoteService, SearchResult, Session,
};
use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// Value `login` returns instead of a token when credentials are rejected.
const LOGIN_REFUSED: &str = "refused";

/// Service endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Api,
    Quote,
    Customer,
    Resource,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Self::Api => "PlunetAPI",
            Self::Quote => "DataQuote30",
            Self::Customer => "DataCustomer30",
            Self::Resource => "DataResource30",
        }
    }
}

/// Quote service backed by the Plunet SOAP API.
pub struct PlunetClient {
    client: reqwest::Client,
    base_url: String,
}

impl PlunetClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Http {
                operation: "client setup".into(),
                source: e,
            })?;

        tracing::info!("Using Plunet API at {}", config.base_url);
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Post one envelope and parse the `<return>` element of the reply.
    async fn call(&self, endpoint: Endpoint, envelope: Envelope) -> Result<ApiResult, ServiceError> {
        let operation = envelope.operation();
        tracing::debug!(operation, endpoint = endpoint.path(), "Calling Plunet");

        let http_err = |source: reqwest::Error| ServiceError::Http {
            operation: operation.to_string(),
            source,
        };

        let response = self
            .client
            .post(self.endpoint_url(endpoint))
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(envelope.into_xml())
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        let body = response.text().await.map_err(http_err)?;

        // Faults arrive with HTTP 500, so parse before looking at the status.
        match ApiResult::from_response(operation, &body) {
            Err(e) if !status.is_success() && !matches!(e, ServiceError::Fault { .. }) => {
                Err(ServiceError::Status {
                    operation: operation.to_string(),
                    code: i32::from(status.as_u16()),
                    message: status.canonical_reason().unwrap_or("HTTP error").to_string(),
                })
            }
            other => other,
        }
    }

    async fn quote_call(
        &self,
        operation: &'static str,
        session: &Session,
        quote_id: i64,
    ) -> Result<ApiResult, ServiceError> {
        let envelope = Envelope::new(operation)
            .param("UUID", session.token())
            .param("quoteID", quote_id);
        self.call(Endpoint::Quote, envelope).await?.ensure_ok()
    }
}

/// Serialize a search filter as the `SearchFilter_Quote` argument.
fn search_filter_xml(filter: &QuoteSearchFilter) -> String {
    let frame = &filter.time_frame;
    format!(
        concat!(
            "<SearchFilter_Quote>",
            "<languageCode>{lang}</languageCode>",
            "<quoteStatus>{status}</quoteStatus>",
            "<timeFrame><dateFrom>{from}</dateFrom><dateRelation>{relation}</dateRelation><dateTo>{to}</dateTo></timeFrame>",
            "</SearchFilter_Quote>"
        ),
        lang = quick_xml::escape::escape(filter.language_code.as_str()),
        status = filter.quote_status,
        from = frame.date_from.format("%Y-%m-%d"),
        relation = frame.date_relation,
        to = frame.date_to.format("%Y-%m-%d"),
    )
}

fn quote_object_from(result: &ApiResult) -> Result<QuoteObject, ServiceError> {
    const OP: &str = "getQuoteObject";
    let data = result.data()?;
    let status = parse_i64(OP, "status", data.required_text(OP, "status")?)?;
    Ok(QuoteObject {
        quote_id: parse_i64(OP, "quoteID", data.required_text(OP, "quoteID")?)?,
        quote_number: data.required_text(OP, "quoteNumber")?.to_string(),
        project_name: data.required_text(OP, "projectName")?.to_string(),
        subject: data.required_text(OP, "subject")?.to_string(),
        status: i32::try_from(status)
            .map_err(|_| ServiceError::invalid(OP, "status", &status.to_string()))?,
    })
}

#[async_trait]
impl QuoteService for PlunetClient {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ServiceError> {
        let envelope = Envelope::new("login")
            .param("arg0", &credentials.username)
            .param("arg1", credentials.password.expose_secret());
        let result = self.call(Endpoint::Api, envelope).await?;

        match result.text().trim() {
            "" | LOGIN_REFUSED => Err(ServiceError::Status {
                operation: "login".into(),
                code: -1,
                message: format!("login refused for user {}", credentials.username),
            }),
            token => Ok(Session::new(token)),
        }
    }

    async fn search_quotes(
        &self,
        session: &Session,
        filter: &QuoteSearchFilter,
    ) -> Result<SearchResult, ServiceError> {
        let envelope = Envelope::new("search")
            .param("UUID", session.token())
            .fragment(&search_filter_xml(filter));
        let result = self.call(Endpoint::Quote, envelope).await?;

        let return_code = result.status_code()?;
        let data = if return_code == 0 {
            result.data_list_i64()?
        } else {
            Vec::new()
        };
        Ok(SearchResult { return_code, data })
    }

    async fn quote_object(&self, session: &Session, quote_id: i64) -> Result<QuoteObject, ServiceError> {
        let result = self.quote_call("getQuoteObject", session, quote_id).await?;
        quote_object_from(&result)
    }

    async fn creation_date(&self, session: &Session, quote_id: i64) -> Result<CreationDate, ServiceError> {
        let result = self.quote_call("getCreationDate", session, quote_id).await?;
        Ok(CreationDate::parse(&result.data()?.text))
    }

    async fn project_category(
        &self,
        session: &Session,
        language_code: &str,
        quote_id: i64,
    ) -> Result<String, ServiceError> {
        let envelope = Envelope::new("getProjectCategory")
            .param("UUID", session.token())
            .param("systemLanguageCode", language_code)
            .param("quoteID", quote_id);
        self.call(Endpoint::Quote, envelope).await?.ensure_ok()?.data_text()
    }

    async fn customer_id(&self, session: &Session, quote_id: i64) -> Result<i64, ServiceError> {
        self.quote_call("getCustomerID", session, quote_id)
            .await?
            .data_i64()
    }

    async fn customer_full_name(&self, session: &Session, customer_id: i64) -> Result<String, ServiceError> {
        let envelope = Envelope::new("getFullName")
            .param("UUID", session.token())
            .param("customerID", customer_id);
        self.call(Endpoint::Customer, envelope).await?.ensure_ok()?.data_text()
    }

    async fn project_manager_id(&self, session: &Session, quote_id: i64) -> Result<i64, ServiceError> {
        self.quote_call("getProjectmanagerID", session, quote_id)
            .await?
            .data_i64()
    }

    async fn resource_email(&self, session: &Session, resource_id: i64) -> Result<String, ServiceError> {
        let envelope = Envelope::new("getEmail")
            .param("UUID", session.token())
            .param("resourceID", resource_id);
        let result = self.call(Endpoint::Resource, envelope).await?.ensure_ok()?;
        // Blank or omitted emails are left for the grouper to report.
        Ok(result.optional_data_text())
    }

    async fn currency(&self, session: &Session, quote_id: i64) -> Result<String, ServiceError> {
        self.quote_call("getCurrency", session, quote_id).await?.data_text()
    }
}
