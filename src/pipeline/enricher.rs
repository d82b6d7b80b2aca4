//! Per-quote enrichment: joins quote, customer and staff data into one summary.

use chrono::NaiveDate;

use crate::error::{EnrichmentFailure, ServiceError};
use crate::pipeline::types::QuoteSummary;
use crate::service::{QuoteService, Session};

/// Resolves quote ids into complete `QuoteSummary` records.
pub struct QuoteEnricher<'a> {
    service: &'a dyn QuoteService,
    session: &'a Session,
    language_code: &'a str,
    retrieved_on: NaiveDate,
}

impl<'a> QuoteEnricher<'a> {
    pub fn new(
        service: &'a dyn QuoteService,
        session: &'a Session,
        language_code: &'a str,
        retrieved_on: NaiveDate,
    ) -> Self {
        Self {
            service,
            session,
            language_code,
            retrieved_on,
        }
    }

    /// Build the summary for one quote.
    ///
    /// Lookups run one after another; the first failing lookup aborts this
    /// quote and is reported with the step that failed.
    pub async fn enrich(&self, quote_id: i64) -> Result<QuoteSummary, EnrichmentFailure> {
        let fail = move |step: &'static str| {
            move |source: ServiceError| EnrichmentFailure {
                quote_id,
                step,
                source,
            }
        };
        let svc = self.service;
        let session = self.session;

        let quote = svc
            .quote_object(session, quote_id)
            .await
            .map_err(fail("quote object"))?;
        let created = svc
            .creation_date(session, quote_id)
            .await
            .map_err(fail("creation date"))?;
        let category = svc
            .project_category(session, self.language_code, quote_id)
            .await
            .map_err(fail("project category"))?;
        let customer_id = svc
            .customer_id(session, quote_id)
            .await
            .map_err(fail("customer id"))?;
        let customer_name = svc
            .customer_full_name(session, customer_id)
            .await
            .map_err(fail("customer name"))?;
        let project_manager_id = svc
            .project_manager_id(session, quote_id)
            .await
            .map_err(fail("project manager id"))?;
        let project_manager_email = svc
            .resource_email(session, project_manager_id)
            .await
            .map_err(fail("project manager email"))?;
        let currency = svc
            .currency(session, quote_id)
            .await
            .map_err(fail("currency"))?;

        Ok(QuoteSummary {
            retrieved_on: self.retrieved_on,
            quote_id: quote.quote_id,
            quote_number: quote.quote_number,
            project_name: quote.project_name,
            project_subject: quote.subject,
            status: quote.status,
            created,
            category,
            customer_id,
            customer_name,
            project_manager_id,
            project_manager_email,
            currency,
        })
    }

    /// Enrich every id in order. Failed ids are logged and returned separately.
    pub async fn enrich_all(&self, quote_ids: &[i64]) -> (Vec<QuoteSummary>, Vec<i64>) {
        let mut summaries = Vec::with_capacity(quote_ids.len());
        let mut failed = Vec::new();

        for &quote_id in quote_ids {
            match self.enrich(quote_id).await {
                Ok(summary) => {
                    tracing::debug!(quote_id, number = %summary.quote_number, "Quote enriched");
                    summaries.push(summary);
                }
                Err(e) => {
                    tracing::warn!(quote_id, step = e.step, "{e}");
                    failed.push(quote_id);
                }
            }
        }

        tracing::info!(
            enriched = summaries.len(),
            failed = failed.len(),
            total = quote_ids.len(),
            "Enrichment complete"
        );
        (summaries, failed)
    }
}
