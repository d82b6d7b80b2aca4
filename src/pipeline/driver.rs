//! Pipeline driver — authenticate, find, enrich, group, send.

use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::error::PipelineError;
use crate::mail::Mailer;
use crate::pipeline::auth::authenticate;
use crate::pipeline::digest::dispatch;
use crate::pipeline::enricher::QuoteEnricher;
use crate::pipeline::finder::{find_open_quotes, preparation_filter};
use crate::pipeline::grouper::group_by_manager;
use crate::service::{Credentials, QuoteService};

/// Outcome of one run, for the closing log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Quote ids returned by the search.
    pub candidates: usize,
    pub enriched: usize,
    /// Quote ids dropped during enrichment.
    pub failed_quotes: Vec<i64>,
    /// Quote numbers with no manager email.
    pub unassigned: Vec<String>,
    /// Recipients whose digest was accepted by the mailer.
    pub delivered: Vec<String>,
    pub failed_recipients: Vec<String>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates, {} enriched, {} failed, {} unassigned, {} digests sent, {} not sent",
            self.candidates,
            self.enriched,
            self.failed_quotes.len(),
            self.unassigned.len(),
            self.delivered.len(),
            self.failed_recipients.len(),
        )
    }
}

/// Runs the digest pipeline against injected service and mailer.
pub struct PipelineDriver {
    service: Arc<dyn QuoteService>,
    mailer: Arc<dyn Mailer>,
    credentials: Credentials,
    language_code: String,
}

impl PipelineDriver {
    pub fn new(
        service: Arc<dyn QuoteService>,
        mailer: Arc<dyn Mailer>,
        credentials: Credentials,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            service,
            mailer,
            credentials,
            language_code: language_code.into(),
        }
    }

    /// Run once for the current local date.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        self.run_on(Local::now().date_naive()).await
    }

    /// Run once as of `today`.
    ///
    /// Only a failed login is returned as an error; every other failure
    /// skips the affected quote or recipient.
    pub async fn run_on(&self, today: NaiveDate) -> Result<RunReport, PipelineError> {
        let service = self.service.as_ref();
        let session = authenticate(service, &self.credentials).await?;

        let filter = preparation_filter(&self.language_code, today);
        let quote_ids = find_open_quotes(service, &session, &filter).await;

        let enricher = QuoteEnricher::new(service, &session, &self.language_code, today);
        let (summaries, failed_quotes) = enricher.enrich_all(&quote_ids).await;
        let enriched = summaries.len();

        let grouping = group_by_manager(summaries);

        let mut report = RunReport {
            candidates: quote_ids.len(),
            enriched,
            failed_quotes,
            unassigned: grouping.unassigned,
            ..Default::default()
        };

        for group in &grouping.groups {
            match dispatch(self.mailer.as_ref(), group, today).await {
                Ok(()) => report.delivered.push(group.email().to_string()),
                Err(failure) => report.failed_recipients.push(failure.recipient),
            }
        }

        tracing::info!("Run complete: {report}");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::mail::recording::RecordingMailer;
    use crate::pipeline::types::fixtures::today;
    use crate::service::SearchResult;
    use crate::service::stub::StubService;

    fn driver(service: Arc<StubService>, mailer: Arc<RecordingMailer>) -> PipelineDriver {
        PipelineDriver::new(
            service,
            mailer,
            Credentials {
                username: "api".into(),
                password: SecretString::from("pw".to_string()),
            },
            "EN",
        )
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_stop_other_recipients() {
        let service = Arc::new(
            StubService::default()
                .with_quote(1, "Acme", "a@example.com")
                .with_quote(2, "Beta", "b@example.com")
                .with_quote(3, "Gamma", "c@example.com"),
        );
        let mailer = Arc::new(RecordingMailer::default().failing_for("b@example.com"));

        let report = driver(service, Arc::clone(&mailer)).run_on(today()).await.unwrap();
        assert_eq!(report.delivered, vec!["a@example.com", "c@example.com"]);
        assert_eq!(report.failed_recipients, vec!["b@example.com"]);
        assert_eq!(mailer.recipients(), vec!["a@example.com", "c@example.com"]);
    }

    #[tokio::test]
    async fn search_failure_status_degrades_to_empty_run() {
        let service = Arc::new(StubService {
            search: Some(SearchResult {
                return_code: -5,
                data: vec![],
            }),
            ..StubService::default().with_quote(1, "Acme", "a@example.com")
        });
        let mailer = Arc::new(RecordingMailer::default());

        let report = driver(Arc::clone(&service), Arc::clone(&mailer))
            .run_on(today())
            .await
            .unwrap();
        assert_eq!(report, RunReport::default());
        assert_eq!(service.calls(), vec!["login", "search"]);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn search_transport_error_degrades_to_empty_run() {
        let service = Arc::new(
            StubService::default()
                .with_quote(1, "Acme", "a@example.com")
                .failing_on("search", 0),
        );
        let mailer = Arc::new(RecordingMailer::default());

        let report = driver(service, mailer).run_on(today()).await.unwrap();
        assert_eq!(report.candidates, 0);
        assert!(report.delivered.is_empty());
    }

    #[tokio::test]
    async fn unassigned_quotes_are_reported() {
        let service = Arc::new(
            StubService::default()
                .with_quote(1, "Acme", "")
                .with_quote(2, "Beta", "pm@example.com"),
        );
        let mailer = Arc::new(RecordingMailer::default());

        let report = driver(service, mailer).run_on(today()).await.unwrap();
        assert_eq!(report.enriched, 2);
        assert_eq!(report.unassigned, vec!["Q-1"]);
        assert_eq!(report.delivered, vec!["pm@example.com"]);
    }

    #[test]
    fn report_summary_line() {
        let report = RunReport {
            candidates: 3,
            enriched: 2,
            failed_quotes: vec![9],
            unassigned: vec![],
            delivered: vec!["a@example.com".into()],
            failed_recipients: vec![],
        };
        assert_eq!(
            report.to_string(),
            "3 candidates, 2 enriched, 1 failed, 0 unassigned, 1 digests sent, 0 not sent"
        );
    }
}
