//! Candidate search for quotes still in preparation.

use chrono::{Months, NaiveDate};

use crate::service::{
    DATE_RELATION_WITHIN, QUOTE_STATUS_PREPARATION, QuoteSearchFilter, QuoteService, Session,
    TimeFrame,
};

/// Filter for preparation-status quotes created in the year up to `today`.
pub fn preparation_filter(language_code: &str, today: NaiveDate) -> QuoteSearchFilter {
    let date_from = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);

    QuoteSearchFilter {
        language_code: language_code.to_string(),
        quote_status: QUOTE_STATUS_PREPARATION,
        time_frame: TimeFrame {
            date_from,
            date_relation: DATE_RELATION_WITHIN,
            date_to: today,
        },
    }
}

/// Run the search and return matching quote ids.
///
/// Degrades to an empty list when the call fails or reports a non-zero
/// status; the run then simply has nothing to send.
pub async fn find_open_quotes(
    service: &dyn QuoteService,
    session: &Session,
    filter: &QuoteSearchFilter,
) -> Vec<i64> {
    match service.search_quotes(session, filter).await {
        Ok(result) if result.is_success() => {
            tracing::info!(
                count = result.data.len(),
                from = %filter.time_frame.date_from,
                to = %filter.time_frame.date_to,
                "Found open quotes"
            );
            result.data
        }
        Ok(result) => {
            tracing::warn!(
                return_code = result.return_code,
                "Quote search returned non-success status, treating as no quotes"
            );
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Failed to retrieve quotes: {e}");
            Vec::new()
        }
    }
}
