//! Session login.

use crate::error::PipelineError;
use crate::service::{Credentials, QuoteService, Session};

/// Log in once for this run. Any failure is fatal to the run.
pub async fn authenticate(
    service: &dyn QuoteService,
    credentials: &Credentials,
) -> Result<Session, PipelineError> {
    match service.login(credentials).await {
        Ok(session) => {
            tracing::info!(user = %credentials.username, "Logged in to quote service");
            Ok(session)
        }
        Err(e) => {
            tracing::error!(user = %credentials.username, "Login failed: {e}");
            Err(PipelineError::Authentication(e))
        }
    }
}
