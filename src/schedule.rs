//! Cron-driven repetition of the pipeline.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::ConfigError;
use crate::pipeline::PipelineDriver;

/// Parse a cron expression (seconds field first, as the `cron` crate expects).
pub fn parse_schedule(expr: &str) -> Result<cron::Schedule, ConfigError> {
    cron::Schedule::from_str(expr).map_err(|e| ConfigError::InvalidValue {
        key: "QUOTE_DIGEST_SCHEDULE".into(),
        message: format!("invalid cron: {e}"),
    })
}

/// Next fire time strictly after now, if the schedule has one.
pub fn next_fire(schedule: &cron::Schedule) -> Option<DateTime<Local>> {
    schedule.upcoming(Local).next()
}

/// Run the pipeline at every fire time until Ctrl-C.
///
/// Each run is independent. A failed login is logged and the loop waits
/// for the next fire time.
pub async fn run_scheduled(driver: &PipelineDriver, schedule: cron::Schedule) {
    loop {
        let Some(next) = next_fire(&schedule) else {
            tracing::warn!("Schedule has no upcoming fire times, stopping");
            return;
        };
        let wait = (next - Local::now()).to_std().unwrap_or(Duration::ZERO);
        tracing::info!("Next digest run at {}", next.format("%Y-%m-%d %H:%M:%S"));

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                return;
            }
        }

        if let Err(e) = driver.run().await {
            tracing::error!("Digest run aborted: {e}");
        }
    }
}
