use std::sync::Arc;

use quote_digest::config::DigestConfig;
use quote_digest::mail::{LogMailer, Mailer, SmtpMailer};
use quote_digest::pipeline::PipelineDriver;
use quote_digest::schedule;
use quote_digest::service::{Credentials, PlunetClient, QuoteService};

#[tokio::main]
async fn main() -> quote_digest::error::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DigestConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  Required: PLUNET_BASE_URL, PLUNET_API_USER, PLUNET_API_PASSWORD,");
        eprintln!("            SMTP_SERVER, SENDER_EMAIL, SENDER_PASSWORD");
        std::process::exit(1);
    });

    // Validate the schedule before touching the network.
    let cron_schedule = config
        .schedule
        .as_deref()
        .map(schedule::parse_schedule)
        .transpose()?;

    eprintln!("📬 Quote Digest v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Plunet: {}", config.service.base_url);
    eprintln!("   SMTP: {}:{}", config.smtp.host, config.smtp.port);
    eprintln!(
        "   Mode: {}{}\n",
        config.schedule.as_deref().map_or("single run".to_string(), |s| format!("cron '{s}'")),
        if config.dry_run { " (dry run)" } else { "" }
    );

    let service: Arc<dyn QuoteService> = Arc::new(PlunetClient::new(&config.service)?);
    let mailer: Arc<dyn Mailer> = if config.dry_run {
        Arc::new(LogMailer)
    } else {
        Arc::new(SmtpMailer::new(config.smtp.clone()))
    };

    let credentials = Credentials {
        username: config.service.username.clone(),
        password: config.service.password.clone(),
    };
    let driver = PipelineDriver::new(service, mailer, credentials, config.language.clone());

    match cron_schedule {
        Some(cron_schedule) => schedule::run_scheduled(&driver, cron_schedule).await,
        None => {
            driver.run().await?;
        }
    }

    Ok(())
}
