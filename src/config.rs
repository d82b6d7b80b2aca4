//! Configuration types, read once from the environment at process start.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default SMTP submission port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default request timeout for quote service calls.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Plunet quote service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base address, e.g. `https://plunet.example.com/`. Endpoint names are appended.
    pub base_url: String,
    pub username: String,
    pub password: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Outbound mail settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Sender address, also used as the SMTP login.
    pub sender: String,
    pub password: SecretString,
}

/// Full job configuration.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    pub service: ServiceConfig,
    pub smtp: SmtpConfig,
    /// Language code sent with search and category lookups.
    pub language: String,
    /// Cron expression; `None` runs the pipeline once.
    pub schedule: Option<String>,
    /// Log digests instead of sending them.
    pub dry_run: bool,
}

impl DigestConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        let mut base_url = required("PLUNET_BASE_URL")?;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let timeout_secs = parse_or("QUOTE_DIGEST_HTTP_TIMEOUT_SECS", &lookup, DEFAULT_HTTP_TIMEOUT_SECS)?;
        let service = ServiceConfig {
            base_url,
            username: required("PLUNET_API_USER")?,
            password: SecretString::from(required("PLUNET_API_PASSWORD")?),
            timeout: Duration::from_secs(timeout_secs),
        };

        let smtp = SmtpConfig {
            host: required("SMTP_SERVER")?,
            port: parse_or("SMTP_PORT", &lookup, DEFAULT_SMTP_PORT)?,
            sender: required("SENDER_EMAIL")?,
            password: SecretString::from(required("SENDER_PASSWORD")?),
        };

        let language = lookup("QUOTE_DIGEST_LANGUAGE")
            .map(|v| v.trim().to_uppercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "EN".to_string());

        let schedule = lookup("QUOTE_DIGEST_SCHEDULE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let dry_run = match lookup("QUOTE_DIGEST_DRY_RUN") {
            None => false,
            Some(v) => match v.trim().to_lowercase().as_str() {
                "" | "0" | "false" | "no" => false,
                "1" | "true" | "yes" => true,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "QUOTE_DIGEST_DRY_RUN".into(),
                        message: format!("expected true/false, got {other:?}"),
                    });
                }
            },
        };

        Ok(Self {
            service,
            smtp,
            language,
            schedule,
            dry_run,
        })
    }
}

fn parse_or<F, T>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|v| v.trim().to_string()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}
