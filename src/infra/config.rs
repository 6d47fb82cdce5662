use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

use crate::use_cases::recurring_billing::DEFAULT_OVERDUE_GRACE_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Run the billing scheduler in this process.
    pub billing_enabled: bool,
    pub billing_interval: std::time::Duration,
    /// Pending payments this many days past due are marked overdue.
    pub overdue_grace_days: u32,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default(
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 3001)),
        );
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);

        let billing_enabled: bool = get_env_default("BILLING_ENABLED", true);
        let billing_interval_hours: u64 = get_env_default("BILLING_INTERVAL_HOURS", 12);
        let overdue_grace_days: u32 =
            get_env_default("OVERDUE_GRACE_DAYS", DEFAULT_OVERDUE_GRACE_DAYS);

        let log_format: LogFormat = get_env_default("LOG_FORMAT", String::from("pretty"))
            .parse()
            .unwrap_or(LogFormat::Pretty);

        Self {
            jwt_secret,
            cors_origin,
            bind_addr,
            database_url,
            db_max_connections,
            billing_enabled,
            billing_interval: Self::billing_period(billing_interval_hours),
            overdue_grace_days,
            log_format,
        }
    }

    /// Scheduler period; zero hours falls back to one.
    fn billing_period(hours: u64) -> std::time::Duration {
        std::time::Duration::from_secs(hours.max(1).saturating_mul(3600))
    }
}
