use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub database_url: String,
    pub deep_link_scheme: String,
    pub slot_interval_minutes: u32,
    pub payment_settle_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "pangkas.db".to_string()),
            deep_link_scheme: env::var("DEEP_LINK_SCHEME").unwrap_or_else(|_| "pangkas".to_string()),
            slot_interval_minutes: env::var("SLOT_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60),
            payment_settle_delay_ms: env::var("PAYMENT_SETTLE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}
