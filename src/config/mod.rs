//! Typed configuration from environment variables.
//!
//! Loads once at startup. The classifier endpoint is optional; without
//! one the keyword fallback classifier is used. Sensitive values are
//! wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use secrecy::SecretString;

#[derive(Debug)]
pub struct Config {
    /// Path to the SQLite file holding the persisted ledger state.
    pub ledger_db: String,
    /// Endpoint of the external urgency service.
    pub classifier_url: Option<String>,
    /// API key for the urgency service.
    pub classifier_api_key: Option<SecretString>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Self {
        Self {
            ledger_db: std::env::var("REDRESS_LEDGER_DB")
                .unwrap_or_else(|_| "redress-ledger.db".to_string()),
            classifier_url: std::env::var("CLASSIFIER_URL").ok(),
            classifier_api_key: std::env::var("CLASSIFIER_API_KEY")
                .ok()
                .map(SecretString::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
