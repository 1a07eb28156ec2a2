//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use chrono::{FixedOffset, Local, Offset, Utc};
use std::env;
use std::time::Duration;

/// Which database the application talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Cloud Firestore (or its emulator when FIRESTORE_EMULATOR_HOST is set)
    Firestore,
    /// Process-local store, nothing persisted
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Database backend
    pub backend: Backend,
    /// Firebase Web API key. Without it, accounts live in memory.
    pub firebase_api_key: Option<String>,
    /// host:port of the Firebase Auth emulator
    pub auth_emulator_host: Option<String>,
    /// How often the daemon checks whether a reset is due
    pub reset_check_interval: Duration,
    /// Offset that defines calendar days for the daily reset
    pub reset_utc_offset: FixedOffset,
    /// Account the daemon signs in as, so its personal timers reset too
    pub reset_user: Option<ResetUser>,
}

/// Credentials of the account the reset daemon runs as.
#[derive(Clone)]
pub struct ResetUser {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for ResetUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetUser")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            backend: Backend::Memory,
            firebase_api_key: None,
            auth_emulator_host: None,
            reset_check_interval: Duration::from_secs(60),
            reset_utc_offset: Utc.fix(),
            reset_user: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend = match env::var("TIMERS_BACKEND")
            .unwrap_or_else(|_| "firestore".to_string())
            .to_lowercase()
            .as_str()
        {
            "firestore" => Backend::Firestore,
            "memory" => Backend::Memory,
            _ => return Err(ConfigError::Invalid("TIMERS_BACKEND")),
        };

        let reset_check_interval = Duration::from_secs(
            env::var("RESET_CHECK_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("RESET_CHECK_INTERVAL_SECS"))?,
        );

        let reset_utc_offset = match env::var("RESET_UTC_OFFSET_MINUTES") {
            Ok(minutes) => parse_offset_minutes(&minutes)
                .ok_or(ConfigError::Invalid("RESET_UTC_OFFSET_MINUTES"))?,
            Err(_) => Local::now().offset().fix(),
        };

        let reset_user = match (env::var("RESET_USER_EMAIL"), env::var("RESET_USER_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(ResetUser {
                email: email.trim().to_string(),
                password,
            }),
            (Ok(_), Err(_)) => return Err(ConfigError::Missing("RESET_USER_PASSWORD")),
            _ => None,
        };

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            backend,
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            auth_emulator_host: env::var("FIREBASE_AUTH_EMULATOR_HOST").ok(),
            reset_check_interval,
            reset_utc_offset,
            reset_user,
        })
    }
}

/// Parse a signed offset in minutes east of UTC ("-420" for UTC-7).
fn parse_offset_minutes(value: &str) -> Option<FixedOffset> {
    let minutes: i32 = value.trim().parse().ok()?;
    FixedOffset::east_opt(minutes.checked_mul(60)?)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
