//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::NotifyError;

pub const ENV_API_KEY: &str = "RESEND_API_KEY";
pub const ENV_EMAIL_TO: &str = "NOTIFY_EMAIL_TO";
pub const ENV_EMAIL_FROM: &str = "NOTIFY_EMAIL_FROM";
pub const ENV_API_URL: &str = "RESEND_API_URL";

/// Variables the notifier needs on every request, in reporting order.
pub const REQUIRED_NOTIFY_VARS: [&str; 3] = [ENV_API_KEY, ENV_EMAIL_TO, ENV_EMAIL_FROM];

/// Default base URL of the transactional email API.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";

/// Delivery settings for one notification.
///
/// Built fresh per request; nothing here is cached between requests.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Email service credential.
    pub api_key: SecretString,
    /// Single recipient for notifications.
    pub recipient: String,
    /// Sender address, optionally with a display name.
    pub sender: String,
    /// Base URL of the email API.
    pub api_base_url: String,
}

impl NotifyConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// Unset and empty values both count as missing. If any required value
    /// is missing, every missing name is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_NOTIFY_VARS
            .into_iter()
            .filter(|key| read(*key).is_none())
            .map(|key| key.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(NotifyError::MisconfiguredEnvironment { missing });
        }

        let api_key = read(ENV_API_KEY).unwrap_or_default();
        let recipient = read(ENV_EMAIL_TO).unwrap_or_default();
        let sender = read(ENV_EMAIL_FROM).unwrap_or_default();
        let api_base_url = read(ENV_API_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string());

        Ok(Self {
            api_key: SecretString::from(api_key),
            recipient,
            sender,
            api_base_url,
        })
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = std::env::var("VALENTINE_BIND").unwrap_or(defaults.bind);
        let port: u16 = std::env::var("VALENTINE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        Self { bind, port }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Card session (client side) settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the envelope opening plays before the card appears.
    pub open_delay: Duration,
    /// Return the submission guard to idle after a failed send.
    ///
    /// Off by default: one attempt per session, even on failure.
    pub retry_after_failure: bool,
    /// Base URL of the server the card posts its answer to.
    pub server_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            open_delay: Duration::from_millis(1400),
            retry_after_failure: false,
            server_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

impl SessionConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let open_delay = std::env::var("VALENTINE_OPEN_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.open_delay);

        let server_url = std::env::var("VALENTINE_SERVER_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.server_url);

        Self {
            open_delay,
            server_url,
            ..defaults
        }
    }
}
