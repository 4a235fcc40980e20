//! API configuration

use serde::Deserialize;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_JWT_SECRET` or `API_INVOICE_DUE_DAYS`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// JWT secret for signing access and refresh tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_secs: u64,
    /// Log level or `EnvFilter` directive
    pub log_level: String,
    pub log_format: LogFormat,
    /// Upper bound of the database pool
    pub max_connections: u32,
    /// Seconds a request waits for a pooled connection
    pub db_acquire_timeout_secs: u64,
    /// Days between issue and due date of invoices emitted on acceptance
    pub invoice_due_days: u32,
    /// Currency code written into QR payment payloads
    pub currency: String,
    /// Username of the administrator created on start, if missing
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/univida".to_string(),
            jwt_secret: "change-me-in-production".to_string(),
            access_token_secs: 300,
            refresh_token_secs: 86_400,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            max_connections: 10,
            db_acquire_timeout_secs: 30,
            invoice_due_days: 15,
            currency: "BOB".to_string(),
            admin_username: None,
            admin_password: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    ///
    /// Variables that are not set keep their default value.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Bootstrap administrator credentials, when both are configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (self.admin_username.as_deref(), self.admin_password.as_deref()) {
            (Some(username), Some(password)) if !username.trim().is_empty() => Some((username, password)),
            _ => None,
        }
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.access_token_secs, 300);
        assert_eq!(config.refresh_token_secs, 86_400);
        assert_eq!(config.invoice_due_days, 15);
        assert_eq!(config.currency, "BOB");
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(config.admin_credentials().is_none());
    }

    #[test]
    fn test_admin_credentials_need_both_fields() {
        let partial = ApiConfig {
            admin_username: Some("admin".to_string()),
            ..ApiConfig::default()
        };
        assert!(partial.admin_credentials().is_none());

        let full = ApiConfig {
            admin_password: Some("adminpassword123".to_string()),
            ..partial
        };
        assert_eq!(full.admin_credentials(), Some(("admin", "adminpassword123")));
    }

    #[test]
    fn test_log_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
