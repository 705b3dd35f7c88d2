//! Runtime configuration.
//!
//! Configuration is loaded from `DECAL_*` environment variables; this is
//! the canonical runtime configuration path for container deployments.
//! Every component receives its settings through explicit construction,
//! never through process-wide singletons.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::observability::LogFormat;

/// Object storage configuration (bucket addressing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding template bundles (read-only for this system).
    pub templates_bucket: String,
    /// Bucket receiving finished design artifacts (write-only).
    pub designs_bucket: String,
    /// Storage region, used for public artifact URL construction.
    pub region: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            templates_bucket: "decal-templates".to_string(),
            designs_bucket: "decal-designs".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

/// Order platform admin API configuration.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AdminApiConfig {
    /// GraphQL endpoint of the order platform admin API.
    pub endpoint: String,
    /// Access token sent with every admin API request.
    pub token: String,
}

impl std::fmt::Debug for AdminApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminApiConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for Decal components.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port for the live ingestion adapter.
    pub http_port: u16,

    /// Log output format.
    #[serde(skip)]
    pub log_format: LogFormat,

    /// Object storage settings.
    pub storage: StorageConfig,

    /// Order platform admin API settings.
    pub admin: AdminApiConfig,

    /// Shared secret used to verify inbound webhook signatures.
    ///
    /// Required by the live adapter; the replay CLI does not use it.
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("log_format", &self.log_format)
            .field("storage", &self.storage)
            .field("admin", &self.admin)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            log_format: LogFormat::default(),
            storage: StorageConfig::default(),
            admin: AdminApiConfig::default(),
            webhook_secret: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `DECAL_HTTP_PORT`
    /// - `DECAL_LOG_FORMAT` (`json` | `pretty`)
    /// - `DECAL_TEMPLATES_BUCKET`
    /// - `DECAL_DESIGNS_BUCKET`
    /// - `DECAL_STORAGE_REGION`
    /// - `DECAL_ADMIN_API_URL`
    /// - `DECAL_ADMIN_API_TOKEN`
    /// - `DECAL_WEBHOOK_SECRET`
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("DECAL_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(format) = env_string("DECAL_LOG_FORMAT") {
            config.log_format = parse_log_format("DECAL_LOG_FORMAT", &format)?;
        }
        if let Some(bucket) = env_string("DECAL_TEMPLATES_BUCKET") {
            config.storage.templates_bucket = bucket;
        }
        if let Some(bucket) = env_string("DECAL_DESIGNS_BUCKET") {
            config.storage.designs_bucket = bucket;
        }
        if let Some(region) = env_string("DECAL_STORAGE_REGION") {
            config.storage.region = region;
        }
        if let Some(endpoint) = env_string("DECAL_ADMIN_API_URL") {
            config.admin.endpoint = endpoint;
        }
        if let Some(token) = env_string("DECAL_ADMIN_API_TOKEN") {
            config.admin.token = token;
        }
        config.webhook_secret = env_string("DECAL_WEBHOOK_SECRET");

        Ok(config)
    }

    /// Validates the settings the live ingestion adapter requires.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing `DECAL_*` variable.
    pub fn validate_for_server(&self) -> Result<()> {
        if self
            .webhook_secret
            .as_deref()
            .is_none_or(|secret| secret.trim().is_empty())
        {
            return Err(Error::InvalidInput(
                "DECAL_WEBHOOK_SECRET is required for the webhook server".to_string(),
            ));
        }
        self.validate_for_admin_api()
    }

    /// Validates the settings any order-platform access requires.
    ///
    /// # Errors
    ///
    /// Returns an error naming the missing `DECAL_*` variable.
    pub fn validate_for_admin_api(&self) -> Result<()> {
        if self.admin.endpoint.trim().is_empty() {
            return Err(Error::InvalidInput(
                "DECAL_ADMIN_API_URL is required".to_string(),
            ));
        }
        if self.admin.token.trim().is_empty() {
            return Err(Error::InvalidInput(
                "DECAL_ADMIN_API_TOKEN is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn parse_log_format(name: &str, value: &str) -> Result<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogFormat::Json),
        "pretty" => Ok(LogFormat::Pretty),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be one of: json, pretty (got {value})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_for_tests() {
        let config = Config::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.storage.templates_bucket, "decal-templates");
        assert_eq!(config.storage.designs_bucket, "decal-designs");
    }

    #[test]
    fn parse_log_format_accepts_known_values() -> Result<()> {
        assert!(matches!(
            parse_log_format("TEST", "json")?,
            LogFormat::Json
        ));
        assert!(matches!(
            parse_log_format("TEST", "PRETTY")?,
            LogFormat::Pretty
        ));
        Ok(())
    }

    #[test]
    fn parse_log_format_rejects_unknown_value() {
        let err = parse_log_format("TEST", "yaml").unwrap_err();
        let Error::InvalidInput(message) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(message.contains("TEST"));
        assert!(message.contains("yaml"));
    }

    #[test]
    fn server_validation_requires_webhook_secret() {
        let mut config = Config {
            webhook_secret: None,
            ..Config::default()
        };
        config.admin.endpoint = "https://example.test/graphql".to_string();
        config.admin.token = "token".to_string();

        let err = config.validate_for_server().unwrap_err();
        let Error::InvalidInput(message) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(message.contains("DECAL_WEBHOOK_SECRET"));
    }

    #[test]
    fn admin_validation_names_missing_variable() {
        let config = Config::default();
        let err = config.validate_for_admin_api().unwrap_err();
        let Error::InvalidInput(message) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(message.contains("DECAL_ADMIN_API_URL"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = Config::default();
        config.admin.token = "super-secret".to_string();
        config.webhook_secret = Some("hush".to_string());

        let rendered = format!("{config:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hush"));
    }
}
