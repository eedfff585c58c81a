//! Configuration schema types

use serde::{Deserialize, Serialize};
use url::Url;

/// Default MIS integration endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.infoclinica.ru/api/xml";

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Root configuration, mapped from the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// MIS endpoint and identity
    pub mis: MisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.mis.validate(&self.environment)?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Static configuration of one MIS client
///
/// A client is bound to a single endpoint and clinic. Several clients with
/// different configurations can live in one process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MisConfig {
    /// Full URL of the XML endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Identifier of this system as agreed with the MIS operator (`MSH.3`)
    pub external_system_id: String,

    /// Clinic host on the portal, sent as `X-Forwarded-Host` on branch-scoped calls
    pub clinic_host: String,

    /// Branch used for change-list retrieval when the caller names none
    pub default_branch_id: i64,

    /// Client certificate and server verification settings
    #[serde(default)]
    pub tls: TlsConfig,
}

impl MisConfig {
    pub(crate) fn validate(&self, environment: &Environment) -> Result<(), String> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("mis.base_url '{}' is not a valid URL: {e}", self.base_url))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("mis.base_url must start with http:// or https://".to_string());
        }

        if self.external_system_id.trim().is_empty() {
            return Err("mis.external_system_id cannot be empty".to_string());
        }

        if self.clinic_host.trim().is_empty() {
            return Err("mis.clinic_host cannot be empty".to_string());
        }

        if self.clinic_host.contains("://") || self.clinic_host.ends_with('/') {
            return Err(format!(
                "mis.clinic_host must be a bare host name without scheme or trailing slash, got '{}'",
                self.clinic_host
            ));
        }

        self.tls.validate(environment, url.scheme() == "https")
    }
}

/// TLS settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to the PEM client certificate issued by the MIS operator
    #[serde(default)]
    pub client_cert: Option<String>,

    /// Path to the PEM private key matching `client_cert`
    #[serde(default)]
    pub client_key: Option<String>,

    /// Optional PEM CA certificate for a private server CA
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Skip server certificate verification
    ///
    /// **SECURITY WARNING**: setting this to `true` exposes the connection to
    /// man-in-the-middle attacks. It exists for test and staging endpoints
    /// with self-signed certificates only and is rejected when
    /// `environment = "production"`. Prefer `ca_cert`. Default: `false`.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl TlsConfig {
    fn validate(&self, environment: &Environment, https: bool) -> Result<(), String> {
        match (&self.client_cert, &self.client_key) {
            (Some(_), None) => {
                return Err("mis.tls.client_key is required when client_cert is set".to_string())
            }
            (None, Some(_)) => {
                return Err("mis.tls.client_cert is required when client_key is set".to_string())
            }
            (None, None) if https => {
                return Err(
                    "mis.tls.client_cert and mis.tls.client_key are required for https endpoints"
                        .to_string(),
                )
            }
            _ => {}
        }

        if *environment == Environment::Production && self.accept_invalid_certs {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'accept_invalid_certs = false' or provide the server CA using 'ca_cert'."
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Whether both halves of the client identity are configured
    pub fn has_client_identity(&self) -> bool {
        self.client_cert.is_some() && self.client_key.is_some()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
