//! Configuration management for the MIS client.
//!
//! Configuration is a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MIS_*` environment overrides
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "staging"
//!
//! [application]
//! log_level = "info"
//!
//! [mis]
//! base_url = "https://api.infoclinica.ru/api/xml"
//! external_system_id = "CRM_IDEAV"
//! clinic_host = "demo.infoclinica.ru"
//! default_branch_id = 1
//!
//! [mis.tls]
//! client_cert = "client.crt"
//! client_key = "${MIS_CLIENT_KEY_PATH}"
//! accept_invalid_certs = false
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! ```
//!
//! The resulting [`MisConfig`] is an immutable value handed to
//! [`MisClient::new`](crate::adapters::mis::MisClient::new); there is no
//! global configuration state.

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AppConfig, ApplicationConfig, Environment, LoggingConfig, MisConfig, TlsConfig,
    DEFAULT_BASE_URL,
};
