//! Domain error types
//!
//! This module defines the error hierarchy for the MIS client. Only
//! infrastructure failures are errors: a call that reached the remote service
//! and was rejected there is reported through
//! [`OperationStatus`](super::outcome::OperationStatus), not through these types.

use thiserror::Error;

/// Main MIS client error type
///
/// Wraps the specific failure kinds and never exposes third-party types.
#[derive(Debug, Error)]
pub enum MisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Client certificate or private key could not be loaded
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Network or HTTP-level failures
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body is not a well-formed protocol document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input supplied by the caller
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure while serializing a request document
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Transport-level failures
///
/// One network attempt is made per call, so each of these ends the call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the fixed request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Connection could not be established or was interrupted
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Server answered with a non-2xx status; the body is kept as received
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },
}

impl TransportError {
    /// Returns the HTTP status code, if this is an HTTP error
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the preserved response body, if this is an HTTP error
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MisError {
    fn from(err: std::io::Error) -> Self {
        MisError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MisError {
    fn from(err: serde_json::Error) -> Self {
        MisError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MisError {
    fn from(err: toml::de::Error) -> Self {
        MisError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<quick_xml::Error> for MisError {
    fn from(err: quick_xml::Error) -> Self {
        MisError::Parse(err.to_string())
    }
}
