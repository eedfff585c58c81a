//! Client credential material for mutual TLS
//!
//! The certificate and private key are read once when the transport is
//! built. Key bytes live in a [`SecretVec`] and are zeroed on drop.

use crate::config::TlsConfig;
use crate::domain::{MisError, Result};
use reqwest::{Certificate, Identity};
use secrecy::{ExposeSecret, Secret, SecretVec};
use std::fmt;
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

/// PEM client certificate and private key
pub struct ClientCredentials {
    certificate: Vec<u8>,
    private_key: SecretVec<u8>,
}

impl ClientCredentials {
    /// Wraps already loaded PEM material
    pub fn from_pem(certificate: Vec<u8>, private_key: Vec<u8>) -> Self {
        Self {
            certificate,
            private_key: Secret::new(private_key),
        }
    }

    /// Reads the certificate and key files
    ///
    /// # Errors
    ///
    /// Returns [`MisError::Credentials`] if either file is missing,
    /// unreadable or not PEM.
    pub fn load(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<Self> {
        let certificate = read_pem(cert_path.as_ref(), "client certificate")?;
        let private_key = read_pem(key_path.as_ref(), "private key")?;

        tracing::debug!(
            cert_path = %cert_path.as_ref().display(),
            "Loaded client credentials"
        );

        Ok(Self::from_pem(certificate, private_key))
    }

    /// Loads the identity configured in `tls`, if any
    pub fn from_config(tls: &TlsConfig) -> Result<Option<Self>> {
        match (&tls.client_cert, &tls.client_key) {
            (Some(cert), Some(key)) => Self::load(cert, key).map(Some),
            (None, None) => Ok(None),
            _ => Err(MisError::Credentials(
                "client_cert and client_key must be configured together".to_string(),
            )),
        }
    }

    /// Builds the TLS identity presented during the handshake
    pub fn identity(&self) -> Result<Identity> {
        let mut pem = Zeroizing::new(Vec::with_capacity(
            self.certificate.len() + self.private_key.expose_secret().len() + 1,
        ));
        pem.extend_from_slice(&self.certificate);
        pem.push(b'\n');
        pem.extend_from_slice(self.private_key.expose_secret());

        Identity::from_pem(&pem)
            .map_err(|e| MisError::Credentials(format!("Invalid client identity: {e}")))
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Loads a PEM CA certificate used to verify the server
pub fn load_ca_certificate(path: impl AsRef<Path>) -> Result<Certificate> {
    let pem = read_pem(path.as_ref(), "CA certificate")?;
    Certificate::from_pem(&pem)
        .map_err(|e| MisError::Credentials(format!("Invalid CA certificate: {e}")))
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| {
        MisError::Credentials(format!("Failed to read {what} {}: {e}", path.display()))
    })?;

    if !bytes.windows(11).any(|w| w == b"-----BEGIN ") {
        return Err(MisError::Credentials(format!(
            "{what} {} is not PEM encoded",
            path.display()
        )));
    }

    Ok(bytes)
}
