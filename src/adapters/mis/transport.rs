//! HTTPS transport with mutual TLS
//!
//! One POST per call, no retries. Idle connections are not pooled, so every
//! call opens its own TLS session and closes it when the response has been
//! read.

use super::credentials::{load_ca_certificate, ClientCredentials};
use crate::config::MisConfig;
use crate::domain::{MisError, Result, TransportError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Fixed per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Content type of request documents
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Header naming the clinic portal host on branch-scoped calls
pub const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// Sends a request document and returns the raw response body
#[async_trait]
pub trait MisTransport: Send + Sync {
    /// Posts `document` to the MIS
    ///
    /// `branch_scoped` adds the host-forwarding header for the configured
    /// clinic.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] (wrapped in [`MisError::Transport`]) on
    /// timeout, connection failure or a non-2xx status.
    async fn send(&self, document: String, branch_scoped: bool) -> Result<Vec<u8>>;

    /// Endpoint the transport posts to
    fn endpoint(&self) -> &str;
}

/// reqwest-backed transport used in production
#[derive(Debug)]
pub struct HttpsTransport {
    client: Client,
    endpoint: String,
    forwarded_host: HeaderValue,
}

impl HttpsTransport {
    /// Builds the transport, loading credential material from disk
    ///
    /// # Errors
    ///
    /// Returns [`MisError::Credentials`] if the certificate, key or CA file
    /// cannot be loaded, [`MisError::Configuration`] for invalid settings.
    pub fn new(config: &MisConfig) -> Result<Self> {
        let credentials = ClientCredentials::from_config(&config.tls)?;
        Self::with_credentials(config, credentials)
    }

    /// Builds the transport from already loaded credentials
    pub fn with_credentials(
        config: &MisConfig,
        credentials: Option<ClientCredentials>,
    ) -> Result<Self> {
        Self::with_timeout(config, credentials, REQUEST_TIMEOUT)
    }

    /// Builds the transport with a non-default per-request timeout
    pub(crate) fn with_timeout(
        config: &MisConfig,
        credentials: Option<ClientCredentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_max_idle_per_host(0);

        match credentials {
            Some(credentials) => {
                client_builder = client_builder.identity(credentials.identity()?);
            }
            None => {
                tracing::warn!(
                    endpoint = %config.base_url,
                    "No client certificate configured, requests are sent without a TLS identity"
                );
            }
        }

        if let Some(ref ca_path) = config.tls.ca_cert {
            client_builder = client_builder.add_root_certificate(load_ca_certificate(ca_path)?);
        }

        if config.tls.accept_invalid_certs {
            tracing::warn!(
                endpoint = %config.base_url,
                "Server certificate verification is DISABLED; use only against test endpoints"
            );
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| MisError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let forwarded_host = HeaderValue::from_str(&config.clinic_host).map_err(|e| {
            MisError::Configuration(format!(
                "Invalid clinic host '{}': {e}",
                config.clinic_host
            ))
        })?;

        Ok(Self {
            client,
            endpoint: config.base_url.clone(),
            forwarded_host,
        })
    }

    fn headers(&self, branch_scoped: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/xml"));
        if branch_scoped {
            headers.insert(
                HeaderName::from_static(FORWARDED_HOST_HEADER),
                self.forwarded_host.clone(),
            );
        }
        headers
    }
}

#[async_trait]
impl MisTransport for HttpsTransport {
    async fn send(&self, document: String, branch_scoped: bool) -> Result<Vec<u8>> {
        tracing::debug!(
            endpoint = %self.endpoint,
            branch_scoped = branch_scoped,
            bytes = document.len(),
            "Sending request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers(branch_scoped))
            .body(document)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(classify_error)?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(
                status = status.as_u16(),
                body = %body.chars().take(500).collect::<String>(),
                "MIS returned an HTTP error"
            );
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Received response");
        Ok(body.to_vec())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify_error(err: reqwest::Error) -> MisError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string()).into()
    } else {
        TransportError::Connection(err.to_string()).into()
    }
}
