//! MIS operation client
//!
//! Each operation runs the same linear sequence: build the envelope, send it,
//! validate the acknowledgment and stored-procedure result, then extract the
//! payload. Nothing is retried and no step is revisited.
//!
//! Transport and parse failures end the call with `Err`. A response the MIS
//! produced but that reports a rejection is returned as `Ok` with a
//! non-success [`OperationStatus`](crate::domain::OperationStatus), so a
//! caller working through several calls can inspect it and continue.

use super::envelope::{EnvelopeBuilder, RequestBody};
use super::response::{self, XmlElement, CHANGE_EVENT_ELEMENT};
use super::transport::{HttpsTransport, MisTransport};
use crate::config::{Environment, MisConfig};
use crate::domain::{
    Acknowledgment, ChangeBatch, MessageType, MisError, OperationResult, PatientRecord,
    ProcedureResult, Registration, Result,
};
use std::sync::Arc;

/// Element carrying the patient code assigned by `CLIENT_ADD`
const PATIENT_CODE: &str = "PCODE";

/// Validated response of one call, before payload extraction
struct ValidatedResponse {
    document: XmlElement,
    acknowledgment: Acknowledgment,
    result: ProcedureResult,
    raw: String,
}

impl ValidatedResponse {
    fn is_success(&self) -> bool {
        self.acknowledgment.is_ok() && self.result.is_success()
    }

    fn into_result<T>(self, payload: T) -> OperationResult<T> {
        OperationResult {
            acknowledgment: self.acknowledgment,
            result: self.result,
            payload,
            raw_response: self.raw,
        }
    }
}

/// Client for the MIS XML integration API
///
/// # Example
///
/// ```no_run
/// use mis_client::adapters::mis::MisClient;
/// use mis_client::config::load_config;
/// use mis_client::domain::PatientRecord;
///
/// # async fn example() -> mis_client::domain::Result<()> {
/// let config = load_config("mis.toml")?;
/// let client = MisClient::new(config.mis)?;
///
/// let batch = client.retrieve_change_batch(None).await?;
/// if batch.is_success() {
///     println!("{} changes", batch.payload.len());
/// } else {
///     println!("rejected: {}", batch.status());
/// }
///
/// let patient = PatientRecord::new("Ivanov", "Ivan", "19850315");
/// let registration = client.register_patient(&patient).await?;
/// println!("PCODE = {}", registration.assigned_identifier());
/// # Ok(())
/// # }
/// ```
pub struct MisClient {
    transport: Arc<dyn MisTransport>,
    envelope: EnvelopeBuilder,
    default_branch_id: i64,
}

impl MisClient {
    /// Creates a client with the mutual-TLS transport
    ///
    /// The settings are validated with production rules, so disabling
    /// server certificate verification is refused here. Use
    /// [`MisClient::for_environment`] to opt in for a test endpoint.
    /// Credential files are read once and reused by every call.
    ///
    /// # Errors
    ///
    /// Returns [`MisError::Configuration`] if the settings are invalid, or
    /// [`MisError::Credentials`] if the credential material cannot be loaded.
    pub fn new(config: MisConfig) -> Result<Self> {
        Self::for_environment(config, &Environment::Production)
    }

    /// Creates a client, validating the settings for `environment`
    ///
    /// # Errors
    ///
    /// Same as [`MisClient::new`].
    pub fn for_environment(config: MisConfig, environment: &Environment) -> Result<Self> {
        config.validate(environment).map_err(|e| {
            MisError::Configuration(format!("Invalid MIS configuration: {e}"))
        })?;

        let transport = HttpsTransport::new(&config)?;
        tracing::info!(
            endpoint = %config.base_url,
            external_system_id = %config.external_system_id,
            clinic_host = %config.clinic_host,
            "MIS client initialized"
        );
        Ok(Self::with_transport(&config, Arc::new(transport)))
    }

    /// Creates a client over an arbitrary transport
    pub fn with_transport(config: &MisConfig, transport: Arc<dyn MisTransport>) -> Self {
        Self {
            transport,
            envelope: EnvelopeBuilder::new(config.external_system_id.clone()),
            default_branch_id: config.default_branch_id,
        }
    }

    /// Endpoint the client talks to
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Branch used when a change-list call names none
    pub fn default_branch_id(&self) -> i64 {
        self.default_branch_id
    }

    /// Retrieves one batch of patient-record change events (`CLIENTS_CHANGE_LIST`)
    ///
    /// `branch_id` falls back to the configured default branch. The record
    /// list is filled only when the call was acknowledged and the stored
    /// procedure returned success; otherwise it is empty and the result's
    /// status explains why.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or parse failure only.
    pub async fn retrieve_change_batch(&self, branch_id: Option<i64>) -> Result<ChangeBatch> {
        let message_type = MessageType::ClientsChangeList;
        let branch_id = branch_id.unwrap_or(self.default_branch_id);

        let body = self.envelope.build_change_list_body();
        let response = self.call(message_type, Some(branch_id), &body).await?;

        let records = if response.is_success() {
            response::extract_records(&response.document, CHANGE_EVENT_ELEMENT)
        } else {
            Vec::new()
        };

        tracing::info!(
            branch_id = branch_id,
            records = records.len(),
            result_code = response.result.code,
            "Change batch retrieved"
        );

        Ok(response.into_result(records))
    }

    /// Registers a new patient record (`CLIENT_ADD`)
    ///
    /// The assigned patient code is returned only when the call was
    /// acknowledged and the stored procedure returned success; otherwise it
    /// is empty and the result code and comment say why.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or parse failure only.
    pub async fn register_patient(&self, patient: &PatientRecord) -> Result<Registration> {
        let message_type = MessageType::ClientAdd;

        let body = self.envelope.build_client_add_body(patient);
        let response = self.call(message_type, None, &body).await?;

        let identifier = if response.is_success() {
            response
                .document
                .find_in_section(&message_type.output_section(), PATIENT_CODE)
                .unwrap_or_default()
                .to_string()
        } else {
            String::new()
        };

        tracing::info!(
            assigned = !identifier.is_empty(),
            result_code = response.result.code,
            "Patient registration completed"
        );

        Ok(response.into_result(identifier))
    }

    /// Build, send and validate one request
    async fn call(
        &self,
        message_type: MessageType,
        branch_id: Option<i64>,
        body: &RequestBody,
    ) -> Result<ValidatedResponse> {
        let header = self.envelope.build_header(message_type, branch_id)?;
        let document = self.envelope.build_document(&header, body)?;

        tracing::info!(
            message_type = %message_type,
            message_id = %header.message_id,
            branch_id = ?header.branch_id,
            "Sending MIS request"
        );
        tracing::trace!(document = %document, "Request document");

        let raw = self
            .transport
            .send(document, message_type.is_branch_scoped())
            .await?;

        let document = response::parse(&raw)?;
        let acknowledgment = response::check_acknowledgment(&document)?;
        let result = response::extract_result(&document, &message_type.output_section())?;

        if !acknowledgment.is_ok() {
            tracing::warn!(
                message_id = %header.message_id,
                ack_code = %acknowledgment.code,
                ack_detail = %acknowledgment.detail,
                "MIS rejected the message"
            );
        } else if !result.is_success() {
            tracing::warn!(
                message_id = %header.message_id,
                result_code = result.code,
                comment = %result.comment,
                "MIS operation failed"
            );
        }

        Ok(ValidatedResponse {
            document,
            acknowledgment,
            result,
            raw: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}
