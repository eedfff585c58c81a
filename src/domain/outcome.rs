//! Outcome of a completed protocol call
//!
//! A call that reached the MIS and returned a well-formed document always
//! produces an [`OperationResult`]. Whether the MIS accepted the request is
//! reported by [`OperationStatus`], so callers running several calls in a row
//! can inspect a rejection and carry on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Acknowledgment status that denotes success
pub const ACK_ACCEPTED: &str = "AA";

/// Result code reported when the output section carries no `SPRESULT`
pub const RESULT_CODE_MISSING: i64 = -999;

/// Result code that denotes semantic success
pub const RESULT_CODE_SUCCESS: i64 = 1;

/// Message acknowledgment (`MSA.1` status, `MSA.3` detail)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub code: String,
    pub detail: String,
}

impl Acknowledgment {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
        }
    }

    /// Whether the MIS accepted the message
    pub fn is_ok(&self) -> bool {
        self.code == ACK_ACCEPTED
    }
}

/// Stored-procedure result (`SPRESULT`, `SPCOMMENT`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureResult {
    pub code: i64,
    pub comment: String,
}

impl ProcedureResult {
    pub fn new(code: i64, comment: impl Into<String>) -> Self {
        Self {
            code,
            comment: comment.into(),
        }
    }

    /// Result used when the output section is absent
    pub fn missing() -> Self {
        Self::new(RESULT_CODE_MISSING, "")
    }

    pub fn is_success(&self) -> bool {
        self.code == RESULT_CODE_SUCCESS
    }
}

/// Protocol-level verdict on a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationStatus {
    /// Acknowledged and the stored procedure reported success
    Success,

    /// The acknowledgment status was not `AA`
    ProtocolRejected { ack_code: String, ack_detail: String },

    /// Acknowledged, but the stored procedure reported a failure
    OperationFailed { result_code: i64, comment: String },
}

impl OperationStatus {
    /// Derives the verdict from the two response indicators
    pub fn evaluate(ack: &Acknowledgment, result: &ProcedureResult) -> Self {
        if !ack.is_ok() {
            OperationStatus::ProtocolRejected {
                ack_code: ack.code.clone(),
                ack_detail: ack.detail.clone(),
            }
        } else if !result.is_success() {
            OperationStatus::OperationFailed {
                result_code: result.code,
                comment: result.comment.clone(),
            }
        } else {
            OperationStatus::Success
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationStatus::Success)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::Success => write!(f, "success"),
            OperationStatus::ProtocolRejected {
                ack_code,
                ack_detail,
            } => write!(f, "protocol rejected ({ack_code}): {ack_detail}"),
            OperationStatus::OperationFailed {
                result_code,
                comment,
            } => write!(f, "operation failed ({result_code}): {comment}"),
        }
    }
}

/// Result of one protocol call
///
/// `payload` is populated only when [`status`](Self::status) is
/// [`OperationStatus::Success`]; otherwise it holds the payload type's
/// default (an empty list or an empty identifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub acknowledgment: Acknowledgment,
    pub result: ProcedureResult,
    pub payload: T,

    /// Response document as received, for diagnostics
    #[serde(skip)]
    pub raw_response: String,
}

impl<T> OperationResult<T> {
    pub fn status(&self) -> OperationStatus {
        OperationStatus::evaluate(&self.acknowledgment, &self.result)
    }

    pub fn is_success(&self) -> bool {
        self.acknowledgment.is_ok() && self.result.is_success()
    }

    pub fn acknowledgment_ok(&self) -> bool {
        self.acknowledgment.is_ok()
    }

    pub fn result_code(&self) -> i64 {
        self.result.code
    }

    pub fn result_comment(&self) -> &str {
        &self.result.comment
    }
}

/// Result of `CLIENTS_CHANGE_LIST`
pub type ChangeBatch = OperationResult<Vec<super::ChangeRecord>>;

/// Result of `CLIENT_ADD`; the payload is the assigned patient code
pub type Registration = OperationResult<String>;

impl Registration {
    /// Identifier assigned by the MIS, empty unless the call succeeded
    pub fn assigned_identifier(&self) -> &str {
        &self.payload
    }
}
