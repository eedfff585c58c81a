//! Domain models and types for the MIS client.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Message header types** ([`MessageType`], [`MessageId`], [`MessageHeader`])
//! - **Payload models** ([`PatientRecord`], [`ChangeRecord`])
//! - **Call outcomes** ([`OperationResult`], [`OperationStatus`])
//! - **Error types** ([`MisError`], [`TransportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Two failure channels
//!
//! Infrastructure failures (network, HTTP status, malformed response) are
//! returned as `Err(MisError)`. A request the MIS received and turned down is
//! an `Ok(OperationResult)` whose status is not [`OperationStatus::Success`]:
//!
//! ```rust
//! use mis_client::domain::{Acknowledgment, OperationStatus, ProcedureResult};
//!
//! let status = OperationStatus::evaluate(
//!     &Acknowledgment::new("AA", ""),
//!     &ProcedureResult::new(0, "Patient already exists"),
//! );
//! assert!(matches!(status, OperationStatus::OperationFailed { result_code: 0, .. }));
//! ```

pub mod change;
pub mod errors;
pub mod message;
pub mod outcome;
pub mod patient;
pub mod result;

// Re-export commonly used types for convenience
pub use change::ChangeRecord;
pub use errors::{MisError, TransportError};
pub use message::{MessageHeader, MessageId, MessageType};
pub use outcome::{
    Acknowledgment, ChangeBatch, OperationResult, OperationStatus, ProcedureResult, Registration,
};
pub use patient::{PatientField, PatientRecord};
pub use result::Result;
