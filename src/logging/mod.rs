//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output
//! - optional JSON file output with daily or hourly rotation
//! - level from configuration, overridable with `RUST_LOG`
//!
//! Request documents are logged only at `trace` level, since they carry
//! patient data.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a failed operation together with what was being attempted
///
/// # Example
///
/// ```no_run
/// use mis_client::log_error_with_context;
/// use mis_client::domain::MisError;
///
/// let error = MisError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
