//! CLI command implementations
//!
//! Commands return an exit code: 0 success, 1 the MIS rejected or failed
//! the operation, 2 configuration or input error, 5 transport or parse
//! failure.

pub mod add_patient;
pub mod all;
pub mod changes;
pub mod init;
pub mod validate;

use crate::adapters::mis::MisClient;
use crate::config::{load_config, AppConfig};
use crate::domain::MisError;

/// Exit code for a successful run
pub const EXIT_OK: i32 = 0;
/// Exit code when the MIS answered but rejected or failed the operation
pub const EXIT_OPERATION_FAILED: i32 = 1;
/// Exit code for configuration, credential or input errors
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code for transport and parse failures
pub const EXIT_FATAL: i32 = 5;

/// Raw response bytes echoed on failure
pub(crate) const RAW_RESPONSE_PREVIEW: usize = 2000;

/// Maps a library error to a process exit code
pub fn exit_code_for(err: &MisError) -> i32 {
    match err {
        MisError::Configuration(_) | MisError::Credentials(_) | MisError::Validation(_) => {
            EXIT_CONFIG_ERROR
        }
        _ => EXIT_FATAL,
    }
}

/// Loads and validates configuration, then builds the client
///
/// Problems are reported on the console; `Err` carries the exit code.
pub(crate) fn prepare_client(config_path: &str) -> Result<(AppConfig, MisClient), i32> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
            println!("❌ Failed to load configuration: {e}");
            return Err(EXIT_CONFIG_ERROR);
        }
    };

    match MisClient::for_environment(config.mis.clone(), &config.environment) {
        Ok(client) => Ok((config, client)),
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to create MIS client");
            println!("❌ Failed to create MIS client: {e}");
            Err(exit_code_for(&e))
        }
    }
}

/// Prints the start of a raw response body
pub(crate) fn print_raw_response(raw: &str) {
    let preview: String = raw.chars().take(RAW_RESPONSE_PREVIEW).collect();
    println!("Response XML:");
    println!("{preview}");
}

/// Prints the body of an HTTP error response, if the error carries one
pub(crate) fn print_error_body(err: &MisError) {
    if let MisError::Transport(transport) = err {
        if let Some(body) = transport.body() {
            print_raw_response(body);
        }
    }
}
