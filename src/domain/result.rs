//! Result type alias for the MIS client

use super::errors::MisError;

/// Result type alias for MIS client operations
///
/// # Examples
///
/// ```
/// use mis_client::domain::result::Result;
/// use mis_client::domain::errors::MisError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(MisError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MisError>;
