//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AppConfig;
use crate::domain::errors::MisError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`AppConfig`]
/// 4. Applies environment variable overrides (`MIS_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`MisError::Configuration`] if the file cannot be read or parsed,
/// a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use mis_client::config::load_config;
///
/// let config = load_config("mis.toml").expect("Failed to load config");
/// println!("{}", config.mis.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MisError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MisError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
///
/// Applies the same substitution, overrides and validation as [`load_config`].
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: AppConfig = toml::from_str(&contents)
        .map_err(|e| MisError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        MisError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Every missing variable is reported at
/// once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MisError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MisError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        MisError::Configuration(format!("Invalid value '{value}' for environment variable {name}"))
    })
}

/// Applies environment variable overrides using the `MIS_*` prefix
fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(val) = std::env::var("MIS_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("MIS_BASE_URL") {
        config.mis.base_url = val;
    }
    if let Ok(val) = std::env::var("MIS_EXTERNAL_SYSTEM_ID") {
        config.mis.external_system_id = val;
    }
    if let Ok(val) = std::env::var("MIS_CLINIC_HOST") {
        config.mis.clinic_host = val;
    }
    if let Ok(val) = std::env::var("MIS_DEFAULT_BRANCH_ID") {
        config.mis.default_branch_id = parse_env("MIS_DEFAULT_BRANCH_ID", &val)?;
    }

    if let Ok(val) = std::env::var("MIS_TLS_CLIENT_CERT") {
        config.mis.tls.client_cert = Some(val);
    }
    if let Ok(val) = std::env::var("MIS_TLS_CLIENT_KEY") {
        config.mis.tls.client_key = Some(val);
    }
    if let Ok(val) = std::env::var("MIS_TLS_CA_CERT") {
        config.mis.tls.ca_cert = Some(val);
    }
    if let Ok(val) = std::env::var("MIS_TLS_ACCEPT_INVALID_CERTS") {
        config.mis.tls.accept_invalid_certs = parse_env("MIS_TLS_ACCEPT_INVALID_CERTS", &val)?;
    }

    if let Ok(val) = std::env::var("MIS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("MIS_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("MIS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("MIS_LOADER_TEST_VAR", "test_value");
        let input = "external_system_id = \"${MIS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "external_system_id = \"test_value\"\n");
        std::env::remove_var("MIS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MIS_LOADER_MISSING_VAR");
        let input = "clinic_host = \"${MIS_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("MIS_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("MIS_LOADER_COMMENTED_VAR");
        let input = "# key = \"${MIS_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(MisError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[mis]
base_url = "http://localhost:8080/api/xml"
external_system_id = "CRM_TEST"
clinic_host = "demo.infoclinica.ru"
default_branch_id = 7
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.mis.external_system_id, "CRM_TEST");
        assert_eq!(config.mis.default_branch_id, 7);
        assert!(!config.mis.tls.accept_invalid_certs);
    }
}
