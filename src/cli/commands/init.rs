//! `init` command: write a sample configuration file

use super::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "mis.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing MIS client configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set mis.external_system_id and mis.clinic_host");
                println!("  2. Point mis.tls.client_cert / client_key at the issued certificate");
                println!("  3. Validate configuration: mis-client validate-config --check-credentials");
                println!("  4. Fetch changes: mis-client changes");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    fn sample_config() -> String {
        r#"# MIS client configuration
#
# Values of the form ${VAR} are read from the environment (or .env).
# Every scalar can also be overridden with MIS_* variables, e.g. MIS_CLINIC_HOST.

# development | staging | production
environment = "development"

[application]
log_level = "info"

[mis]
base_url = "https://api.infoclinica.ru/api/xml"

# Identifier agreed with the MIS operator (MSH.3)
external_system_id = "CRM_IDEAV"

# Clinic host on the portal, without scheme
clinic_host = "demo.infoclinica.ru"

# Branch for change-list calls when --branch is not given
default_branch_id = 1

[mis.tls]
client_cert = "client.crt"
client_key = "${MIS_CLIENT_KEY_PATH}"

# Custom CA for the server certificate
# ca_cert = "ca.crt"

# Skips server certificate verification. Test endpoints only; rejected
# when environment = "production".
accept_invalid_certs = false

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_parses() {
        std::env::set_var("MIS_CLIENT_KEY_PATH", "client.key");
        let config = parse_config(&InitArgs::sample_config()).unwrap();
        assert_eq!(config.mis.external_system_id, "CRM_IDEAV");
        assert!(!config.mis.tls.accept_invalid_certs);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("mis.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG_ERROR);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), EXIT_OK);
        assert!(fs::read_to_string(&output).unwrap().contains("[mis.tls]"));
    }
}
