//! `validate-config` command

use super::{EXIT_CONFIG_ERROR, EXIT_OK};
use crate::adapters::mis::ClientCredentials;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Also load the client certificate and key
    #[arg(long)]
    pub check_credentials: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if self.check_credentials {
            match ClientCredentials::from_config(&config.mis.tls) {
                Ok(Some(credentials)) => match credentials.identity() {
                    Ok(_) => println!("✅ Client certificate and key loaded"),
                    Err(e) => {
                        println!("❌ {e}");
                        return Ok(EXIT_CONFIG_ERROR);
                    }
                },
                Ok(None) => println!("⚠️  No client certificate configured"),
                Err(e) => {
                    println!("❌ {e}");
                    return Ok(EXIT_CONFIG_ERROR);
                }
            }
        }

        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Endpoint: {}", config.mis.base_url);
        println!("  External System: {}", config.mis.external_system_id);
        println!("  Clinic Host: {}", config.mis.clinic_host);
        println!("  Default Branch: {}", config.mis.default_branch_id);
        if config.mis.tls.has_client_identity() {
            println!(
                "  Client Certificate: {}",
                config.mis.tls.client_cert.as_deref().unwrap_or_default()
            );
        } else {
            println!("  Client Certificate: (none, plain http only)");
        }
        if config.mis.tls.accept_invalid_certs {
            println!("  ⚠️  Server certificate verification: DISABLED");
        }
        println!();
        Ok(EXIT_OK)
    }
}
