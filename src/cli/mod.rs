//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// mis-client - Infoclinica MIS integration client
#[derive(Parser, Debug)]
#[command(name = "mis-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mis.toml", env = "MIS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MIS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve a batch of patient-record changes (CLIENTS_CHANGE_LIST)
    Changes(commands::changes::ChangesArgs),

    /// Register a patient (CLIENT_ADD)
    AddPatient(commands::add_patient::AddPatientArgs),

    /// Run the change list and patient registration in sequence
    All(commands::all::AllArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Cli {
    /// Dispatches to the selected command, returning the exit code
    pub async fn execute(&self) -> anyhow::Result<i32> {
        match &self.command {
            Commands::Changes(args) => args.execute(&self.config).await,
            Commands::AddPatient(args) => args.execute(&self.config).await,
            Commands::All(args) => args.execute(&self.config).await,
            Commands::ValidateConfig(args) => args.execute(&self.config).await,
            Commands::Init(args) => args.execute().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_changes() {
        let cli = Cli::parse_from(["mis-client", "changes"]);
        assert_eq!(cli.config, "mis.toml");
        match cli.command {
            Commands::Changes(args) => assert_eq!(args.branch, None),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_changes_with_branch() {
        let cli = Cli::parse_from(["mis-client", "changes", "--branch", "42"]);
        match cli.command {
            Commands::Changes(args) => assert_eq!(args.branch, Some(42)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "mis-client",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
            "changes",
        ]);
        assert_eq!(cli.config, "custom.toml");
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_add_patient_json() {
        let cli = Cli::parse_from([
            "mis-client",
            "add-patient",
            "--patient",
            r#"{"LASTNAME":"Ivanov","FIRSTNAME":"Ivan","BDATE":"19850315"}"#,
        ]);
        match cli.command {
            Commands::AddPatient(args) => assert!(args.source.patient.is_some()),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_patient_sources_conflict() {
        let result = Cli::try_parse_from([
            "mis-client",
            "add-patient",
            "--patient",
            "{}",
            "--patient-file",
            "p.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_all_validate_init() {
        let cli = Cli::parse_from(["mis-client", "all", "--branch", "3"]);
        assert!(matches!(cli.command, Commands::All(_)));

        let cli = Cli::parse_from(["mis-client", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));

        let cli = Cli::parse_from(["mis-client", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init(ref args) if args.force));
    }
}
