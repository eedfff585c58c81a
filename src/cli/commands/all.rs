//! `all` command: change list followed by patient registration
//!
//! Both calls run even if the first one fails; the exit code is the most
//! severe of the two.

use super::add_patient::{self, PatientSource};
use super::{changes, prepare_client, EXIT_CONFIG_ERROR};
use clap::Args;

/// Arguments for the all command
#[derive(Args, Debug, Default)]
pub struct AllArgs {
    /// Branch id for the change list (defaults to mis.default_branch_id)
    #[arg(short, long)]
    pub branch: Option<i64>,

    #[command(flatten)]
    pub source: PatientSource,
}

impl AllArgs {
    /// Execute the all command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let patient = match self.source.resolve() {
            Ok(patient) => patient,
            Err(e) => {
                tracing::error!(error = %e, "Invalid patient input");
                println!("❌ {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let (_, client) = match prepare_client(config_path) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let changes_code = changes::run(&client, self.branch).await;
        let add_code = add_patient::run(&client, &patient).await;

        tracing::info!(
            changes_exit = changes_code,
            add_patient_exit = add_code,
            "All operations finished"
        );

        Ok(changes_code.max(add_code))
    }
}
