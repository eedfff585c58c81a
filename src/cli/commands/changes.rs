//! `changes` command: retrieve one batch of patient-record change events

use super::{
    exit_code_for, prepare_client, print_error_body, print_raw_response, EXIT_OK,
    EXIT_OPERATION_FAILED,
};
use crate::adapters::mis::MisClient;
use crate::domain::ChangeBatch;
use clap::Args;

/// Change events printed in the console summary
const SUMMARY_LIMIT: usize = 5;

/// Arguments for the changes command
#[derive(Args, Debug, Default)]
pub struct ChangesArgs {
    /// Branch id (defaults to mis.default_branch_id)
    #[arg(short, long)]
    pub branch: Option<i64>,
}

impl ChangesArgs {
    /// Execute the changes command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let (_, client) = match prepare_client(config_path) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };
        Ok(run(&client, self.branch).await)
    }
}

/// Runs the call and prints its outcome, returning the exit code
pub(crate) async fn run(client: &MisClient, branch: Option<i64>) -> i32 {
    let branch_id = branch.unwrap_or(client.default_branch_id());

    println!();
    println!("📋 CLIENTS_CHANGE_LIST");
    println!("   Branch: {branch_id}, endpoint: {}", client.endpoint());
    println!();

    match client.retrieve_change_batch(Some(branch_id)).await {
        Ok(batch) => report(&batch),
        Err(e) => {
            crate::log_error_with_context!(&e, "CLIENTS_CHANGE_LIST failed");
            println!("❌ CLIENTS_CHANGE_LIST failed: {e}");
            print_error_body(&e);
            exit_code_for(&e)
        }
    }
}

fn report(batch: &ChangeBatch) -> i32 {
    println!("SPRESULT : {}", batch.result_code());
    println!("SPCOMMENT: {}", batch.result_comment());

    if !batch.is_success() {
        println!("❌ {}", batch.status());
        print_raw_response(&batch.raw_response);
        return EXIT_OPERATION_FAILED;
    }

    println!("✅ Received {} change(s)", batch.payload.len());
    for (i, change) in batch.payload.iter().take(SUMMARY_LIMIT).enumerate() {
        println!();
        println!(
            "  [{}] CHANGEID={} OP={} PCODE={}",
            i + 1,
            change.change_id().unwrap_or_default(),
            change.operation().unwrap_or_default(),
            change.patient_code().unwrap_or_default()
        );
        println!(
            "       {} {} {} / {}",
            change.last_name().unwrap_or_default(),
            change.first_name().unwrap_or_default(),
            change.middle_name().unwrap_or_default(),
            change.phone().unwrap_or_default()
        );
    }
    if batch.payload.len() > SUMMARY_LIMIT {
        println!("  ... and {} more", batch.payload.len() - SUMMARY_LIMIT);
    }
    println!();

    EXIT_OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Acknowledgment, ChangeRecord, OperationResult, ProcedureResult};

    fn batch(ack: &str, code: i64, count: usize) -> ChangeBatch {
        OperationResult {
            acknowledgment: Acknowledgment::new(ack, ""),
            result: ProcedureResult::new(code, ""),
            payload: (0..count)
                .map(|i| ChangeRecord::from_iter([("CHANGEID", i.to_string())]))
                .collect(),
            raw_response: "<R/>".to_string(),
        }
    }

    #[test]
    fn test_report_success() {
        assert_eq!(report(&batch("AA", 1, 7)), EXIT_OK);
    }

    #[test]
    fn test_report_rejected() {
        assert_eq!(report(&batch("AE", 1, 0)), EXIT_OPERATION_FAILED);
        assert_eq!(report(&batch("AA", 0, 0)), EXIT_OPERATION_FAILED);
    }
}
