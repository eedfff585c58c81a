//! `add-patient` command: register a patient record

use super::{
    exit_code_for, prepare_client, print_error_body, print_raw_response, EXIT_CONFIG_ERROR,
    EXIT_OK, EXIT_OPERATION_FAILED,
};
use crate::adapters::mis::MisClient;
use crate::domain::{PatientRecord, Registration};
use clap::Args;
use std::fs;
use std::path::PathBuf;

/// Where the patient record comes from
#[derive(Args, Debug, Default)]
pub struct PatientSource {
    /// Patient record as JSON keyed by wire tags, e.g. '{"LASTNAME":"Ivanov","FIRSTNAME":"Ivan","BDATE":"19850315"}'
    #[arg(long, conflicts_with = "patient_file")]
    pub patient: Option<String>,

    /// Path to a JSON file holding the patient record
    #[arg(long, value_name = "PATH")]
    pub patient_file: Option<PathBuf>,
}

impl PatientSource {
    /// Resolves the record, falling back to the built-in test patient
    pub fn resolve(&self) -> anyhow::Result<PatientRecord> {
        let json = match (&self.patient, &self.patient_file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => fs::read_to_string(path).map_err(|e| {
                anyhow::anyhow!("Failed to read patient file {}: {e}", path.display())
            })?,
            (None, None) => return Ok(test_patient()),
        };

        serde_json::from_str(&json).map_err(|e| anyhow::anyhow!("Invalid patient JSON: {e}"))
    }
}

/// Record registered when no patient is supplied
pub fn test_patient() -> PatientRecord {
    PatientRecord::new("Testov", "Test", "19900101")
        .with_middle_name("Testovich")
        .with_email("test@example.com")
        .with_phone("+7(999)000-00-00")
        .with_gender("1")
        .with_checkmode("1")
}

/// Arguments for the add-patient command
#[derive(Args, Debug, Default)]
pub struct AddPatientArgs {
    #[command(flatten)]
    pub source: PatientSource,
}

impl AddPatientArgs {
    /// Execute the add-patient command
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
        Ok(run(&client, &patient).await)
    }
}

/// Runs the call and prints its outcome, returning the exit code
pub(crate) async fn run(client: &MisClient, patient: &PatientRecord) -> i32 {
    println!();
    println!("🧾 CLIENT_ADD");
    println!("   Patient: {}", patient.display_name());
    println!();

    match client.register_patient(patient).await {
        Ok(registration) => report(&registration),
        Err(e) => {
            crate::log_error_with_context!(&e, "CLIENT_ADD failed");
            println!("❌ CLIENT_ADD failed: {e}");
            print_error_body(&e);
            exit_code_for(&e)
        }
    }
}

fn report(registration: &Registration) -> i32 {
    println!("SPRESULT : {}", registration.result_code());
    println!("SPCOMMENT: {}", registration.result_comment());

    if !registration.is_success() {
        println!("❌ {}", registration.status());
        print_raw_response(&registration.raw_response);
        return EXIT_OPERATION_FAILED;
    }

    println!("✅ PCODE    : {}", registration.assigned_identifier());
    println!();
    EXIT_OK
}
