//! # mis-client
//!
//! Client for the Infoclinica MIS XML integration API.
//!
//! Requests are XML documents with an `MSH` message header, posted over
//! HTTPS with a client certificate. Responses carry an `MSA` acknowledgment
//! and a stored-procedure result code and comment, followed by the
//! operation's payload.
//!
//! ## Architecture
//!
//! - [`domain`] - message, patient, change-event and outcome types; errors
//! - [`adapters`] - envelope builder, mutual-TLS transport, response
//!   parsing and the operation client
//! - [`config`] - TOML configuration with environment overrides
//! - [`logging`] - structured logging
//! - [`cli`] - command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mis_client::adapters::mis::MisClient;
//! use mis_client::config::load_config;
//! use mis_client::domain::PatientRecord;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("mis.toml")?;
//!     let client = MisClient::new(config.mis)?;
//!
//!     let batch = client.retrieve_change_batch(Some(42)).await?;
//!     for change in &batch.payload {
//!         println!("{:?} {:?}", change.change_id(), change.patient_code());
//!     }
//!
//!     let patient = PatientRecord::new("Ivanov", "Ivan", "19850315").with_gender("1");
//!     let registration = client.register_patient(&patient).await?;
//!     if registration.is_success() {
//!         println!("Registered as {}", registration.assigned_identifier());
//!     } else {
//!         println!("Not registered: {}", registration.status());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Transport and parse failures are returned as [`domain::MisError`]. A
//! response in which the MIS rejects the message or the operation fails is
//! not an error: it comes back as a result whose
//! [`status`](domain::OperationResult::status) says what went wrong.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
