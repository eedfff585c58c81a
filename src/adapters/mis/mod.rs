//! Infoclinica MIS integration
//!
//! - [`envelope`] builds request documents
//! - [`transport`] posts them over HTTPS with a client certificate
//! - [`response`] parses replies and reads status fields
//! - [`client`] runs the operations end to end

pub mod client;
pub mod credentials;
pub mod envelope;
pub mod response;
pub mod transport;

pub use client::MisClient;
pub use credentials::ClientCredentials;
pub use envelope::{EnvelopeBuilder, RequestBody};
pub use response::XmlElement;
pub use transport::{HttpsTransport, MisTransport};
