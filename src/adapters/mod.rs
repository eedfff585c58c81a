//! External system integrations
//!
//! - [`mis`] - Infoclinica MIS XML API over mutual TLS
//!
//! The network boundary sits behind the [`mis::MisTransport`] trait so the
//! operation client can be driven by an in-memory transport in tests.

pub mod mis;
