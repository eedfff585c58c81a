//! Message header types
//!
//! Every request starts with an `MSH` block naming the sending system, the
//! send time, the operation and a unique message id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of a message id on the wire
pub const MESSAGE_ID_LEN: usize = 20;

/// Format of the `MSH.7/TS.1` send timestamp (14 digits, local time)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Operations supported by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Retrieve a batch of patient-record change events
    ClientsChangeList,
    /// Register a new patient record
    ClientAdd,
}

impl MessageType {
    /// Operation name as sent in `MSH.9/MSG.2`
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::ClientsChangeList => "CLIENTS_CHANGE_LIST",
            MessageType::ClientAdd => "CLIENT_ADD",
        }
    }

    /// Whether the operation targets a single branch
    ///
    /// Branch-scoped operations carry `MSH.99` and the host-forwarding header.
    pub fn is_branch_scoped(&self) -> bool {
        matches!(self, MessageType::ClientsChangeList)
    }

    /// Root element of the request document
    pub fn root_element(&self) -> String {
        format!("WEB_{}", self.as_str())
    }

    /// Operation-specific input section of the request
    pub fn input_section(&self) -> String {
        format!("{}_IN", self.as_str())
    }

    /// Operation-specific output section of the response
    pub fn output_section(&self) -> String {
        format!("{}_OUT", self.as_str())
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique message identifier (`MSH.10`)
///
/// Derived from a random v4 UUID: the 32 hex digits are cut to
/// [`MESSAGE_ID_LEN`] characters, leaving 74 random bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generates a fresh message id
    pub fn generate() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(MESSAGE_ID_LEN);
        Self(id)
    }

    /// Returns the message id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Protocol message header (`MSH`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Identifier of the calling system, agreed with the MIS operator
    pub external_system_id: String,

    /// Send time, `YYYYMMDDHHMMSS`
    pub timestamp: String,

    /// Operation carried by the message
    pub message_type: MessageType,

    /// Unique id of this message
    pub message_id: MessageId,

    /// Target branch, present only for branch-scoped operations
    pub branch_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_message_type_names() {
        assert_eq!(MessageType::ClientsChangeList.as_str(), "CLIENTS_CHANGE_LIST");
        assert_eq!(MessageType::ClientAdd.as_str(), "CLIENT_ADD");
        assert_eq!(MessageType::ClientAdd.root_element(), "WEB_CLIENT_ADD");
        assert_eq!(
            MessageType::ClientsChangeList.input_section(),
            "CLIENTS_CHANGE_LIST_IN"
        );
        assert_eq!(MessageType::ClientAdd.output_section(), "CLIENT_ADD_OUT");
    }

    #[test]
    fn test_branch_scoping() {
        assert!(MessageType::ClientsChangeList.is_branch_scoped());
        assert!(!MessageType::ClientAdd.is_branch_scoped());
    }

    #[test]
    fn test_message_id_shape() {
        let id = MessageId::generate();
        assert_eq!(id.as_str().len(), MESSAGE_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_message_ids_are_distinct() {
        let ids: HashSet<MessageId> = (0..10_000).map(|_| MessageId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
