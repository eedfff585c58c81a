//! Patient-record change events returned by `CLIENTS_CHANGE_LIST`

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One reported mutation of a patient record
///
/// The MIS sends each event as a flat set of named fields. Values are kept as
/// strings exactly as received, with surrounding whitespace trimmed, and
/// fields keep the order they had in the document. A repeated name keeps its
/// first position and takes the last value.
///
/// # Examples
///
/// ```
/// use mis_client::domain::ChangeRecord;
///
/// let record: ChangeRecord = [("CHANGEID", "17"), ("PCODE", "42")]
///     .into_iter()
///     .collect();
///
/// assert_eq!(record.change_id(), Some("17"));
/// assert_eq!(record.get("LASTNAME"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRecord(Vec<(String, String)>);

impl ChangeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, trimming the value
    pub fn insert(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        let name = name.into();
        let value = value.as_ref().trim().to_string();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in document order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sequence number of the change event (`CHANGEID`)
    pub fn change_id(&self) -> Option<&str> {
        self.get("CHANGEID")
    }

    /// Kind of change (`CHANGEOP`)
    pub fn operation(&self) -> Option<&str> {
        self.get("CHANGEOP")
    }

    /// MIS identifier of the affected patient (`PCODE`)
    pub fn patient_code(&self) -> Option<&str> {
        self.get("PCODE")
    }

    pub fn last_name(&self) -> Option<&str> {
        self.get("LASTNAME")
    }

    pub fn first_name(&self) -> Option<&str> {
        self.get("FIRSTNAME")
    }

    pub fn middle_name(&self) -> Option<&str> {
        self.get("MIDNAME")
    }

    pub fn phone(&self) -> Option<&str> {
        self.get("PPHONE")
    }
}

impl<K, V> FromIterator<(K, V)> for ChangeRecord
where
    K: Into<String>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = ChangeRecord::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields())
    }
}

impl<'de> Deserialize<'de> for ChangeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = ChangeRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut record = ChangeRecord::new();
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    record.insert(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_trims_value() {
        let mut record = ChangeRecord::new();
        record.insert("LASTNAME", "  Ivanov \n");
        assert_eq!(record.last_name(), Some("Ivanov"));
    }

    #[test]
    fn test_accessors() {
        let record: ChangeRecord = [
            ("CHANGEID", "5"),
            ("CHANGEOP", "U"),
            ("PCODE", "1001"),
            ("PPHONE", "+7 999"),
        ]
        .into_iter()
        .collect();

        assert_eq!(record.len(), 4);
        assert_eq!(record.change_id(), Some("5"));
        assert_eq!(record.operation(), Some("U"));
        assert_eq!(record.patient_code(), Some("1001"));
        assert_eq!(record.phone(), Some("+7 999"));
        assert_eq!(record.middle_name(), None);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let record: ChangeRecord = [("PCODE", "1")].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"PCODE":"1"}"#);
    }

    #[test]
    fn test_fields_keep_document_order() {
        let record: ChangeRecord = [
            ("PCODE", "1001"),
            ("CHANGEID", "5"),
            ("LASTNAME", "Ivanov"),
            ("CHANGEOP", "U"),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = record.fields().map(|(name, _)| name).collect();
        assert_eq!(names, ["PCODE", "CHANGEID", "LASTNAME", "CHANGEOP"]);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"PCODE":"1001","CHANGEID":"5","LASTNAME":"Ivanov","CHANGEOP":"U"}"#
        );
    }

    #[test]
    fn test_repeated_field_keeps_position_takes_last_value() {
        let mut record = ChangeRecord::new();
        record.insert("CHANGEID", "1");
        record.insert("PCODE", "10");
        record.insert("CHANGEID", " 2 ");

        assert_eq!(record.len(), 2);
        assert_eq!(record.change_id(), Some("2"));
        assert_eq!(record.fields().next(), Some(("CHANGEID", "2")));
    }

    #[test]
    fn test_deserializes_in_order() {
        let record: ChangeRecord =
            serde_json::from_str(r#"{"LASTNAME":" Petrov ","CHANGEID":"9"}"#).unwrap();
        let fields: Vec<(&str, &str)> = record.fields().collect();
        assert_eq!(fields, [("LASTNAME", "Petrov"), ("CHANGEID", "9")]);
    }
}
