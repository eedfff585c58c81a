//! Outbound patient record for `CLIENT_ADD`
//!
//! Field names in JSON match the wire tags used by the MIS (`LASTNAME`,
//! `BDATE`, ...), so a record can be supplied in the same shape the MIS
//! documentation uses.

use serde::{Deserialize, Serialize};

/// A patient record to be registered in the MIS
///
/// `last_name`, `first_name` and `birth_date` are mandatory in the remote
/// schema and are always sent. Every other field is sent only when it holds a
/// non-empty value.
///
/// # Examples
///
/// ```
/// use mis_client::domain::PatientRecord;
///
/// let patient = PatientRecord::new("Testov", "Test", "19900101")
///     .with_middle_name("Testovich")
///     .with_phone("+7(999)000-00-00")
///     .with_gender("1");
///
/// assert_eq!(patient.middle_name.as_deref(), Some("Testovich"));
/// assert!(patient.email.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(rename = "LASTNAME")]
    pub last_name: String,

    #[serde(rename = "FIRSTNAME")]
    pub first_name: String,

    #[serde(rename = "MIDNAME", default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,

    #[serde(rename = "EMAIL", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "PHONE", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Birth date, `YYYYMMDD`
    #[serde(rename = "BDATE")]
    pub birth_date: String,

    /// `1` male, `2` female
    #[serde(rename = "GENDER", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    /// Individual insurance account number
    #[serde(rename = "SNILS", default, skip_serializing_if = "Option::is_none")]
    pub snils: Option<String>,

    /// Medical insurance policy number
    #[serde(rename = "NSP", default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,

    /// Duplicate check mode, `1` = name plus birth date
    #[serde(rename = "CHECKMODE", default, skip_serializing_if = "Option::is_none")]
    pub checkmode: Option<String>,

    #[serde(rename = "REFUSECALL", default, skip_serializing_if = "Option::is_none")]
    pub refuse_call: Option<String>,

    #[serde(rename = "REFUSESMS", default, skip_serializing_if = "Option::is_none")]
    pub refuse_sms: Option<String>,
}

/// One field of a patient record as it appears on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientField<'a> {
    pub tag: &'static str,
    pub value: Option<&'a str>,
    pub required: bool,
}

impl<'a> PatientField<'a> {
    fn required(tag: &'static str, value: &'a str) -> Self {
        Self {
            tag,
            value: Some(value),
            required: true,
        }
    }

    fn optional(tag: &'static str, value: Option<&'a str>) -> Self {
        Self {
            tag,
            value,
            required: false,
        }
    }

    /// Whether this field belongs in the outbound document
    pub fn is_emitted(&self) -> bool {
        self.required || self.value.is_some_and(|v| !v.is_empty())
    }
}

impl PatientRecord {
    /// Creates a record holding only the mandatory fields
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        birth_date: impl Into<String>,
    ) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: first_name.into(),
            birth_date: birth_date.into(),
            ..Default::default()
        }
    }

    pub fn with_middle_name(mut self, value: impl Into<String>) -> Self {
        self.middle_name = Some(value.into());
        self
    }

    pub fn with_email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn with_phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    pub fn with_gender(mut self, value: impl Into<String>) -> Self {
        self.gender = Some(value.into());
        self
    }

    pub fn with_snils(mut self, value: impl Into<String>) -> Self {
        self.snils = Some(value.into());
        self
    }

    pub fn with_policy_number(mut self, value: impl Into<String>) -> Self {
        self.policy_number = Some(value.into());
        self
    }

    pub fn with_checkmode(mut self, value: impl Into<String>) -> Self {
        self.checkmode = Some(value.into());
        self
    }

    pub fn with_refuse_call(mut self, value: impl Into<String>) -> Self {
        self.refuse_call = Some(value.into());
        self
    }

    pub fn with_refuse_sms(mut self, value: impl Into<String>) -> Self {
        self.refuse_sms = Some(value.into());
        self
    }

    /// All fields in wire order, mandatory ones flagged
    pub fn fields(&self) -> Vec<PatientField<'_>> {
        vec![
            PatientField::required("LASTNAME", &self.last_name),
            PatientField::required("FIRSTNAME", &self.first_name),
            PatientField::optional("MIDNAME", self.middle_name.as_deref()),
            PatientField::optional("EMAIL", self.email.as_deref()),
            PatientField::optional("PHONE", self.phone.as_deref()),
            PatientField::required("BDATE", &self.birth_date),
            PatientField::optional("GENDER", self.gender.as_deref()),
            PatientField::optional("SNILS", self.snils.as_deref()),
            PatientField::optional("NSP", self.policy_number.as_deref()),
            PatientField::optional("CHECKMODE", self.checkmode.as_deref()),
            PatientField::optional("REFUSECALL", self.refuse_call.as_deref()),
            PatientField::optional("REFUSESMS", self.refuse_sms.as_deref()),
        ]
    }

    /// Short display name for logs and console output
    pub fn display_name(&self) -> String {
        [
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.middle_name.as_deref().unwrap_or_default(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}
