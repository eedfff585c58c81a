//! Request envelope construction
//!
//! A request document is the operation root element (`WEB_<OPERATION>`, in
//! the `http://sdsys.ru/` namespace) holding the `MSH` header and the
//! operation-specific `<OPERATION>_IN` section.

use crate::domain::message::TIMESTAMP_FORMAT;
use crate::domain::{MessageHeader, MessageId, MessageType, MisError, PatientRecord, Result};
use chrono::Local;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Namespace of request documents
pub const NAMESPACE: &str = "http://sdsys.ru/";

/// Fixed sender application literal (`MSH.9/MSG.1`)
pub const MESSAGE_SOURCE: &str = "WEB";

/// Fixed charset literal (`MSH.18`)
pub const CHARSET: &str = "UTF-8";

/// Operation-specific input section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    message_type: MessageType,
    fields: Vec<(&'static str, String)>,
}

impl RequestBody {
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Fields in emission order
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Whether an element with this tag will be written
    pub fn contains(&self, tag: &str) -> bool {
        self.fields.iter().any(|(name, _)| *name == tag)
    }
}

/// Builds headers, bodies and complete request documents
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    external_system_id: String,
}

impl EnvelopeBuilder {
    pub fn new(external_system_id: impl Into<String>) -> Self {
        Self {
            external_system_id: external_system_id.into(),
        }
    }

    /// Builds a message header stamped with the current local time and a fresh id
    ///
    /// Branch-scoped operations require `branch_id`. For other operations a
    /// supplied branch id is dropped, since the MIS handles them centrally.
    ///
    /// # Errors
    ///
    /// Returns [`MisError::Validation`] when a branch-scoped operation has no branch id.
    pub fn build_header(
        &self,
        message_type: MessageType,
        branch_id: Option<i64>,
    ) -> Result<MessageHeader> {
        let branch_id = if message_type.is_branch_scoped() {
            Some(branch_id.ok_or_else(|| {
                MisError::Validation(format!("{message_type} requires a branch id"))
            })?)
        } else {
            if let Some(id) = branch_id {
                tracing::debug!(
                    message_type = %message_type,
                    branch_id = id,
                    "Ignoring branch id for globally scoped operation"
                );
            }
            None
        };

        Ok(MessageHeader {
            external_system_id: self.external_system_id.clone(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            message_type,
            message_id: MessageId::generate(),
            branch_id,
        })
    }

    /// Body of `CLIENTS_CHANGE_LIST`: an empty input section
    pub fn build_change_list_body(&self) -> RequestBody {
        RequestBody {
            message_type: MessageType::ClientsChangeList,
            fields: Vec::new(),
        }
    }

    /// Body of `CLIENT_ADD`
    ///
    /// Mandatory fields are always written, even when empty. Optional fields
    /// are left out entirely unless they hold a non-empty value.
    pub fn build_client_add_body(&self, patient: &PatientRecord) -> RequestBody {
        let fields = patient
            .fields()
            .into_iter()
            .filter(|field| field.is_emitted())
            .map(|field| (field.tag, field.value.unwrap_or_default().to_string()))
            .collect();

        RequestBody {
            message_type: MessageType::ClientAdd,
            fields,
        }
    }

    /// Serializes header and body into a request document
    ///
    /// # Errors
    ///
    /// Returns [`MisError::Validation`] when header and body belong to
    /// different operations, [`MisError::Serialization`] if writing fails.
    pub fn build_document(&self, header: &MessageHeader, body: &RequestBody) -> Result<String> {
        if header.message_type != body.message_type {
            return Err(MisError::Validation(format!(
                "Header is for {} but body is for {}",
                header.message_type, body.message_type
            )));
        }

        let root_name = header.message_type.root_element();
        let input_name = header.message_type.input_section();
        let mut writer = Writer::new(Vec::new());

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some(CHARSET), None)),
        )?;

        let mut root = BytesStart::new(root_name.as_str());
        root.push_attribute(("xmlns", NAMESPACE));
        write(&mut writer, Event::Start(root))?;

        write_header(&mut writer, header)?;

        if body.fields.is_empty() {
            write(&mut writer, Event::Empty(BytesStart::new(input_name.as_str())))?;
        } else {
            write(&mut writer, Event::Start(BytesStart::new(input_name.as_str())))?;
            for (tag, value) in &body.fields {
                write_text_element(&mut writer, tag, value)?;
            }
            write(&mut writer, Event::End(BytesEnd::new(input_name.as_str())))?;
        }

        write(&mut writer, Event::End(BytesEnd::new(root_name.as_str())))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| MisError::Serialization(format!("Request is not valid UTF-8: {e}")))
    }
}

fn write_header(writer: &mut Writer<Vec<u8>>, header: &MessageHeader) -> Result<()> {
    write(writer, Event::Start(BytesStart::new("MSH")))?;

    write_text_element(writer, "MSH.3", &header.external_system_id)?;

    write(writer, Event::Start(BytesStart::new("MSH.7")))?;
    write_text_element(writer, "TS.1", &header.timestamp)?;
    write(writer, Event::End(BytesEnd::new("MSH.7")))?;

    write(writer, Event::Start(BytesStart::new("MSH.9")))?;
    write_text_element(writer, "MSG.1", MESSAGE_SOURCE)?;
    write_text_element(writer, "MSG.2", header.message_type.as_str())?;
    write(writer, Event::End(BytesEnd::new("MSH.9")))?;

    write_text_element(writer, "MSH.10", header.message_id.as_str())?;
    write_text_element(writer, "MSH.18", CHARSET)?;

    if let Some(branch_id) = header.branch_id {
        write_text_element(writer, "MSH.99", &branch_id.to_string())?;
    }

    write(writer, Event::End(BytesEnd::new("MSH")))
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    if !value.is_empty() {
        write(writer, Event::Text(BytesText::new(value)))?;
    }
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| MisError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::new("CRM_TEST")
    }

    #[test]
    fn test_change_list_header_carries_branch() {
        let header = builder()
            .build_header(MessageType::ClientsChangeList, Some(42))
            .unwrap();
        assert_eq!(header.branch_id, Some(42));
        assert_eq!(header.external_system_id, "CRM_TEST");
    }

    #[test]
    fn test_change_list_header_requires_branch() {
        let result = builder().build_header(MessageType::ClientsChangeList, None);
        assert!(matches!(result, Err(MisError::Validation(_))));
    }

    #[test]
    fn test_client_add_header_drops_branch() {
        let header = builder()
            .build_header(MessageType::ClientAdd, Some(42))
            .unwrap();
        assert_eq!(header.branch_id, None);

        let body = builder().build_client_add_body(&PatientRecord::new("A", "B", "19900101"));
        let document = builder().build_document(&header, &body).unwrap();
        assert!(!document.contains("MSH.99"));
    }

    #[test]
    fn test_timestamp_is_fourteen_digits() {
        let header = builder().build_header(MessageType::ClientAdd, None).unwrap();
        assert_eq!(header.timestamp.len(), 14);
        assert!(header.timestamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_change_list_document_shape() {
        let b = builder();
        let header = b
            .build_header(MessageType::ClientsChangeList, Some(3))
            .unwrap();
        let document = b
            .build_document(&header, &b.build_change_list_body())
            .unwrap();

        assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(document.contains("<WEB_CLIENTS_CHANGE_LIST xmlns=\"http://sdsys.ru/\">"));
        assert!(document.contains("<MSH.3>CRM_TEST</MSH.3>"));
        assert!(document.contains(&format!("<MSH.7><TS.1>{}</TS.1></MSH.7>", header.timestamp)));
        assert!(document.contains("<MSH.9><MSG.1>WEB</MSG.1><MSG.2>CLIENTS_CHANGE_LIST</MSG.2></MSH.9>"));
        assert!(document.contains(&format!("<MSH.10>{}</MSH.10>", header.message_id)));
        assert!(document.contains("<MSH.18>UTF-8</MSH.18>"));
        assert!(document.contains("<MSH.99>3</MSH.99>"));
        assert!(document.contains("<CLIENTS_CHANGE_LIST_IN/>"));
        assert!(document.ends_with("</WEB_CLIENTS_CHANGE_LIST>"));
    }

    #[test]
    fn test_client_add_required_only_omits_optional_tags() {
        let b = builder();
        let patient = PatientRecord::new("Ivanov", "Ivan", "19850315");
        let header = b.build_header(MessageType::ClientAdd, None).unwrap();
        let document = b
            .build_document(&header, &b.build_client_add_body(&patient))
            .unwrap();

        assert!(document.contains(
            "<CLIENT_ADD_IN><LASTNAME>Ivanov</LASTNAME><FIRSTNAME>Ivan</FIRSTNAME><BDATE>19850315</BDATE></CLIENT_ADD_IN>"
        ));
        for tag in [
            "MIDNAME",
            "EMAIL",
            "PHONE",
            "GENDER",
            "SNILS",
            "NSP",
            "CHECKMODE",
            "REFUSECALL",
            "REFUSESMS",
        ] {
            assert!(!document.contains(&format!("<{tag}")), "unexpected {tag}");
        }
    }

    #[test]
    fn test_client_add_empty_required_still_written() {
        let body = builder().build_client_add_body(&PatientRecord::new("", "", ""));
        assert!(body.contains("LASTNAME"));
        assert!(body.contains("FIRSTNAME"));
        assert!(body.contains("BDATE"));
        assert_eq!(body.fields().len(), 3);
    }

    #[test]
    fn test_client_add_field_order() {
        let patient = PatientRecord::new("Ivanov", "Ivan", "19850315")
            .with_checkmode("1")
            .with_middle_name("Ivanovich")
            .with_gender("1");
        let body = builder().build_client_add_body(&patient);
        let tags: Vec<&str> = body.fields().iter().map(|(tag, _)| *tag).collect();
        assert_eq!(
            tags,
            vec!["LASTNAME", "FIRSTNAME", "MIDNAME", "BDATE", "GENDER", "CHECKMODE"]
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let b = builder();
        let patient = PatientRecord::new("O'Brien & <Sons>", "Ann", "19700101");
        let header = b.build_header(MessageType::ClientAdd, None).unwrap();
        let document = b
            .build_document(&header, &b.build_client_add_body(&patient))
            .unwrap();
        assert!(document.contains("&amp;"));
        assert!(document.contains("&lt;Sons&gt;"));
    }

    #[test]
    fn test_mismatched_header_and_body() {
        let b = builder();
        let header = b.build_header(MessageType::ClientAdd, None).unwrap();
        let result = b.build_document(&header, &b.build_change_list_body());
        assert!(matches!(result, Err(MisError::Validation(_))));
    }
}
