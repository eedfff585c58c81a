//! Response parsing and validation
//!
//! Responses are parsed into a small owned element tree. Element names are
//! stored by local name only: namespace prefixes and `xmlns` declarations are
//! dropped while parsing, so lookups do not depend on the namespace URI the
//! server chooses to emit.

use crate::domain::{Acknowledgment, ChangeRecord, MisError, ProcedureResult, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Element holding one change event in a `CLIENTS_CHANGE_LIST` response
pub const CHANGE_EVENT_ELEMENT: &str = "CLIENT_CHANGE_INFO";

/// Acknowledgment status field
const ACK_STATUS: &str = "MSA.1";
/// Acknowledgment detail field
const ACK_DETAIL: &str = "MSA.3";
const RESULT_CODE: &str = "SPRESULT";
const RESULT_COMMENT: &str = "SPCOMMENT";

/// An element of a parsed response document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Local name of the element
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text content with surrounding whitespace trimmed
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First descendant with the given name, in document order
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|c| {
            if c.name == name {
                Some(c)
            } else {
                c.find(name)
            }
        })
    }

    /// All descendants with the given name, in document order
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Text of the first `child` directly below any `section` element
    pub fn find_in_section(&self, section: &str, child: &str) -> Option<&str> {
        self.find_all(section)
            .into_iter()
            .find_map(|s| s.child(child))
            .map(XmlElement::text)
    }
}

/// Parses a raw response body
///
/// # Errors
///
/// Returns [`MisError::Parse`] if the body is not UTF-8 or not a
/// well-formed document with a single root element.
pub fn parse(raw_response: &[u8]) -> Result<XmlElement> {
    let text = std::str::from_utf8(raw_response)
        .map_err(|e| MisError::Parse(format!("Response is not valid UTF-8: {e}")))?;

    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(MisError::Parse(
                        "Content after the document root element".to_string(),
                    ));
                }
                stack.push(XmlElement {
                    name: local_name(start.local_name().as_ref())?,
                    ..Default::default()
                });
            }
            Event::Empty(start) => {
                let element = XmlElement {
                    name: local_name(start.local_name().as_ref())?,
                    ..Default::default()
                };
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| MisError::Parse("Unexpected closing tag".to_string()))?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&value),
                    None if value.trim().is_empty() => {}
                    None => {
                        return Err(MisError::Parse(
                            "Text outside of the document root element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(MisError::Parse(format!(
            "Unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }

    root.ok_or_else(|| MisError::Parse("Response contains no root element".to_string()))
}

fn close_element(
    element: XmlElement,
    stack: &mut Vec<XmlElement>,
    root: &mut Option<XmlElement>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(MisError::Parse(
                "Content after the document root element".to_string(),
            ))
        }
    }
    Ok(())
}

fn local_name(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| MisError::Parse(format!("Invalid element name: {e}")))
}

/// Reads the acknowledgment block
///
/// # Errors
///
/// Returns [`MisError::Parse`] when the status field is absent. A response
/// without an acknowledgment is malformed, not successful.
pub fn check_acknowledgment(doc: &XmlElement) -> Result<Acknowledgment> {
    let code = doc
        .find(ACK_STATUS)
        .map(XmlElement::text)
        .ok_or_else(|| {
            MisError::Parse(format!("Response has no acknowledgment status ({ACK_STATUS})"))
        })?;
    let detail = doc.find(ACK_DETAIL).map(XmlElement::text).unwrap_or_default();

    Ok(Acknowledgment::new(code, detail))
}

/// Reads the stored-procedure result from the named output section
///
/// A missing or empty `SPRESULT` yields the sentinel code
/// [`RESULT_CODE_MISSING`](crate::domain::outcome::RESULT_CODE_MISSING).
///
/// # Errors
///
/// Returns [`MisError::Parse`] when `SPRESULT` is present but not an integer.
pub fn extract_result(doc: &XmlElement, output_section: &str) -> Result<ProcedureResult> {
    let comment = doc
        .find_in_section(output_section, RESULT_COMMENT)
        .unwrap_or_default();

    match doc.find_in_section(output_section, RESULT_CODE) {
        Some(value) if !value.is_empty() => {
            let code = value.parse::<i64>().map_err(|_| {
                MisError::Parse(format!(
                    "{output_section}/{RESULT_CODE} is not an integer: '{value}'"
                ))
            })?;
            Ok(ProcedureResult::new(code, comment))
        }
        _ => Ok(ProcedureResult {
            comment: comment.to_string(),
            ..ProcedureResult::missing()
        }),
    }
}

/// Collects every element named `element` as a change record
///
/// Each direct child becomes one field, its text trimmed.
pub fn extract_records(doc: &XmlElement, element: &str) -> Vec<ChangeRecord> {
    doc.find_all(element)
        .into_iter()
        .map(|node| {
            node.children()
                .iter()
                .map(|field| (field.name(), field.text()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::RESULT_CODE_MISSING;
    use test_case::test_case;

    const CHANGE_LIST_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WEB_CLIENTS_CHANGE_LIST_RESPONSE xmlns="http://sdsys.ru/">
  <MSA>
    <MSA.1>AA</MSA.1>
    <MSA.3></MSA.3>
  </MSA>
  <CLIENTS_CHANGE_LIST_OUT>
    <SPRESULT>1</SPRESULT>
    <SPCOMMENT>OK</SPCOMMENT>
  </CLIENTS_CHANGE_LIST_OUT>
</WEB_CLIENTS_CHANGE_LIST_RESPONSE>"#;

    #[test]
    fn test_parse_and_lookup() {
        let doc = parse(CHANGE_LIST_OK.as_bytes()).unwrap();
        assert_eq!(doc.name(), "WEB_CLIENTS_CHANGE_LIST_RESPONSE");
        assert_eq!(doc.find("SPCOMMENT").map(XmlElement::text), Some("OK"));
        assert!(doc.child("MSA").is_some());
        assert!(doc.child("SPRESULT").is_none());
    }

    #[test]
    fn test_acknowledgment_ok() {
        let doc = parse(CHANGE_LIST_OK.as_bytes()).unwrap();
        let ack = check_acknowledgment(&doc).unwrap();
        assert!(ack.is_ok());
        assert_eq!(ack.detail, "");
    }

    #[test]
    fn test_acknowledgment_error_detail() {
        let doc = parse(
            b"<R><MSA><MSA.1>AE</MSA.1><MSA.3> Unknown system </MSA.3></MSA></R>",
        )
        .unwrap();
        let ack = check_acknowledgment(&doc).unwrap();
        assert!(!ack.is_ok());
        assert_eq!(ack.code, "AE");
        assert_eq!(ack.detail, "Unknown system");
    }

    #[test]
    fn test_missing_acknowledgment_is_parse_error() {
        let doc = parse(b"<R><OUT><SPRESULT>1</SPRESULT></OUT></R>").unwrap();
        assert!(matches!(
            check_acknowledgment(&doc),
            Err(MisError::Parse(_))
        ));
    }

    #[test]
    fn test_extract_result() {
        let doc = parse(CHANGE_LIST_OK.as_bytes()).unwrap();
        let result = extract_result(&doc, "CLIENTS_CHANGE_LIST_OUT").unwrap();
        assert_eq!(result, ProcedureResult::new(1, "OK"));
    }

    #[test_case("<R><MSA><MSA.1>AA</MSA.1></MSA></R>" ; "section absent")]
    #[test_case("<R><X_OUT><SPCOMMENT>c</SPCOMMENT></X_OUT></R>" ; "code absent")]
    #[test_case("<R><X_OUT><SPRESULT> </SPRESULT></X_OUT></R>" ; "code empty")]
    fn test_extract_result_sentinel(document: &str) {
        let doc = parse(document.as_bytes()).unwrap();
        let result = extract_result(&doc, "X_OUT").unwrap();
        assert_eq!(result.code, RESULT_CODE_MISSING);
        assert!(!result.is_success());
    }

    #[test]
    fn test_missing_code_keeps_comment() {
        let doc = parse(b"<R><X_OUT><SPCOMMENT> no data </SPCOMMENT></X_OUT></R>").unwrap();
        let result = extract_result(&doc, "X_OUT").unwrap();
        assert_eq!(result, ProcedureResult::new(RESULT_CODE_MISSING, "no data"));
    }

    #[test]
    fn test_records_keep_field_order() {
        let doc = parse(
            b"<R><E><PPHONE>1</PPHONE><CHANGEID>7</CHANGEID><LASTNAME>B</LASTNAME></E></R>",
        )
        .unwrap();
        let records = extract_records(&doc, "E");
        let names: Vec<&str> = records[0].fields().map(|(name, _)| name).collect();
        assert_eq!(names, ["PPHONE", "CHANGEID", "LASTNAME"]);
    }

    #[test]
    fn test_result_outside_section_is_ignored() {
        let doc = parse(b"<R><SPRESULT>1</SPRESULT><X_OUT/></R>").unwrap();
        let result = extract_result(&doc, "X_OUT").unwrap();
        assert_eq!(result.code, RESULT_CODE_MISSING);
        assert_eq!(result.comment, "");
    }

    #[test]
    fn test_non_numeric_result_is_parse_error() {
        let doc = parse(b"<R><X_OUT><SPRESULT>one</SPRESULT></X_OUT></R>").unwrap();
        assert!(matches!(
            extract_result(&doc, "X_OUT"),
            Err(MisError::Parse(_))
        ));
    }

    #[test]
    fn test_foreign_namespace_is_stripped() {
        let document = r#"<ns2:WEB_CLIENT_ADD_RESPONSE xmlns:ns2="urn:other:ns" xmlns="urn:default">
            <ns2:MSA><ns2:MSA.1>AA</ns2:MSA.1></ns2:MSA>
            <CLIENT_ADD_OUT><SPRESULT>1</SPRESULT><PCODE>77</PCODE></CLIENT_ADD_OUT>
        </ns2:WEB_CLIENT_ADD_RESPONSE>"#;
        let doc = parse(document.as_bytes()).unwrap();

        assert_eq!(doc.name(), "WEB_CLIENT_ADD_RESPONSE");
        assert!(check_acknowledgment(&doc).unwrap().is_ok());
        assert_eq!(doc.find_in_section("CLIENT_ADD_OUT", "PCODE"), Some("77"));
    }

    #[test]
    fn test_extract_records_in_order() {
        let document = r#"<R>
            <CLIENT_CHANGE_INFO><CHANGEID> 1 </CHANGEID><LASTNAME>  A  </LASTNAME></CLIENT_CHANGE_INFO>
            <CLIENT_CHANGE_INFO><CHANGEID>2</CHANGEID><LASTNAME/></CLIENT_CHANGE_INFO>
        </R>"#;
        let doc = parse(document.as_bytes()).unwrap();
        let records = extract_records(&doc, "CLIENT_CHANGE_INFO");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].change_id(), Some("1"));
        assert_eq!(records[0].last_name(), Some("A"));
        assert_eq!(records[1].change_id(), Some("2"));
        assert_eq!(records[1].last_name(), Some(""));
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = parse(b"<R><A>x &amp; y</A><B><![CDATA[<raw>]]></B></R>").unwrap();
        assert_eq!(doc.find("A").map(XmlElement::text), Some("x & y"));
        assert_eq!(doc.find("B").map(XmlElement::text), Some("<raw>"));
    }

    #[test_case(b"<R><A></R>" ; "mismatched end tag")]
    #[test_case(b"<R><A>" ; "unclosed element")]
    #[test_case(b"" ; "empty body")]
    #[test_case(b"plain text" ; "no root")]
    #[test_case(b"<R/><S/>" ; "two roots")]
    #[test_case(b"\xff\xfe<R/>" ; "invalid utf8")]
    fn test_malformed_is_parse_error(raw: &[u8]) {
        assert!(matches!(parse(raw), Err(MisError::Parse(_))));
    }
}
