//! SOAP 1.1 envelope codec
//!
//! Outgoing bodies are wrapped in a fixed envelope. Replies are converted to
//! a JSON tree (qualified element names as keys, `@name` for attributes,
//! `#text` for mixed text, repeated elements as arrays, empty elements as
//! null) and the contents of the envelope's `Body` are returned. Any reply
//! that cannot be read that way is passed through verbatim.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::constants::soap::{ENVELOPE_NS, RFC_FUNCTIONS_NS};

pub fn wrap(body: &str) -> String {
    format!(
        concat!(
            r#"<soapenv:Envelope xmlns:soapenv="{}" xmlns:urn="{}">"#,
            "<soapenv:Header/><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"
        ),
        ENVELOPE_NS, RFC_FUNCTIONS_NS, body
    )
}

/// JSON text of the reply's SOAP body, or the reply itself
pub fn extract_body(reply: &str) -> String {
    match soap_body(reply) {
        Some(body) => body.to_string(),
        None => reply.to_string(),
    }
}

fn soap_body(reply: &str) -> Option<Value> {
    let document = xml_to_json(reply)?;
    let envelope = find_local(&document, "Envelope")?.as_object()?;
    let body = find_local(envelope, "Body")?;

    match body {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.clone()),
    }
}

/// Value of the first key whose local part (after any prefix) matches
fn find_local<'a>(map: &'a Map<String, Value>, local: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| key.rsplit(':').next() == Some(local))
        .map(|(_, value)| value)
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Option<Self> {
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr.ok()?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value().ok()?.into_owned();
            children.insert(key, Value::String(value));
        }
        Some(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let value = match (self.children.is_empty(), self.text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(self.text),
            (false, _) => {
                let mut children = self.children;
                if !self.text.is_empty() {
                    children.insert("#text".to_string(), Value::String(self.text));
                }
                Value::Object(children)
            }
        };
        (self.name, value)
    }
}

fn append(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

fn xml_to_json(xml: &str) -> Option<Map<String, Value>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root = Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                match stack.last_mut() {
                    Some(parent) => append(&mut parent.children, name, value),
                    None => append(&mut root, name, value),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let text: Cow<'_, str> = text.unescape().ok()?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let (name, value) = stack.pop()?.close();
                match stack.last_mut() {
                    Some(parent) => append(&mut parent.children, name, value),
                    None => append(&mut root, name, value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return None;
    }

    Some(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_wrap() {
        let wrapped = wrap("<urn:X><A>1</A></urn:X>");
        assert!(wrapped.starts_with("<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\""));
        assert!(wrapped.contains("xmlns:urn=\"urn:sap-com:document:sap:rfc:functions\""));
        assert!(wrapped.contains("<soapenv:Header/><soapenv:Body><urn:X><A>1</A></urn:X></soapenv:Body>"));
        assert!(wrapped.ends_with("</soapenv:Envelope>"));
    }

    #[rstest]
    #[case("soap-env")]
    #[case("SOAP-ENV")]
    #[case("soapenv")]
    fn test_extract_body_any_prefix(#[case] prefix: &str) {
        let reply = format!(
            r#"<?xml version="1.0" encoding="utf-8"?><{p}:Envelope xmlns:{p}="http://schemas.xmlsoap.org/soap/envelope/"><{p}:Header/><{p}:Body><n0:ZBAPI_SALESORDER_CREATEResponse xmlns:n0="urn:sap-com:document:sap:rfc:functions"><SALESDOCUMENT>0000012345</SALESDOCUMENT></n0:ZBAPI_SALESORDER_CREATEResponse></{p}:Body></{p}:Envelope>"#,
            p = prefix
        );

        let body: Value = serde_json::from_str(&extract_body(&reply)).unwrap();
        assert_eq!(
            body,
            json!({
                "n0:ZBAPI_SALESORDER_CREATEResponse": {
                    "@xmlns:n0": "urn:sap-com:document:sap:rfc:functions",
                    "SALESDOCUMENT": "0000012345"
                }
            })
        );
    }

    #[test]
    fn test_repeated_and_empty_elements() {
        let reply = concat!(
            "<s:Envelope xmlns:s=\"x\"><s:Body><R>",
            "<RETURN><item><TYPE>E</TYPE><MESSAGE>a &amp; b</MESSAGE></item>",
            "<item><TYPE>W</TYPE><MESSAGE/></item></RETURN>",
            "</R></s:Body></s:Envelope>"
        );

        let body: Value = serde_json::from_str(&extract_body(reply)).unwrap();
        assert_eq!(
            body["R"]["RETURN"]["item"],
            json!([
                {"TYPE": "E", "MESSAGE": "a & b"},
                {"TYPE": "W", "MESSAGE": null}
            ])
        );
    }

    #[rstest]
    #[case("this is not xml")]
    #[case("<html><body>Gateway error</body></html>")]
    #[case("<s:Envelope xmlns:s=\"x\"><s:Body></s:Body></s:Envelope>")]
    #[case("<s:Envelope xmlns:s=\"x\"><s:Body><unclosed></s:Body>")]
    #[case("")]
    fn test_unusable_reply_is_returned_verbatim(#[case] reply: &str) {
        assert_eq!(extract_body(reply), reply);
    }
}
