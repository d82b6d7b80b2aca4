//! SOAP 1.1 envelope construction and response parsing.
//!
//! Responses are read into a small element tree keyed by local names, so
//! namespace prefixes chosen by the server do not matter.

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;

use crate::error::ServiceError;

/// Target namespace of the Plunet integration API.
pub(crate) const API_NAMESPACE: &str = "http://API.Integration/";

// ── Envelope ────────────────────────────────────────────────────────

/// Request envelope for one document/literal operation.
pub(crate) struct Envelope {
    operation: &'static str,
    body: String,
}

impl Envelope {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self {
            operation,
            body: String::new(),
        }
    }

    pub(crate) fn operation(&self) -> &'static str {
        self.operation
    }

    /// Append a scalar parameter, escaping its value.
    pub(crate) fn param(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        let value = value.to_string();
        self.body
            .push_str(&format!("<{name}>{}</{name}>", escape(value.as_str())));
        self
    }

    /// Append a pre-built XML fragment.
    pub(crate) fn fragment(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub(crate) fn into_xml(self) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8"?>"#,
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:api="{ns}">"#,
                "<soapenv:Header/><soapenv:Body><api:{op}>{body}</api:{op}></soapenv:Body></soapenv:Envelope>"
            ),
            ns = API_NAMESPACE,
            op = self.operation,
            body = self.body,
        )
    }
}

// ── Element tree ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Node {
    pub name: String,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub(crate) fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Depth-first search for the first element with this local name.
    pub(crate) fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Text of a direct child, or `""` if the child is absent.
    pub(crate) fn child_text(&self, name: &str) -> &str {
        self.child(name).map_or("", |c| c.text.as_str())
    }

    /// Text of a direct child that must be present.
    pub(crate) fn required_text(&self, operation: &str, name: &str) -> Result<&str, ServiceError> {
        self.child(name)
            .map(|c| c.text.as_str())
            .ok_or_else(|| ServiceError::missing(operation, name))
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parse a document into a tree rooted at an unnamed node.
pub(crate) fn parse_tree(xml: &str) -> Result<Node, String> {
    let mut reader = Reader::from_str(xml);
    // Each open element carries the raw (still escaped) text seen so far.
    let mut stack: Vec<(Node, String)> = vec![(Node::default(), String::new())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let node = Node {
                    name: local_name(e.local_name().as_ref()),
                    ..Default::default()
                };
                stack.push((node, String::new()));
            }
            Ok(Event::Empty(e)) => {
                let node = Node {
                    name: local_name(e.local_name().as_ref()),
                    ..Default::default()
                };
                if let Some((parent, _)) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((_, raw)) = stack.last_mut() {
                    raw.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((_, raw)) = stack.last_mut() {
                    let literal = String::from_utf8_lossy(&c).into_owned();
                    raw.push_str(&escape(literal.as_str()));
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if let Some((_, raw)) = stack.last_mut() {
                    raw.push('&');
                    raw.push_str(&String::from_utf8_lossy(&r));
                    raw.push(';');
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err("unbalanced closing tag".into());
                }
                let Some((mut node, raw)) = stack.pop() else {
                    return Err("unbalanced closing tag".into());
                };
                node.text = unescape(&raw).map_err(|e| e.to_string())?.into_owned();
                if let Some((parent, _)) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    if stack.len() != 1 {
        return Err("unexpected end of document".into());
    }
    stack
        .pop()
        .map(|(root, _)| root)
        .ok_or_else(|| "empty document".to_string())
}

// ── Results ─────────────────────────────────────────────────────────

/// The `<return>` element of a response, with a SOAP fault already ruled out.
#[derive(Debug)]
pub(crate) struct ApiResult {
    operation: &'static str,
    ret: Node,
}

impl ApiResult {
    /// Parse a response body and locate its `<return>` element.
    pub(crate) fn from_response(operation: &'static str, xml: &str) -> Result<Self, ServiceError> {
        let root = parse_tree(xml).map_err(|reason| ServiceError::Xml {
            operation: operation.to_string(),
            reason,
        })?;

        if let Some(fault) = root.find("Fault") {
            let reason = match fault.child_text("faultstring") {
                "" => "unspecified fault".to_string(),
                s => s.to_string(),
            };
            return Err(ServiceError::Fault {
                operation: operation.to_string(),
                reason,
            });
        }

        let ret = root
            .find("return")
            .cloned()
            .ok_or_else(|| ServiceError::missing(operation, "return"))?;
        Ok(Self { operation, ret })
    }

    /// Text content of `<return>` itself, for operations returning a bare string.
    pub(crate) fn text(&self) -> &str {
        &self.ret.text
    }

    pub(crate) fn status_code(&self) -> Result<i32, ServiceError> {
        let raw = self
            .ret
            .child("statusCode")
            .ok_or_else(|| ServiceError::missing(self.operation, "statusCode"))?;
        raw.text
            .trim()
            .parse()
            .map_err(|_| ServiceError::invalid(self.operation, "statusCode", &raw.text))
    }

    /// Fail unless the result carries status code `0`.
    pub(crate) fn ensure_ok(self) -> Result<Self, ServiceError> {
        let code = self.status_code()?;
        if code == 0 {
            return Ok(self);
        }
        Err(ServiceError::Status {
            operation: self.operation.to_string(),
            code,
            message: self.ret.child_text("statusMessage").to_string(),
        })
    }

    /// First `<data>` element, required.
    pub(crate) fn data(&self) -> Result<&Node, ServiceError> {
        self.ret
            .child("data")
            .ok_or_else(|| ServiceError::missing(self.operation, "data"))
    }

    /// First `<data>` text, required.
    pub(crate) fn data_text(&self) -> Result<String, ServiceError> {
        self.data().map(|node| node.text.clone())
    }

    /// First `<data>` text; an omitted element reads as empty.
    pub(crate) fn optional_data_text(&self) -> String {
        self.ret.child_text("data").to_string()
    }

    pub(crate) fn data_i64(&self) -> Result<i64, ServiceError> {
        let node = self.data()?;
        parse_i64(self.operation, "data", &node.text)
    }

    /// All `<data>` entries as integers.
    pub(crate) fn data_list_i64(&self) -> Result<Vec<i64>, ServiceError> {
        self.ret
            .children_named("data")
            .map(|n| parse_i64(self.operation, "data", &n.text))
            .collect()
    }
}

pub(crate) fn parse_i64(operation: &str, field: &str, raw: &str) -> Result<i64, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::missing(operation, field));
    }
    trimmed
        .parse()
        .map_err(|_| ServiceError::invalid(operation, field, raw))
}
