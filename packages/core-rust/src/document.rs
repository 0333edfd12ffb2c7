//! In-memory NETCONF document model.
//!
//! Requests and replies travel through the router as already-parsed element
//! trees. Parsing and byte-level serialization belong to the transport; the
//! `Display` rendering here exists for diagnostics and logs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace of the NETCONF base protocol (`<rpc>`, `<rpc-reply>`, `<close-session>`).
pub const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Namespace of the EXI capability operations (`<start-exi>`, `<stop-exi>`).
pub const EXI_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:exi:1.0";

/// Root element name of a request.
pub const RPC: &str = "rpc";

/// Root element name of a reply.
pub const RPC_REPLY: &str = "rpc-reply";

/// Attribute correlating a reply with its request.
pub const MESSAGE_ID: &str = "message-id";

// ---------------------------------------------------------------------------
// XmlElement
// ---------------------------------------------------------------------------

/// A single element with its attributes, text content and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl XmlElement {
    /// Creates an empty element without a namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Creates an empty element in the given namespace.
    #[must_use]
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.namespace = Some(namespace.into());
        element
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// First child element with the given local name.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text content of the first child with the given name, trimmed.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find_child(name)
            .and_then(|c| c.text.as_deref())
            .map(str::trim)
    }

    /// Returns `true` if this element has the given name and namespace.
    ///
    /// An element without a declared namespace inherits the one of its parent,
    /// so `None` here matches any expected namespace.
    #[must_use]
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace.as_deref().map_or(true, |ns| ns == namespace)
    }

    fn write_to(&self, f: &mut fmt::Formatter<'_>, parent_ns: Option<&str>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        if let Some(ns) = self.namespace.as_deref() {
            if parent_ns != Some(ns) {
                write!(f, " xmlns=\"{}\"", Escaped(ns))?;
            }
        }
        for (key, value) in &self.attributes {
            write!(f, " {key}=\"{}\"", Escaped(value))?;
        }
        if self.children.is_empty() && self.text.is_none() {
            return f.write_str("/>");
        }
        f.write_str(">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", Escaped(text))?;
        }
        let ns = self.namespace.as_deref().or(parent_ns);
        for child in &self.children {
            child.write_to(f, ns)?;
        }
        write!(f, "</{}>", self.name)
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, None)
    }
}

/// Escapes the five XML special characters while formatting.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '&' => f.write_str("&amp;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A complete NETCONF message: a request (`<rpc>`) or a reply (`<rpc-reply>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    root: XmlElement,
}

impl Document {
    #[must_use]
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Builds an `<rpc>` request in the base namespace carrying one operation element.
    #[must_use]
    pub fn rpc(message_id: impl Into<String>, operation: XmlElement) -> Self {
        Self::new(
            XmlElement::with_namespace(RPC, BASE_NAMESPACE)
                .attribute(MESSAGE_ID, message_id)
                .child(operation),
        )
    }

    #[must_use]
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    #[must_use]
    pub fn into_root(self) -> XmlElement {
        self.root
    }

    /// The operation element of an `<rpc>` request: its first child element.
    ///
    /// Returns `None` when the root is not `<rpc>` or carries no operation.
    #[must_use]
    pub fn rpc_operation(&self) -> Option<&XmlElement> {
        if !self.root.is(RPC, BASE_NAMESPACE) {
            return None;
        }
        self.root.children.first()
    }

    /// Name of the requested operation, if this is an `<rpc>` request.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.rpc_operation().map(|op| op.name.as_str())
    }

    /// Returns `true` if this is an `<rpc>` requesting operation `name` in `namespace`.
    ///
    /// An operation element without its own namespace is in the namespace of
    /// the enclosing `<rpc>`.
    #[must_use]
    pub fn is_rpc(&self, name: &str, namespace: &str) -> bool {
        self.rpc_operation().is_some_and(|op| {
            let effective = op.namespace.as_deref().or(self.root.namespace.as_deref());
            op.name == name && effective == Some(namespace)
        })
    }

    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.root.attributes.get(MESSAGE_ID).map(String::as_str)
    }

    /// Builds an `<rpc-reply>` for `request` around the given body.
    ///
    /// Every attribute of the request root is copied onto the reply, which
    /// keeps `message-id` and any vendor correlation attributes intact.
    #[must_use]
    pub fn reply_to(request: &Document, body: XmlElement) -> Self {
        let mut reply = XmlElement::with_namespace(RPC_REPLY, BASE_NAMESPACE).child(body);
        reply.attributes.clone_from(&request.root.attributes);
        Self::new(reply)
    }

    /// Builds an `<rpc-reply>` for `request` containing `<ok/>`.
    #[must_use]
    pub fn ok_reply(request: &Document) -> Self {
        Self::reply_to(request, XmlElement::new("ok"))
    }

    /// Returns `true` if this is a reply whose body is `<ok/>`.
    #[must_use]
    pub fn is_ok_reply(&self) -> bool {
        self.root.is(RPC_REPLY, BASE_NAMESPACE) && self.root.find_child("ok").is_some()
    }

    /// Renders the document, cutting the output to at most `limit` bytes.
    #[must_use]
    pub fn render_truncated(&self, limit: usize) -> String {
        let mut rendered = self.to_string();
        if rendered.len() > limit {
            let mut cut = limit;
            while !rendered.is_char_boundary(cut) {
                cut -= 1;
            }
            rendered.truncate(cut);
            rendered.push_str("...");
        }
        rendered
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn get_config() -> Document {
        Document::rpc(
            "101",
            XmlElement::new("get-config").child(
                XmlElement::new("source").child(XmlElement::new("running")),
            ),
        )
    }

    #[test]
    fn rpc_operation_is_first_child_of_rpc() {
        let doc = get_config();
        assert_eq!(doc.operation_name(), Some("get-config"));
        assert_eq!(doc.message_id(), Some("101"));
    }

    #[test]
    fn is_rpc_resolves_inherited_namespace() {
        let close = Document::rpc("1", XmlElement::new("close-session"));
        assert!(close.is_rpc("close-session", BASE_NAMESPACE));
        assert!(!close.is_rpc("close-session", EXI_NAMESPACE));

        let start = Document::rpc("2", XmlElement::with_namespace("start-exi", EXI_NAMESPACE));
        assert!(start.is_rpc("start-exi", EXI_NAMESPACE));
        assert!(!Document::rpc("3", XmlElement::new("start-exi")).is_rpc("start-exi", EXI_NAMESPACE));
    }

    #[test]
    fn non_rpc_root_has_no_operation() {
        let doc = Document::new(XmlElement::with_namespace("hello", BASE_NAMESPACE));
        assert!(doc.rpc_operation().is_none());

        let foreign = Document::new(
            XmlElement::with_namespace(RPC, "urn:example:other").child(XmlElement::new("x")),
        );
        assert!(foreign.rpc_operation().is_none());
    }

    #[test]
    fn renders_nested_elements_and_declares_namespace_once() {
        let rendered = get_config().to_string();
        assert_eq!(
            rendered,
            "<rpc xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\" message-id=\"101\">\
             <get-config><source><running/></source></get-config></rpc>"
        );
    }

    #[test]
    fn render_escapes_text_and_attributes() {
        let el = XmlElement::new("filter")
            .attribute("select", "a<b & \"c\"")
            .text("1 < 2");
        assert_eq!(
            el.to_string(),
            "<filter select=\"a&lt;b &amp; &quot;c&quot;\">1 &lt; 2</filter>"
        );
    }

    #[test]
    fn ok_reply_copies_request_attributes() {
        let request = Document::new(get_config().into_root().attribute("xmlns:ex", "urn:example"));

        let reply = Document::ok_reply(&request);
        assert!(reply.is_ok_reply());
        assert_eq!(reply.message_id(), Some("101"));
        assert_eq!(
            reply.root().attributes.get("xmlns:ex").map(String::as_str),
            Some("urn:example")
        );
    }

    #[test]
    fn child_text_is_trimmed() {
        let op = XmlElement::with_namespace("start-exi", EXI_NAMESPACE)
            .child(XmlElement::new("alignment").text("  byte-aligned\n"));
        assert_eq!(op.child_text("alignment"), Some("byte-aligned"));
        assert_eq!(op.child_text("fidelity"), None);
    }

    #[test]
    fn element_without_namespace_inherits_any() {
        let el = XmlElement::new("close-session");
        assert!(el.is("close-session", BASE_NAMESPACE));
        let el = XmlElement::with_namespace("close-session", EXI_NAMESPACE);
        assert!(!el.is("close-session", BASE_NAMESPACE));
    }

    #[test]
    fn render_truncated_respects_limit() {
        let doc = get_config();
        let short = doc.render_truncated(10);
        assert_eq!(short, "<rpc xmlns...");
        assert_eq!(doc.render_truncated(10_000), doc.to_string());
    }

    #[test]
    fn serde_skips_empty_fields() {
        let json = serde_json::to_string(&XmlElement::new("ok")).unwrap();
        assert_eq!(json, r#"{"name":"ok"}"#);
    }
}
