//! Element-tree helpers shared by every handler.
//!
//! Stanzas reach this layer as pre-parsed `minidom::Element` trees from
//! the session's XML parser; nothing here touches raw bytes. A stanza's
//! semantic category is its root element name plus `type` attribute, so
//! the lookups here are deliberately small: find a child by name, find a
//! child by name and namespace, pull text out.

use minidom::{Element, Node};

/// Namespace URIs this layer must reproduce exactly for interoperability.
pub mod ns {
    /// XMPP client stream namespace
    pub const JABBER_CLIENT: &str = "jabber:client";
    /// Stanza error condition namespace
    pub const STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
    /// XEP-0004 data forms
    pub const DATA_FORMS: &str = "jabber:x:data";
    /// XEP-0071 XHTML-IM wrapper
    pub const XHTML_IM: &str = "http://jabber.org/protocol/xhtml-im";
    /// XHTML body namespace
    pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
    /// XEP-0085 chat state notifications
    pub const CHAT_STATES: &str = "http://jabber.org/protocol/chatstates";
    /// XEP-0115 entity capabilities
    pub const CAPS: &str = "http://jabber.org/protocol/caps";
    /// XEP-0172 user nickname
    pub const NICK: &str = "http://jabber.org/protocol/nick";
    /// XEP-0184 message delivery receipts
    pub const RECEIPTS: &str = "urn:xmpp:receipts";
    /// XEP-0203 delayed delivery
    pub const DELAY: &str = "urn:xmpp:delay";
    /// XEP-0308 last message correction
    pub const CORRECTION: &str = "urn:xmpp:message-correct:0";
    /// Legacy message archiving tags
    pub const ARCHIVE: &str = "urn:xmpp:mam:tmp";
}

/// First child with the given name, in any namespace.
pub fn child<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.children().find(|c| c.name() == name)
}

/// First child with the given name in the given namespace.
pub fn child_in<'a>(element: &'a Element, name: &str, namespace: &str) -> Option<&'a Element> {
    element
        .children()
        .find(|c| c.name() == name && c.ns() == namespace)
}

/// All children with the given name in the given namespace.
pub fn children_in<'a>(
    element: &'a Element,
    name: &'a str,
    namespace: &'a str,
) -> impl Iterator<Item = &'a Element> {
    element
        .children()
        .filter(move |c| c.name() == name && c.ns() == namespace)
}

/// A non-empty attribute value, owned.
pub fn attr_string(element: &Element, name: &str) -> Option<String> {
    element
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// The element's own text content, `None` when empty.
pub fn text_content(element: &Element) -> Option<String> {
    let text = element.text();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Serialize an element tree to its XML string form.
pub fn to_xml_string(element: &Element) -> String {
    let mut buffer = Vec::new();
    if element.write_to(&mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Serialize an element's child nodes as inline markup.
///
/// This is the "inner XML" of the element: child elements keep their
/// names and attributes but carry no namespace declarations, matching
/// how rich content is surfaced to (and accepted from) socket clients.
pub fn inner_xml(element: &Element) -> String {
    let mut out = String::new();
    for node in element.nodes() {
        write_node(&mut out, node);
    }
    out
}

/// All descendant text in document order, markup dropped.
pub fn flatten_text(element: &Element) -> String {
    let mut out = String::new();
    collect_text(&mut out, element);
    out
}

fn collect_text(out: &mut String, element: &Element) {
    for node in element.nodes() {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) => collect_text(out, child),
        }
    }
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Element(element) => write_element(out, element),
    }
}

fn write_element(out: &mut String, element: &Element) {
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attrs() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    if element.nodes().next().is_none() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for node in element.nodes() {
        write_node(out, node);
    }
    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
