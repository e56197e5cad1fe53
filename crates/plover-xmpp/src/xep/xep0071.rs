//! XEP-0071: XHTML-IM
//!
//! Rich message bodies travel as an `<html/>` sibling of the plain
//! `<body/>`: the wrapper sits in the XHTML-IM namespace, the inner body
//! in XHTML proper. Socket clients exchange the markup as a string of
//! inline XML without namespace noise.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0071.html>

use std::str::FromStr;

use minidom::Element;

use crate::stanza::{child_in, ns};

/// XHTML-IM wrapper namespace.
pub const NS_XHTML_IM: &str = ns::XHTML_IM;

/// XHTML body namespace.
pub const NS_XHTML: &str = ns::XHTML;

/// Parse client-supplied markup into an XHTML `<body/>`.
///
/// The content is wrapped so bare text and multiple top-level elements
/// are both acceptable; anything that is not well-formed XML fails.
pub fn parse_content(content: &str) -> Result<Element, minidom::Error> {
    Element::from_str(&format!("<body xmlns='{}'>{}</body>", NS_XHTML, content))
}

/// Wrap an XHTML `<body/>` in its `<html/>` carrier.
pub fn wrap_body(body: Element) -> Element {
    Element::builder("html", NS_XHTML_IM).append(body).build()
}

/// The XHTML `<body/>` of a message, when one is present.
pub fn xhtml_body(message: &Element) -> Option<&Element> {
    child_in(message, "html", NS_XHTML_IM).and_then(|html| child_in(html, "body", NS_XHTML))
}
