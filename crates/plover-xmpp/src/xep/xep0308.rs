//! XEP-0308: Last Message Correction
//!
//! A correction names the message it replaces through a `<replace/>`
//! child; the new body rides in the normal `<body/>`.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0308.html>

use minidom::Element;

use crate::stanza::{child_in, ns};

/// XEP-0308 message correction namespace.
pub const NS_CORRECTION: &str = ns::CORRECTION;

/// Build the `<replace/>` child naming the corrected message.
pub fn replace(id: &str) -> Element {
    Element::builder("replace", NS_CORRECTION).attr("id", id).build()
}

/// The ID of the message this one corrects, if any.
pub fn replace_id(message: &Element) -> Option<String> {
    child_in(message, "replace", NS_CORRECTION)
        .and_then(|replace| replace.attr("id"))
        .map(str::to_string)
}
