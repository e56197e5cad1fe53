//! XEP-0184: Message Delivery Receipts
//!
//! A sender asks for a receipt with an empty `<request/>` child; the
//! recipient acknowledges with `<received id='…'/>` naming the original
//! message.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0184.html>

use minidom::Element;

use crate::stanza::{child_in, ns};

/// XEP-0184 delivery receipts namespace.
pub const NS_RECEIPTS: &str = ns::RECEIPTS;

/// Build the `<request/>` child asking for a receipt.
pub fn request() -> Element {
    Element::builder("request", NS_RECEIPTS).build()
}

/// Build the `<received/>` acknowledgement for a message ID.
pub fn received(id: &str) -> Element {
    Element::builder("received", NS_RECEIPTS).attr("id", id).build()
}

/// The acknowledged message ID, when this message is a receipt.
pub fn received_id(message: &Element) -> Option<String> {
    child_in(message, "received", NS_RECEIPTS)
        .and_then(|received| received.attr("id"))
        .map(str::to_string)
}

/// Whether the sender asked for a delivery receipt.
pub fn requests_receipt(message: &Element) -> bool {
    child_in(message, "request", NS_RECEIPTS).is_some()
}

/// Whether the message carries any receipt child at all.
pub fn has_receipt_child(message: &Element) -> bool {
    requests_receipt(message) || child_in(message, "received", NS_RECEIPTS).is_some()
}
