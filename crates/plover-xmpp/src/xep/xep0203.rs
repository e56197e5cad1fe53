//! XEP-0203: Delayed Delivery
//!
//! Messages held back by the server (offline storage, history) carry a
//! `<delay/>` child stamping when and where the delay happened. The
//! stamp is passed through as sent, not reparsed.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0203.html>

use minidom::Element;

use plover_core::Delay;

use crate::stanza::{child_in, ns, text_content};

/// XEP-0203 delayed delivery namespace.
pub const NS_DELAY: &str = ns::DELAY;

/// The delay details of a message, if any.
///
/// A `<delay/>` without a `stamp` attribute is ignored.
pub fn delay_of(message: &Element) -> Option<Delay> {
    let delay = child_in(message, "delay", NS_DELAY)?;
    Some(Delay {
        when: delay.attr("stamp")?.to_string(),
        reason: text_content(delay),
        from: delay.attr("from").map(str::to_string),
    })
}
