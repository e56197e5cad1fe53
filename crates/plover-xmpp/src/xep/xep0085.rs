//! XEP-0085: Chat State Notifications
//!
//! A chat state rides as a bare child element named after the state, in
//! its own namespace. A message may carry a state alongside a body or as
//! its only payload.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0085.html>

use minidom::Element;

use plover_core::ChatState;

use crate::stanza::ns;

/// XEP-0085 chat states namespace.
pub const NS_CHAT_STATES: &str = ns::CHAT_STATES;

/// Build the element for a chat state.
pub fn element(state: ChatState) -> Element {
    Element::builder(state.as_str(), NS_CHAT_STATES).build()
}

/// The chat state carried by a message, if any.
pub fn state_of(message: &Element) -> Option<ChatState> {
    message
        .children()
        .find(|c| c.ns() == NS_CHAT_STATES)
        .and_then(|c| ChatState::parse(c.name()))
}
