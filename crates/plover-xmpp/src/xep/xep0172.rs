//! XEP-0172: User Nickname
//!
//! Subscription requests may suggest a display name via a `<nick/>`
//! child.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0172.html>

use minidom::Element;

use crate::stanza::{child_in, ns, text_content};

/// XEP-0172 user nickname namespace.
pub const NS_NICK: &str = ns::NICK;

/// The nickname carried by a presence stanza, if any.
pub fn nick_of(presence: &Element) -> Option<String> {
    child_in(presence, "nick", NS_NICK).and_then(text_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_nickname() {
        let presence: Element = "<presence xmlns='jabber:client' type='subscribe'>\
            <nick xmlns='http://jabber.org/protocol/nick'>monty</nick>\
            </presence>"
            .parse()
            .unwrap();
        assert_eq!(nick_of(&presence), Some("monty".to_string()));
    }

    #[test]
    fn absent_or_empty_nicknames_yield_none() {
        let bare: Element = "<presence xmlns='jabber:client' type='subscribe'/>"
            .parse()
            .unwrap();
        assert_eq!(nick_of(&bare), None);

        let empty: Element = "<presence xmlns='jabber:client' type='subscribe'>\
            <nick xmlns='http://jabber.org/protocol/nick'/>\
            </presence>"
            .parse()
            .unwrap();
        assert_eq!(nick_of(&empty), None);
    }
}
