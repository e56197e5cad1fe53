//! XEP-0115: Entity Capabilities
//!
//! The `<c/>` child of a presence stanza advertises a client's
//! capabilities as a node/verification/hash triple. This layer passes
//! the triple through between presence stanzas and socket payloads; it
//! neither computes nor verifies hashes.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0115.html>

use minidom::Element;

use plover_core::ClientInfo;

use crate::stanza::ns;

/// XEP-0115 entity capabilities namespace.
pub const NS_CAPS: &str = ns::CAPS;

/// Build the `<c/>` element for a capabilities triple.
pub fn element(client: &ClientInfo) -> Element {
    Element::builder("c", NS_CAPS)
        .attr("hash", client.hash.as_str())
        .attr("node", client.node.as_str())
        .attr("ver", client.ver.as_str())
        .build()
}

/// The capabilities advertised in a presence stanza, if complete.
pub fn caps_of(presence: &Element) -> Option<ClientInfo> {
    let c = presence
        .children()
        .find(|child| child.name() == "c" && child.ns() == NS_CAPS)?;
    Some(ClientInfo {
        node: c.attr("node")?.to_string(),
        ver: c.attr("ver")?.to_string(),
        hash: c.attr("hash")?.to_string(),
    })
}
