//! Message archive tags (legacy XEP-0313 profile)
//!
//! Archiving servers annotate messages with `<archived/>` children, one
//! per archive that stored the message, each naming the archiving entity
//! and the archive-local ID.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0313.html>

use minidom::Element;

use plover_core::{ArchivedRef, Jid};

use crate::stanza::{children_in, ns};

/// Legacy message archiving namespace.
pub const NS_ARCHIVE: &str = ns::ARCHIVE;

/// All archive references attached to a message, in document order.
///
/// Tags missing a parseable `by` JID or an `id` are skipped.
pub fn archived_refs(message: &Element) -> Vec<ArchivedRef> {
    children_in(message, "archived", NS_ARCHIVE)
        .filter_map(|archived| {
            let by: Jid = archived.attr("by")?.parse().ok()?;
            let id = archived.attr("id")?.to_string();
            Some(ArchivedRef { by, id })
        })
        .collect()
}
