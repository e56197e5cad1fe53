//! Shared setup for handler integration tests.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use minidom::Element;

use plover_core::{Jid, SocketHub};
use plover_test_support::fixtures;
use plover_xmpp::{Manager, StanzaSink};

/// A stanza sink that records everything handed to it.
pub struct RecordingSink {
    sent: Mutex<Vec<Element>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<Element> {
        self.sent.lock().unwrap().clone()
    }
}

impl StanzaSink for RecordingSink {
    fn send_stanza(&self, stanza: Element) {
        self.sent.lock().unwrap().push(stanza);
    }
}

/// A manager wired to a fresh hub and recording sink.
pub fn manager(hub: &Arc<SocketHub>, sink: &Arc<RecordingSink>, jid: &str) -> Manager {
    Manager::new(
        Arc::clone(hub),
        Arc::clone(sink) as Arc<dyn StanzaSink>,
        Jid::from_str(jid).expect("test jid should parse"),
    )
}

/// Load a stanza fixture as a parsed element.
pub fn stanza(name: &str) -> Element {
    let raw = fixtures::stanza(name);
    Element::from_str(raw.trim())
        .unwrap_or_else(|error| panic!("fixture {name} should parse: {error}"))
}
