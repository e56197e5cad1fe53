//! First-match stanza dispatch.
//!
//! The session registers its handlers once, in order; every inbound
//! stanza goes to the first handler whose `handles` predicate accepts
//! it. Registration order is the routing priority and is never
//! reordered.

use std::sync::Arc;

use minidom::Element;
use tracing::debug;

use plover_core::{channels, Channel, EventPayload, Fault, SocketEvent, SocketHub};

use crate::handler::StanzaHandler;
use crate::stanza::to_xml_string;

/// Ordered set of stanza handlers for one session.
pub struct StanzaRouter {
    handlers: Vec<Arc<dyn StanzaHandler>>,
}

impl StanzaRouter {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler; earlier registrations win ties.
    pub fn register(&mut self, handler: Arc<dyn StanzaHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route a stanza to the first accepting handler.
    ///
    /// Returns whether any handler took it.
    pub fn route(&self, stanza: &Element) -> bool {
        for handler in &self.handlers {
            if handler.handles(stanza) {
                return handler.handle(stanza);
            }
        }
        debug!(stanza = stanza.name(), "no handler for stanza");
        false
    }

    /// Route a stanza, reporting unroutable ones on the error channel.
    pub fn route_or_report(&self, hub: &SocketHub, stanza: &Element) -> bool {
        if self.route(stanza) {
            return true;
        }
        hub.emit(SocketEvent::new(
            Channel::new(channels::ERROR).unwrap(),
            EventPayload::Fault(Fault {
                description: format!("no handler for <{}/> stanza", stanza.name()),
                stanza: Some(to_xml_string(stanza)),
            }),
        ));
        false
    }
}

impl Default for StanzaRouter {
    fn default() -> Self {
        Self::new()
    }
}
