//! Presence updates, subscriptions, and presence errors.
//!
//! Unlike chat, presence is a catch-all: every `<presence/>` stanza is
//! owned regardless of type. Inbound stanzas fan out over three
//! channels (error, subscribe, generic); outbound requests cover the
//! whole subscription family plus probes, offline, and capability
//! advertisement.

use std::sync::Arc;

use minidom::Element;
use serde_json::{json, Value};
use tracing::debug;

use plover_core::{
    channels, Ack, ClientInfo, EventPayload, Jid, Presence, PresenceError, Subscribe,
};

use crate::handler::{string_key, HandlerCore, Manager, StanzaHandler};
use crate::stanza::{child, ns, text_content};
use crate::stanza_error::parse_error;
use crate::xep::{xep0115, xep0172};

/// Show value surfaced for unavailable presence.
const SHOW_OFFLINE: &str = "offline";

/// Handler for all `<presence/>` stanzas.
pub struct PresenceHandler {
    core: HandlerCore,
}

impl PresenceHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new("presence"),
        }
    }

    /// Send a generic presence update.
    ///
    /// An empty request produces a bare `<presence/>`. A caller-supplied
    /// `type` passes through only as `unavailable`; anything else is
    /// silently dropped because the specific channels own the other
    /// types. Capability data is validated client → node → ver → hash,
    /// stopping at the first failing key.
    pub fn send(&self, request: Value, ack: Ack) {
        let caps = match request.get("client") {
            None => None,
            Some(client) => {
                if !client.is_object() {
                    return self.core.client_error(
                        "'client' key must be an object",
                        &request,
                        ack,
                    );
                }
                let Some(node) = string_key(client, "node") else {
                    return self.core.client_error("Missing 'node' key", &request, ack);
                };
                let Some(ver) = string_key(client, "ver") else {
                    return self.core.client_error("Missing 'ver' key", &request, ack);
                };
                let Some(hash) = string_key(client, "hash") else {
                    return self.core.client_error("Missing 'hash' key", &request, ack);
                };
                Some(ClientInfo { node, ver, hash })
            }
        };

        let mut presence = Element::builder("presence", ns::JABBER_CLIENT).build();
        if let Some(to) = string_key(&request, "to") {
            presence.set_attr("to", to);
        }
        if string_key(&request, "type").as_deref() == Some("unavailable") {
            presence.set_attr("type", "unavailable");
        }
        for key in ["status", "priority", "show"] {
            if let Some(value) = string_key(&request, key) {
                let mut element = Element::builder(key, ns::JABBER_CLIENT).build();
                element.append_text_node(&value);
                presence.append_child(element);
            }
        }
        if let Some(caps) = caps {
            presence.append_child(xep0115::element(&caps));
        }

        self.core.send_stanza(presence);
        ack.reply(Ok(json!({})));
    }

    /// Send one of the subscription-family stanzas, which all require a
    /// recipient and carry this session's own address.
    pub fn send_directed(&self, presence_type: &str, request: Value, ack: Ack) {
        let Some(to) = string_key(&request, "to") else {
            return self.core.client_error("Missing 'to' key", &request, ack);
        };
        let Some(own_jid) = self.core.own_jid().map(Jid::to_string) else {
            return;
        };
        let presence = Element::builder("presence", ns::JABBER_CLIENT)
            .attr("from", own_jid.as_str())
            .attr("to", to.as_str())
            .attr("type", presence_type)
            .build();
        debug!(to = %to, presence_type, "sending directed presence");
        self.core.send_stanza(presence);
        ack.reply(Ok(json!({})));
    }

    /// Request another entity's current presence.
    pub fn send_probe(&self, request: Value, ack: Ack) {
        let Some(to) = string_key(&request, "to") else {
            return self.core.client_error("Missing 'to' key", &request, ack);
        };
        let Some(own_jid) = self.core.own_jid().map(Jid::to_string) else {
            return;
        };
        let presence = Element::builder("presence", ns::JABBER_CLIENT)
            .attr("from", own_jid.as_str())
            .attr("to", to.as_str())
            .build();
        self.core.send_stanza(presence);
        ack.reply(Ok(json!({})));
    }

    /// Announce this session as unavailable.
    pub fn send_offline(&self, _request: Value, ack: Ack) {
        let presence = Element::builder("presence", ns::JABBER_CLIENT)
            .attr("type", "unavailable")
            .build();
        self.core.send_stanza(presence);
        ack.reply(Ok(json!({})));
    }

    fn handle_error(&self, stanza: &Element, from: Option<Jid>) {
        let condition = match child(stanza, "error") {
            Some(error) => parse_error(error).condition,
            None => crate::stanza_error::UNDEFINED_CONDITION.to_string(),
        };
        debug!(condition = %condition, "presence error received");
        self.core.emit(
            channels::PRESENCE_ERROR,
            EventPayload::PresenceError(PresenceError {
                error: condition,
                from,
            }),
        );
    }

    fn handle_subscribe(&self, stanza: &Element, from: Option<Jid>) {
        let Some(from) = from else {
            debug!("subscription request without sender dropped");
            return;
        };
        debug!(from = %from, "subscription request received");
        self.core.emit(
            channels::PRESENCE_SUBSCRIBE,
            EventPayload::Subscribe(Subscribe {
                from,
                nick: xep0172::nick_of(stanza),
            }),
        );
    }

    fn handle_update(&self, stanza: &Element, from: Option<Jid>) {
        let show = if stanza.attr("type") == Some("unavailable") {
            Some(SHOW_OFFLINE.to_string())
        } else {
            child(stanza, "show").and_then(text_content)
        };
        let event = Presence {
            from,
            show,
            status: child(stanza, "status").and_then(text_content),
            priority: child(stanza, "priority").and_then(text_content),
            client: xep0115::caps_of(stanza),
        };
        self.core.emit(channels::PRESENCE, EventPayload::Presence(event));
    }
}

impl Default for PresenceHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StanzaHandler for PresenceHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn init(self: Arc<Self>, manager: Manager) {
        self.core.bind(manager.clone());

        let handler = Arc::clone(&self);
        let id = manager.socket.on(
            channels::PRESENCE,
            Arc::new(move |request, ack| handler.send(request, ack)),
        );
        self.core.track_listener(id);

        for (channel, presence_type) in [
            (channels::PRESENCE_SUBSCRIBE, "subscribe"),
            (channels::PRESENCE_SUBSCRIBED, "subscribed"),
            (channels::PRESENCE_UNSUBSCRIBE, "unsubscribe"),
            (channels::PRESENCE_UNSUBSCRIBED, "unsubscribed"),
        ] {
            let handler = Arc::clone(&self);
            let id = manager.socket.on(
                channel,
                Arc::new(move |request, ack| {
                    handler.send_directed(presence_type, request, ack)
                }),
            );
            self.core.track_listener(id);
        }

        let handler = Arc::clone(&self);
        let id = manager.socket.on(
            channels::PRESENCE_GET,
            Arc::new(move |request, ack| handler.send_probe(request, ack)),
        );
        self.core.track_listener(id);

        let handler = Arc::clone(&self);
        let id = manager.socket.on(
            channels::PRESENCE_OFFLINE,
            Arc::new(move |request, ack| handler.send_offline(request, ack)),
        );
        self.core.track_listener(id);

        // going offline on socket disconnect mirrors the offline channel
        let handler = Arc::clone(&self);
        let id = manager.socket.on(
            channels::DISCONNECT,
            Arc::new(move |request, ack| handler.send_offline(request, ack)),
        );
        self.core.track_listener(id);
    }

    fn handles(&self, stanza: &Element) -> bool {
        stanza.name() == "presence"
    }

    fn handle(&self, stanza: &Element) -> bool {
        if !self.handles(stanza) {
            return false;
        }
        let from = stanza.attr("from").and_then(|from| from.parse().ok());
        match stanza.attr("type") {
            Some("error") => self.handle_error(stanza, from),
            Some("subscribe") => self.handle_subscribe(stanza, from),
            _ => self.handle_update(stanza, from),
        }
        true
    }
}
