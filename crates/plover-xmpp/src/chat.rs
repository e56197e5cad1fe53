//! One-to-one chat messages.
//!
//! Owns `<message/>` stanzas without a type or typed `chat`, plus
//! `headline` carriers of delivery receipts. Inbound stanzas become
//! events on the chat channels; outbound requests from the socket are
//! validated in a fixed order. Only the first failing check is
//! reported, and nothing is sent after a failure.

use std::sync::Arc;

use minidom::Element;
use serde_json::{json, Value};
use tracing::debug;

use plover_core::{
    channels, Ack, ChatMessage, ChatState, EventPayload, Jid, MessageFormat, Receipt,
};

use crate::handler::{string_key, truthy_key, HandlerCore, Manager, StanzaHandler};
use crate::stanza::{attr_string, child, flatten_text, inner_xml, ns};
use crate::xep::{xep0071, xep0085, xep0184, xep0203, xep0308, xep0313};

/// Handler for one-to-one chat messages and delivery receipts.
pub struct ChatHandler {
    core: HandlerCore,
}

impl ChatHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new("chat"),
        }
    }

    /// Send a chat message built from a client request.
    ///
    /// Validation order is significant: `to`, correction content,
    /// content-or-state, receipt callback, XHTML well-formedness. Each
    /// failure produces its own distinct client error and aborts before
    /// anything reaches the wire.
    pub fn send_message(&self, request: Value, ack: Ack) {
        let Some(to) = string_key(&request, "to") else {
            return self.core.client_error("Missing 'to' key", &request, ack);
        };
        let content = string_key(&request, "content");
        let state = string_key(&request, "state");
        let replace = string_key(&request, "replace");

        if replace.is_some() && content.is_none() {
            return self
                .core
                .client_error("Missing 'content' key", &request, ack);
        }
        if content.is_none() && state.is_none() {
            return self.core.client_error(
                "Message content or chat state not provided",
                &request,
                ack,
            );
        }

        let receipt = truthy_key(&request, "receipt");
        if receipt && !ack.is_callable() {
            let description = if matches!(ack, Ack::None) {
                "Callback required"
            } else {
                "Missing callback"
            };
            return self.core.client_error(description, &request, ack);
        }

        let id = self.core.fresh_id();
        let mut message = Element::builder("message", ns::JABBER_CLIENT)
            .attr("to", to.as_str())
            .attr("type", "chat")
            .attr("id", id.as_str())
            .build();

        if let Some(content) = content {
            if string_key(&request, "format").as_deref() == Some(MessageFormat::Xhtml.as_str()) {
                let body = match xep0071::parse_content(&content) {
                    Ok(body) => body,
                    Err(_) => {
                        return self.core.client_error(
                            "Can not parse XHTML message",
                            &request,
                            ack,
                        )
                    }
                };
                message.append_child(body_element(&flatten_text(&body)));
                message.append_child(xep0071::wrap_body(body));
            } else {
                message.append_child(body_element(&content));
            }
        }

        if let Some(state) = state.as_deref().and_then(ChatState::parse) {
            message.append_child(xep0085::element(state));
        }
        if receipt {
            message.append_child(xep0184::request());
        }
        if let Some(replace) = replace {
            message.append_child(xep0308::replace(&replace));
        }

        debug!(to = %to, id = %id, "sending chat message");
        self.core.send_stanza(message);
        ack.reply(Ok(json!({ "id": id })));
    }

    /// Acknowledge a received message with a delivery receipt.
    pub fn send_receipt(&self, request: Value, ack: Ack) {
        let Some(to) = string_key(&request, "to") else {
            return self.core.client_error("Missing 'to' key", &request, ack);
        };
        let Some(acked_id) = string_key(&request, "id") else {
            return self.core.client_error("Missing 'id' key", &request, ack);
        };

        let id = self.core.fresh_id();
        let mut message = Element::builder("message", ns::JABBER_CLIENT)
            .attr("to", to.as_str())
            .attr("id", id.as_str())
            .build();
        message.append_child(xep0184::received(&acked_id));

        debug!(to = %to, acked = %acked_id, "sending delivery receipt");
        self.core.send_stanza(message);
        ack.reply(Ok(json!({ "id": id })));
    }

    fn handle_received_receipt(&self, stanza: &Element, acked_id: String) {
        let from = sender_of(stanza);
        debug!(id = %acked_id, "delivery receipt received");
        if let Some(manager) = self.core.manager() {
            manager
                .tracker
                .resolve(&acked_id, Ok(json!({ "id": acked_id.clone() })));
        }
        self.core.emit(
            channels::CHAT_RECEIPT,
            EventPayload::Receipt(Receipt {
                from,
                id: acked_id,
            }),
        );
    }
}

impl Default for ChatHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StanzaHandler for ChatHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn init(self: Arc<Self>, manager: Manager) {
        self.core.bind(manager.clone());

        let handler = Arc::clone(&self);
        let id = manager.socket.on(
            channels::CHAT_MESSAGE,
            Arc::new(move |request, ack| handler.send_message(request, ack)),
        );
        self.core.track_listener(id);

        let handler = Arc::clone(&self);
        let id = manager.socket.on(
            channels::CHAT_RECEIPT,
            Arc::new(move |request, ack| handler.send_receipt(request, ack)),
        );
        self.core.track_listener(id);
    }

    fn handles(&self, stanza: &Element) -> bool {
        if stanza.name() != "message" {
            return false;
        }
        match stanza.attr("type") {
            None | Some("chat") => true,
            Some("headline") => xep0184::has_receipt_child(stanza),
            _ => false,
        }
    }

    fn handle(&self, stanza: &Element) -> bool {
        if !self.handles(stanza) {
            return false;
        }

        if let Some(acked_id) = xep0184::received_id(stanza) {
            self.handle_received_receipt(stanza, acked_id);
            return true;
        }

        let mut event = ChatMessage {
            from: sender_of(stanza),
            id: attr_string(stanza, "id"),
            ..ChatMessage::default()
        };

        if let Some(body) = xep0071::xhtml_body(stanza) {
            event.content = Some(inner_xml(body));
            event.format = Some(MessageFormat::Xhtml);
        } else if let Some(body) = child(stanza, "body") {
            event.content = Some(body.text());
            event.format = Some(MessageFormat::Plain);
        }

        event.state = xep0085::state_of(stanza);
        event.delay = xep0203::delay_of(stanza);
        if xep0184::requests_receipt(stanza) {
            event.receipt = Some(true);
        }
        event.replace = xep0308::replace_id(stanza);
        let archived = xep0313::archived_refs(stanza);
        if !archived.is_empty() {
            event.archived = Some(archived);
        }

        debug!(id = ?event.id, "chat message received");
        self.core
            .emit(channels::CHAT_MESSAGE, EventPayload::ChatMessage(event));
        true
    }
}

fn sender_of(stanza: &Element) -> Option<Jid> {
    stanza.attr("from").and_then(|from| from.parse().ok())
}

fn body_element(text: &str) -> Element {
    let mut body = Element::builder("body", ns::JABBER_CLIENT).build();
    body.append_text_node(text);
    body
}
