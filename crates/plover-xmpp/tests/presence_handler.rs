//! Fixture-driven tests for the presence handler's inbound routing and
//! its socket-facing send operations.

mod common;

use std::sync::Arc;

use serde_json::json;

use plover_core::{channels, Ack, EventPayload, Jid, SocketHub};
use plover_xmpp::{PresenceHandler, StanzaHandler};

use common::{manager, stanza, RecordingSink};

fn setup() -> (Arc<PresenceHandler>, Arc<SocketHub>, Arc<RecordingSink>) {
    let hub = Arc::new(SocketHub::new());
    let sink = RecordingSink::new();
    let handler = Arc::new(PresenceHandler::new());
    Arc::clone(&handler).init(manager(&hub, &sink, "bottom@dreams.org"));
    (handler, hub, sink)
}

#[test]
fn error_presence_surfaces_the_condition_and_sender() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    assert!(handler.handle(&stanza("presence/error.xml")));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.channel.as_str(), channels::PRESENCE_ERROR);
    assert_eq!(
        serde_json::to_value(&event.payload).unwrap(),
        json!({
            "error": "gone",
            "from": {"user": "mercutio", "domain": "example.org"},
        })
    );
}

#[test]
fn error_presence_without_from_omits_the_key() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/error-no-from.xml"));

    assert_eq!(
        serde_json::to_value(&rx.try_recv().unwrap().payload).unwrap(),
        json!({"error": "gone"})
    );
}

#[test]
fn subscription_requests_surface_the_requester() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/subscribe.xml"));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.channel.as_str(), channels::PRESENCE_SUBSCRIBE);
    match event.payload {
        EventPayload::Subscribe(subscribe) => {
            assert_eq!(subscribe.from, Jid::bare("montague", "example.net"));
            assert!(subscribe.nick.is_none());
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn subscription_requests_carry_the_suggested_nickname() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/subscribe-nick.xml"));

    match rx.try_recv().unwrap().payload {
        EventPayload::Subscribe(subscribe) => {
            assert_eq!(subscribe.nick.as_deref(), Some("monty"));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn unavailable_presence_shows_offline() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/offline.xml"));

    match rx.try_recv().unwrap().payload {
        EventPayload::Presence(presence) => {
            assert_eq!(presence.show.as_deref(), Some("offline"));
            assert_eq!(
                presence.from,
                Some(Jid::full("juliet", "example.com", "balcony"))
            );
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn blank_presence_event_has_the_exact_shape() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/presence.xml"));

    assert_eq!(
        serde_json::to_value(&rx.try_recv().unwrap().payload).unwrap(),
        json!({
            "from": {"user": "juliet", "domain": "example.com", "resource": "balcony"},
        })
    );
}

#[test]
fn standard_presence_children_are_surfaced() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/presence-reply.xml"));

    match rx.try_recv().unwrap().payload {
        EventPayload::Presence(presence) => {
            assert_eq!(presence.show.as_deref(), Some("chat"));
            assert_eq!(presence.status.as_deref(), Some("say hello to me"));
            assert_eq!(presence.priority.as_deref(), Some("10"));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn entity_capabilities_are_attached_as_client_info() {
    let (handler, hub, _sink) = setup();
    let mut rx = hub.subscribe();

    handler.handle(&stanza("presence/xep-0115.xml"));

    match rx.try_recv().unwrap().payload {
        EventPayload::Presence(presence) => {
            let client = presence.client.expect("caps expected");
            assert_eq!(client.node, "node-value");
            assert_eq!(client.ver, "ver-value");
            assert_eq!(client.hash, "hash-value");
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn subscribe_channel_requires_a_recipient() {
    let (_handler, hub, sink) = setup();
    let mut rx = hub.subscribe();

    hub.send(channels::PRESENCE_SUBSCRIBE, json!({}), Ack::None);

    assert!(sink.sent().is_empty());
    let event = rx.try_recv().unwrap();
    assert_eq!(event.channel.as_str(), channels::ERROR_CLIENT);
    match event.payload {
        EventPayload::ClientError(error) => {
            assert_eq!(error.description, "Missing 'to' key");
            assert_eq!(error.request, json!({}));
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn subscription_family_sends_typed_directed_presence() {
    let (_handler, hub, sink) = setup();
    let to = "juliet@example.com/balcony";

    for (channel, presence_type) in [
        (channels::PRESENCE_SUBSCRIBE, "subscribe"),
        (channels::PRESENCE_SUBSCRIBED, "subscribed"),
        (channels::PRESENCE_UNSUBSCRIBE, "unsubscribe"),
        (channels::PRESENCE_UNSUBSCRIBED, "unsubscribed"),
    ] {
        hub.send(channel, json!({"to": to}), Ack::None);
        let stanza = sink.sent().pop().unwrap();
        assert_eq!(stanza.name(), "presence");
        assert_eq!(stanza.attr("to"), Some(to));
        assert_eq!(stanza.attr("type"), Some(presence_type));
        assert_eq!(stanza.attr("from"), Some("bottom@dreams.org"));
    }
}

#[test]
fn presence_probe_and_no_payload_requests_work_over_the_socket() {
    let (_handler, hub, sink) = setup();

    hub.send(channels::PRESENCE_GET, json!({"to": "juliet@example.com"}), Ack::None);
    hub.send(channels::PRESENCE, serde_json::Value::Null, Ack::None);

    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].attr("to"), Some("juliet@example.com"));
    assert!(sent[0].attr("type").is_none());
    assert!(sent[1].attr("to").is_none());
    assert!(sent[1].children().next().is_none());
}

#[test]
fn disconnect_goes_offline() {
    let (_handler, hub, sink) = setup();
    hub.send(channels::DISCONNECT, json!({}), Ack::None);
    assert_eq!(sink.sent()[0].attr("type"), Some("unavailable"));
}
