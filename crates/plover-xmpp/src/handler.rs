//! The capability contract every stanza handler shares.
//!
//! A handler is created once per client session, bound to its session's
//! [`Manager`] exactly once via `init`, and then asked two questions per
//! inbound stanza: `handles` (pure) and `handle` (side-effecting, emits
//! socket events). Client-originated requests arrive through socket
//! listeners the handler registered during `init`; `unregister_events`
//! detaches them and is the only cancellation primitive.

use std::sync::{Arc, Mutex, OnceLock};

use dashmap::DashMap;
use minidom::Element;
use serde_json::Value;
use tracing::debug;

use plover_core::{
    channels, Ack, Channel, ClientError, EventPayload, Jid, ListenerId, SocketEvent, SocketHub,
};

use crate::id::IdSequence;
use crate::tracker::IdTracker;

/// The handler-scoped key-value cache, injected by the session.
pub type HandlerCache = Arc<DashMap<String, Value>>;

/// Send-stanza capability supplied by the session's XMPP connection.
pub trait StanzaSink: Send + Sync {
    fn send_stanza(&self, stanza: Element);
}

/// The external session collaborator handed to every handler at `init`.
#[derive(Clone)]
pub struct Manager {
    /// Socket hub bridging to the UI layer
    pub socket: Arc<SocketHub>,

    /// Outgoing stanza sink (the XMPP connection)
    pub client: Arc<dyn StanzaSink>,

    /// This session's own address
    pub jid: Jid,

    /// Pending-reply correlation map shared across the session
    pub tracker: Arc<IdTracker>,
}

impl Manager {
    pub fn new(socket: Arc<SocketHub>, client: Arc<dyn StanzaSink>, jid: Jid) -> Self {
        Self {
            socket,
            client,
            jid,
            tracker: Arc::new(IdTracker::new()),
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<IdTracker>) -> Self {
        self.tracker = tracker;
        self
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager").field("jid", &self.jid).finish()
    }
}

/// State and helpers every handler embeds.
pub struct HandlerCore {
    kind: &'static str,
    manager: OnceLock<Manager>,
    cache: OnceLock<HandlerCache>,
    listeners: Mutex<Vec<ListenerId>>,
    ids: IdSequence,
}

impl HandlerCore {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            manager: OnceLock::new(),
            cache: OnceLock::new(),
            listeners: Mutex::new(Vec::new()),
            ids: IdSequence::for_kind(kind),
        }
    }

    /// The handler kind this core was created for.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Bind the session manager; effective once per instance.
    pub fn bind(&self, manager: Manager) {
        if self.manager.set(manager).is_err() {
            debug!(kind = self.kind, "handler already initialised");
        }
    }

    /// The bound manager, `None` before `init`.
    pub fn manager(&self) -> Option<&Manager> {
        self.manager.get()
    }

    /// Set the session cache; effective once, returns `self` for chaining.
    pub fn set_cache(&self, cache: HandlerCache) -> &Self {
        if self.cache.set(cache).is_err() {
            debug!(kind = self.kind, "handler cache already set");
        }
        self
    }

    /// The injected cache, `None` until the session sets one.
    pub fn cache(&self) -> Option<HandlerCache> {
        self.cache.get().cloned()
    }

    /// A fresh correlation ID.
    pub fn fresh_id(&self) -> String {
        self.ids.fresh()
    }

    /// The shared ID sequence for this handler kind.
    pub fn ids(&self) -> &IdSequence {
        &self.ids
    }

    /// Remember a socket listener for later removal.
    pub fn track_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(id);
    }

    /// Detach every socket listener registered by this handler.
    ///
    /// Safe to call repeatedly and before any registration happened.
    pub fn unregister_events(&self) {
        let ids: Vec<ListenerId> = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect();
        let Some(manager) = self.manager() else {
            return;
        };
        for id in ids {
            manager.socket.off(id);
        }
    }

    /// Emit an event on a protocol channel.
    pub fn emit(&self, channel: &'static str, payload: EventPayload) {
        let Some(manager) = self.manager() else {
            debug!(kind = self.kind, channel, "emit before init dropped");
            return;
        };
        manager
            .socket
            .emit(SocketEvent::new(Channel::new(channel).unwrap(), payload));
    }

    /// Report a malformed client request.
    ///
    /// The record goes to the request's reply callback when one is
    /// callable, otherwise onto the dedicated client-error channel. The
    /// original request is echoed verbatim either way.
    pub fn client_error(&self, description: &str, request: &Value, ack: Ack) {
        debug!(kind = self.kind, description, "client error");
        let error = ClientError::new(description, request.clone());
        match ack {
            Ack::Reply(reply) => reply(Err(error)),
            _ => self.emit(channels::ERROR_CLIENT, EventPayload::ClientError(error)),
        }
    }

    /// Hand a stanza to the session's connection.
    pub fn send_stanza(&self, stanza: Element) {
        let Some(manager) = self.manager() else {
            debug!(kind = self.kind, "send before init dropped");
            return;
        };
        manager.client.send_stanza(stanza);
    }

    /// This session's own JID, once bound.
    pub fn own_jid(&self) -> Option<&Jid> {
        self.manager().map(|manager| &manager.jid)
    }
}

/// A stanza-category handler.
///
/// The defaults own nothing: an unspecialized handler answers `false` to
/// both questions, mirroring `handles`.
pub trait StanzaHandler: Send + Sync {
    /// The shared capability core.
    fn core(&self) -> &HandlerCore;

    /// Bind the session and register client-request listeners.
    fn init(self: Arc<Self>, manager: Manager);

    /// Pure ownership predicate over root name + `type` attribute.
    fn handles(&self, _stanza: &Element) -> bool {
        false
    }

    /// Transform an owned stanza into socket events.
    ///
    /// Returns `false` when the stanza is not owned (mirrors `handles`);
    /// `true` means it was handled, including the case where the payload
    /// was a protocol error surfaced as data.
    fn handle(&self, _stanza: &Element) -> bool {
        false
    }

    /// Detach all socket listeners registered during `init`.
    fn unregister_events(&self) {
        self.core().unregister_events();
    }
}

/// A non-empty string value of a request key.
pub(crate) fn string_key(request: &Value, key: &str) -> Option<String> {
    request
        .get(key)?
        .as_str()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// JSON truthiness of a request key, the way socket clients mean it.
pub(crate) fn truthy_key(request: &Value, key: &str) -> bool {
    match request.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Number(number)) => number.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullSink;
    impl StanzaSink for NullSink {
        fn send_stanza(&self, _stanza: Element) {}
    }

    struct BareHandler {
        core: HandlerCore,
    }

    impl StanzaHandler for BareHandler {
        fn core(&self) -> &HandlerCore {
            &self.core
        }

        fn init(self: Arc<Self>, manager: Manager) {
            self.core.bind(manager);
        }
    }

    fn manager(hub: &Arc<SocketHub>) -> Manager {
        Manager::new(
            Arc::clone(hub),
            Arc::new(NullSink),
            Jid::bare("test", "example.com"),
        )
    }

    #[test]
    fn default_handler_owns_nothing() {
        let handler = BareHandler {
            core: HandlerCore::new("bare"),
        };
        let stanza: Element = "<iq xmlns='jabber:client'/>".parse().unwrap();
        assert!(!handler.handles(&stanza));
        assert!(!handler.handle(&stanza));
    }

    #[test]
    fn cache_is_set_once_and_chains() {
        let core = HandlerCore::new("cache-test");
        assert!(core.cache().is_none());

        let cache: HandlerCache = Arc::new(DashMap::new());
        cache.insert("caching".to_string(), json!({"is": "fun"}));

        let chained = core.set_cache(Arc::clone(&cache));
        assert!(std::ptr::eq(chained, &core));
        assert!(Arc::ptr_eq(&core.cache().unwrap(), &cache));

        // a second set does not replace the first
        core.set_cache(Arc::new(DashMap::new()));
        assert!(Arc::ptr_eq(&core.cache().unwrap(), &cache));
    }

    #[test]
    fn unregister_events_is_idempotent_without_registrations() {
        let handler = Arc::new(BareHandler {
            core: HandlerCore::new("quiet"),
        });
        // no manager bound yet, nothing registered
        handler.unregister_events();
        handler.unregister_events();

        let hub = Arc::new(SocketHub::new());
        Arc::clone(&handler).init(manager(&hub));
        handler.unregister_events();
        handler.unregister_events();
    }

    #[test]
    fn init_binds_the_manager_once() {
        let handler = Arc::new(BareHandler {
            core: HandlerCore::new("bind-test"),
        });
        let hub = Arc::new(SocketHub::new());
        Arc::clone(&handler).init(manager(&hub));

        let first = handler.core().own_jid().cloned();
        assert_eq!(first, Some(Jid::bare("test", "example.com")));

        let other_hub = Arc::new(SocketHub::new());
        let second = Manager::new(
            other_hub,
            Arc::new(NullSink),
            Jid::bare("other", "example.net"),
        );
        Arc::clone(&handler).init(second);
        assert_eq!(
            handler.core().own_jid().cloned(),
            Some(Jid::bare("test", "example.com"))
        );
    }

    #[test]
    fn client_error_goes_to_the_callback_when_callable() {
        let hub = Arc::new(SocketHub::new());
        let core = HandlerCore::new("error-test");
        core.bind(manager(&hub));

        let mut rx = hub.subscribe();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let request = json!({"bad": true});
        core.client_error(
            "Missing 'to' key",
            &request,
            Ack::callback(move |outcome| {
                *sink.lock().unwrap() = Some(outcome);
            }),
        );

        let outcome = seen.lock().unwrap().take();
        match outcome {
            Some(Err(error)) => {
                assert_eq!(error.description, "Missing 'to' key");
                assert_eq!(error.request, request);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        // nothing on the error channel when the callback took it
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn client_error_is_emitted_without_a_callback() {
        let hub = Arc::new(SocketHub::new());
        let core = HandlerCore::new("error-emit-test");
        core.bind(manager(&hub));

        let mut rx = hub.subscribe();
        core.client_error("Missing 'to' key", &json!({}), Ack::None);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.channel.as_str(), channels::ERROR_CLIENT);
        match event.payload {
            EventPayload::ClientError(error) => {
                assert_eq!(error.description, "Missing 'to' key");
                assert_eq!(error.condition, "client-error");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
