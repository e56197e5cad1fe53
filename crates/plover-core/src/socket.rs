//! The socket hub: the seam between the UI transport and the stanza layer.
//!
//! Client-originated requests come in through [`SocketHub::send`] and are
//! dispatched to listeners registered per channel; stanza-layer events go
//! out through [`SocketHub::emit`] and fan out to every subscriber over a
//! broadcast channel. The hub itself never inspects payloads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::event::{ClientError, SocketEvent};

/// Outcome delivered to a client reply callback.
pub type Reply = Result<Value, ClientError>;

/// A one-shot client reply continuation.
pub type ReplyFn = Box<dyn FnOnce(Reply) + Send + Sync>;

/// The callback slot of a client request.
///
/// A socket client may pass nothing, a callable, or (being untyped on its
/// side of the wire) something that is not callable at all. Operations
/// that require a callback distinguish all three.
pub enum Ack {
    /// No callback argument was supplied
    None,
    /// A callback argument was supplied but is not callable
    Invalid,
    /// A live reply continuation; fires at most once
    Reply(ReplyFn),
}

impl Ack {
    /// Wrap a closure as a live reply continuation.
    pub fn callback(f: impl FnOnce(Reply) + Send + Sync + 'static) -> Self {
        Self::Reply(Box::new(f))
    }

    /// Whether this slot can actually be invoked.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Reply(_))
    }

    /// Invoke the continuation with an outcome, consuming the slot.
    ///
    /// Non-callable slots swallow the outcome.
    pub fn reply(self, outcome: Reply) {
        if let Self::Reply(f) = self {
            f(outcome);
        }
    }
}

impl std::fmt::Debug for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "Ack::None"),
            Self::Invalid => write!(f, "Ack::Invalid"),
            Self::Reply(_) => write!(f, "Ack::Reply(..)"),
        }
    }
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A client-request listener.
pub type ListenerFn = Arc<dyn Fn(Value, Ack) + Send + Sync>;

struct Registration {
    id: ListenerId,
    channel: String,
    listener: ListenerFn,
}

/// Listener registry plus broadcast fan-out for one client session.
pub struct SocketHub {
    next_id: AtomicU64,
    registrations: RwLock<Vec<Registration>>,
    events: broadcast::Sender<SocketEvent>,
}

impl SocketHub {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            next_id: AtomicU64::new(1),
            registrations: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Register a listener for client requests on a channel.
    pub fn on(&self, channel: impl Into<String>, listener: ListenerFn) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registrations.push(Registration {
            id,
            channel: channel.into(),
            listener,
        });
        id
    }

    /// Remove a previously registered listener; unknown IDs are a no-op.
    pub fn off(&self, id: ListenerId) {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        registrations.retain(|registration| registration.id != id);
    }

    /// Dispatch a client request to the listeners on a channel.
    ///
    /// Listeners run in registration order. Only the first receives the
    /// live [`Ack`] so a reply fires at most once; the rest see
    /// [`Ack::None`]. A `null` request is treated as an empty object.
    pub fn send(&self, channel: &str, request: Value, ack: Ack) {
        let request = if request.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            request
        };

        let listeners: Vec<ListenerFn> = {
            let registrations = self
                .registrations
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            registrations
                .iter()
                .filter(|registration| registration.channel == channel)
                .map(|registration| Arc::clone(&registration.listener))
                .collect()
        };

        if listeners.is_empty() {
            debug!(channel, "client request with no listener");
            return;
        }

        let mut ack = Some(ack);
        for listener in listeners {
            listener(request.clone(), ack.take().unwrap_or(Ack::None));
        }
    }

    /// Emit an event to every subscriber.
    ///
    /// Having no subscribers is not an error.
    pub fn emit(&self, event: SocketEvent) {
        let _ = self.events.send(event);
    }

    /// Subscribe to all emitted events.
    pub fn subscribe(&self) -> broadcast::Receiver<SocketEvent> {
        self.events.subscribe()
    }
}

impl Default for SocketHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{channels, Channel, EventPayload, Fault};
    use serde_json::json;
    use std::sync::Mutex;

    fn fault_event(description: &str) -> SocketEvent {
        SocketEvent::new(
            Channel::new(channels::ERROR).unwrap(),
            EventPayload::Fault(Fault {
                description: description.into(),
                stanza: None,
            }),
        )
    }

    #[test]
    fn dispatches_to_registered_listener() {
        let hub = SocketHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        hub.on(
            channels::CHAT_MESSAGE,
            Arc::new(move |request, _ack| sink.lock().unwrap().push(request)),
        );

        hub.send(channels::CHAT_MESSAGE, json!({"to": "a@b"}), Ack::None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[json!({"to": "a@b"})]);
    }

    #[test]
    fn null_request_becomes_empty_object() {
        let hub = SocketHub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        hub.on(
            channels::PRESENCE,
            Arc::new(move |request, _ack| sink.lock().unwrap().push(request)),
        );

        hub.send(channels::PRESENCE, Value::Null, Ack::None);

        assert_eq!(seen.lock().unwrap().as_slice(), &[json!({})]);
    }

    #[test]
    fn only_first_listener_gets_live_ack() {
        let hub = SocketHub::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let calls = Arc::clone(&calls);
            hub.on(
                channels::CHAT_MESSAGE,
                Arc::new(move |_request, ack| {
                    calls.lock().unwrap().push((name, ack.is_callable()));
                }),
            );
        }

        hub.send(
            channels::CHAT_MESSAGE,
            json!({}),
            Ack::callback(|_outcome| {}),
        );

        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[("first", true), ("second", false)]
        );
    }

    #[test]
    fn removed_listener_is_not_called() {
        let hub = SocketHub::new();
        let count = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&count);
        let id = hub.on(
            channels::CHAT_MESSAGE,
            Arc::new(move |_request, _ack| *counter.lock().unwrap() += 1),
        );

        hub.off(id);
        hub.send(channels::CHAT_MESSAGE, json!({}), Ack::None);

        assert_eq!(*count.lock().unwrap(), 0);
        // removing twice is harmless
        hub.off(id);
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let hub = SocketHub::new();
        hub.emit(fault_event("nobody listening"));
    }

    #[test]
    fn subscriber_receives_emitted_events_in_order() {
        let hub = SocketHub::new();
        let mut rx = hub.subscribe();

        hub.emit(fault_event("one"));
        hub.emit(fault_event("two"));

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.channel.as_str(), channels::ERROR);
        match (first.payload, second.payload) {
            (EventPayload::Fault(a), EventPayload::Fault(b)) => {
                assert_eq!(a.description, "one");
                assert_eq!(b.description, "two");
            }
            other => panic!("unexpected payloads: {other:?}"),
        }
    }

    #[test]
    fn ack_reply_fires_once_with_outcome() {
        let got = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&got);
        let ack = Ack::callback(move |outcome| {
            *sink.lock().unwrap() = Some(outcome);
        });
        assert!(ack.is_callable());
        ack.reply(Ok(json!({"id": "abc"})));

        let outcome = got.lock().unwrap().take();
        match outcome {
            Some(Ok(value)) => assert_eq!(value, json!({"id": "abc"})),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn non_callable_acks_swallow_replies() {
        Ack::None.reply(Ok(json!({})));
        Ack::Invalid.reply(Err(ClientError::new("nope", json!({}))));
        assert!(!Ack::None.is_callable());
        assert!(!Ack::Invalid.is_callable());
    }
}
