//! # plover-core
//!
//! The socket-facing half of Plover: the event protocol spoken between
//! the stanza-handling layer and a UI bridge (WebSocket, IPC, test
//! harness). Events are dot-namespaced channels carrying plain record
//! payloads; client requests arrive the same way, optionally with a
//! one-shot reply callback.
//!
//! The XMPP side lives in `plover-xmpp`; this crate deliberately knows
//! nothing about XML.

pub mod error;
pub mod event;
pub mod jid;
pub mod socket;

pub use error::SocketError;
pub use event::{
    channels, ArchivedRef, Channel, ChatMessage, ChatState, ClientError, ClientInfo, Connection,
    ConnectionStatus, Delay, ErrorType, EventPayload, Fault, MessageFormat, Presence,
    PresenceError, Receipt, SocketEvent, Subscribe,
};
pub use jid::{Jid, MalformedJidError};
pub use socket::{Ack, ListenerFn, ListenerId, Reply, ReplyFn, SocketHub};
