//! # plover-xmpp
//!
//! Stanza dispatch and XMPP-extension handling for Plover.
//!
//! This crate sits between a session's XML stream and the socket event
//! protocol of `plover-core`: inbound stanzas arrive as pre-parsed
//! `minidom` element trees, are routed to the first handler that owns
//! them, and leave as plain-record events; client requests come back in
//! over the socket and are validated, built into stanzas, and handed to
//! the session's connection.
//!
//! ## Architecture
//!
//! - **Handlers**: one [`ChatHandler`] and one [`PresenceHandler`] per
//!   client session, sharing the [`handler::HandlerCore`] capability set
//!   (bound manager, set-once cache, correlation IDs, listener
//!   bookkeeping).
//! - **Routing**: a [`StanzaRouter`] holds the session's handlers in
//!   registration order; the first accepting handler wins.
//! - **Extensions**: each supported XEP is a small build/parse module
//!   under [`xep`].
//!
//! ## XEP Support
//!
//! - XEP-0004 (Data Forms)
//! - XEP-0071 (XHTML-IM)
//! - XEP-0085 (Chat State Notifications)
//! - XEP-0115 (Entity Capabilities)
//! - XEP-0172 (User Nickname)
//! - XEP-0184 (Message Delivery Receipts)
//! - XEP-0203 (Delayed Delivery)
//! - XEP-0308 (Last Message Correction)
//! - XEP-0313 (Message Archive Management, legacy tags)

pub mod chat;
pub mod handler;
pub mod id;
pub mod presence;
pub mod router;
pub mod stanza;
pub mod stanza_error;
pub mod tracker;
pub mod xep;

pub use chat::ChatHandler;
pub use handler::{HandlerCache, HandlerCore, Manager, StanzaHandler, StanzaSink};
pub use id::IdSequence;
pub use presence::PresenceHandler;
pub use router::StanzaRouter;
pub use stanza::ns;
pub use stanza_error::{parse_error, ApplicationError, StanzaError};
pub use tracker::IdTracker;

// the protocol types handlers emit, re-exported for downstream sessions
pub use plover_core::{Ack, Channel, ClientError, EventPayload, Jid, SocketEvent, SocketHub};
