//! The socket-facing event protocol.
//!
//! Everything the stanza layer tells the UI travels as a [`SocketEvent`]:
//! a validated dot-namespaced channel name plus a plain record payload.
//! Payload records omit absent optional keys when serialized; "absent" and
//! "empty" are distinct states on this wire and must stay that way.

use serde::Serialize;
use serde_json::Value;

use crate::error::SocketError;
use crate::jid::Jid;

/// Channel name constants for the full protocol surface.
pub mod channels {
    /// One-to-one chat messages (both directions)
    pub const CHAT_MESSAGE: &str = "xmpp.chat.message";
    /// Delivery receipts (XEP-0184), both directions
    pub const CHAT_RECEIPT: &str = "xmpp.chat.receipt";
    /// Generic presence updates (both directions)
    pub const PRESENCE: &str = "xmpp.presence";
    /// Inbound subscription requests / outbound subscribe
    pub const PRESENCE_SUBSCRIBE: &str = "xmpp.presence.subscribe";
    /// Outbound subscription approval
    pub const PRESENCE_SUBSCRIBED: &str = "xmpp.presence.subscribed";
    /// Outbound unsubscribe
    pub const PRESENCE_UNSUBSCRIBE: &str = "xmpp.presence.unsubscribe";
    /// Outbound subscription revocation
    pub const PRESENCE_UNSUBSCRIBED: &str = "xmpp.presence.unsubscribed";
    /// Outbound presence probe
    pub const PRESENCE_GET: &str = "xmpp.presence.get";
    /// Outbound unavailable presence
    pub const PRESENCE_OFFLINE: &str = "xmpp.presence.offline";
    /// Inbound presence error stanzas
    pub const PRESENCE_ERROR: &str = "xmpp.presence.error";
    /// Client-request validation failures
    pub const ERROR_CLIENT: &str = "xmpp.error.client";
    /// Connection status changes from the session layer
    pub const CONNECTION: &str = "xmpp.connection";
    /// Faults that belong to no handler
    pub const ERROR: &str = "xmpp.error";
    /// Client socket disconnect
    pub const DISCONNECT: &str = "disconnect";
}

/// Hierarchical channel name validation and parsing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Channel(String);

impl Channel {
    /// Create a new channel, validating its format.
    pub fn new(name: impl Into<String>) -> Result<Self, SocketError> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(SocketError::InvalidChannel(name))
        }
    }

    /// Check if a channel name is valid.
    pub fn is_valid(name: &str) -> bool {
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return false;
        }

        // Must be lowercase and only contain a-z, 0-9, and dots
        if name
            .chars()
            .any(|c| !matches!(c, 'a'..='z' | '0'..='9' | '.'))
        {
            return false;
        }

        let domain = name.split('.').next().unwrap_or("");
        matches!(domain, "xmpp" | "disconnect")
    }

    /// Get the domain (first segment) of the channel.
    pub fn domain(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// Get the full channel name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

/// One event on the socket: channel plus plain-record payload.
#[derive(Debug, Clone, Serialize)]
pub struct SocketEvent {
    /// Dot-namespaced channel name (e.g. "xmpp.chat.message")
    pub channel: Channel,

    /// The typed event payload
    pub payload: EventPayload,
}

impl SocketEvent {
    /// Create a new event for a channel.
    pub fn new(channel: Channel, payload: EventPayload) -> Self {
        Self { channel, payload }
    }
}

/// All payload shapes the stanza layer emits.
///
/// Serialized untagged: the wire carries the record alone, the channel
/// name is the discriminator.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    ChatMessage(ChatMessage),
    Receipt(Receipt),
    Presence(Presence),
    Subscribe(Subscribe),
    PresenceError(PresenceError),
    ClientError(ClientError),
    Connection(Connection),
    Fault(Fault),
}

/// Stanza error types (RFC 6120 Section 8.3.2), also stamped onto
/// client-error records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Retry after providing credentials
    Auth,
    /// Do not retry (unrecoverable error)
    Cancel,
    /// Proceed (the condition was only a warning)
    Continue,
    /// Retry after changing the data sent
    Modify,
    /// Retry after waiting (temporary error)
    Wait,
}

impl ErrorType {
    /// Get the type attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Cancel => "cancel",
            Self::Continue => "continue",
            Self::Modify => "modify",
            Self::Wait => "wait",
        }
    }

    /// Parse a type attribute value.
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "auth" => Self::Auth,
            "cancel" => Self::Cancel,
            "continue" => Self::Continue,
            "modify" => Self::Modify,
            "wait" => Self::Wait,
            _ => return None,
        })
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A one-to-one chat message surfaced to the UI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Jid>,

    /// Message body; absent (not empty) when the stanza carried none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<MessageFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// XEP-0085 chat state carried alongside (or instead of) a body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ChatState>,

    /// XEP-0203 delayed-delivery information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,

    /// Set when the sender requested a delivery receipt (XEP-0184)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<bool>,

    /// ID of the message this one corrects (XEP-0308)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,

    /// Archive references attached to the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<Vec<ArchivedRef>>,
}

/// Body format of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    Plain,
    Xhtml,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Xhtml => "xhtml",
        }
    }
}

/// XEP-0085 Chat State Notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatState {
    Active,
    Composing,
    Paused,
    Inactive,
    Gone,
}

impl ChatState {
    /// The element name for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Composing => "composing",
            Self::Paused => "paused",
            Self::Inactive => "inactive",
            Self::Gone => "gone",
        }
    }

    /// Parse an element name into a state.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "active" => Self::Active,
            "composing" => Self::Composing,
            "paused" => Self::Paused,
            "inactive" => Self::Inactive,
            "gone" => Self::Gone,
            _ => return None,
        })
    }
}

/// XEP-0203 delayed-delivery details, passed through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct Delay {
    /// The `stamp` attribute as sent by the archiving entity
    pub when: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// A single archived-message reference.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivedRef {
    pub by: Jid,
    pub id: String,
}

/// A delivery receipt acknowledgement (XEP-0184 `<received/>`).
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Jid>,
    pub id: String,
}

/// A generic presence update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Presence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Jid>,

    /// Availability; "offline" for unavailable presence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    /// XEP-0115 entity capabilities advertised by the sender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientInfo>,
}

/// XEP-0115 entity-capabilities triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub node: String,
    pub ver: String,
    pub hash: String,
}

/// An inbound subscription request.
#[derive(Debug, Clone, Serialize)]
pub struct Subscribe {
    pub from: Jid,

    /// Nickname suggested by the requester
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
}

/// An inbound presence error, reduced to its condition.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceError {
    /// The XMPP-defined error condition (e.g. "gone")
    pub error: String,

    /// Omitted entirely when the stanza lacked a `from` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Jid>,
}

/// A malformed client request, echoed back verbatim.
///
/// Validation failures are never thrown; this record is the only signal.
#[derive(Debug, Clone, Serialize)]
pub struct ClientError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,

    pub condition: String,

    pub description: String,

    /// Exactly what the client sent, with no normalization
    pub request: Value,
}

impl ClientError {
    /// Build the uniform client-error record for a failed request.
    pub fn new(description: impl Into<String>, request: Value) -> Self {
        Self {
            error_type: ErrorType::Modify,
            condition: "client-error".to_string(),
            description: description.into(),
            request,
        }
    }
}

/// Connection status reported by the session layer.
#[derive(Debug, Clone, Serialize)]
pub struct Connection {
    pub status: ConnectionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Online,
    Offline,
}

/// A fault that belongs to no handler (e.g. an unroutable stanza).
#[derive(Debug, Clone, Serialize)]
pub struct Fault {
    pub description: String,

    /// Serialized form of the offending stanza, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stanza: Option<String>,
}
