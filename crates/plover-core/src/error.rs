use thiserror::Error;

/// Errors raised by the socket event plumbing.
#[derive(Debug, Error)]
pub enum SocketError {
    /// Channel name failed validation
    #[error("invalid channel name: {0}")]
    InvalidChannel(String),

    /// The event stream has been closed (hub dropped)
    #[error("event channel closed")]
    ChannelClosed,

    /// A slow subscriber missed events
    #[error("subscriber lagged by {0} events")]
    Lagged(u64),
}
