//! Pending-reply correlation.
//!
//! A correlation ID registered here maps to a one-shot continuation that
//! fires when the matching reply arrives. Entries expire after a bounded
//! TTL. Expired entries are dropped silently, preserving the contract
//! that a reply which never arrives never fires anything.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use plover_core::{Reply, ReplyFn};

/// How long a tracked ID waits for its reply before being dropped.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct PendingReply {
    reply: ReplyFn,
    expires_at: Instant,
}

/// Map from correlation ID to a one-shot reply continuation.
pub struct IdTracker {
    pending: DashMap<String, PendingReply>,
    ttl: Duration,
}

impl IdTracker {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            ttl,
        }
    }

    /// Register a continuation for a correlation ID.
    ///
    /// Expired entries are swept opportunistically here, so a session
    /// that keeps sending keeps its map bounded without a background
    /// task.
    pub fn track(&self, id: impl Into<String>, reply: ReplyFn) {
        self.sweep();
        let id = id.into();
        debug!(id = %id, "tracking reply");
        self.pending.insert(
            id,
            PendingReply {
                reply,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Fire the continuation registered for an ID, exactly once.
    ///
    /// Returns `false` for unknown, already-resolved, or expired IDs;
    /// expired continuations are dropped without firing.
    pub fn resolve(&self, id: &str, outcome: Reply) -> bool {
        let Some((_, pending)) = self.pending.remove(id) else {
            return false;
        };
        if pending.expires_at < Instant::now() {
            debug!(id = %id, "reply arrived after expiry");
            return false;
        }
        (pending.reply)(outcome);
        true
    }

    /// Number of replies still waiting.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn sweep(&self) {
        let now = Instant::now();
        self.pending.retain(|_, pending| pending.expires_at >= now);
    }
}

impl Default for IdTracker {
    fn default() -> Self {
        Self::new()
    }
}
