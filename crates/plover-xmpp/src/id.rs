//! Correlation-ID generation.
//!
//! Outgoing stanzas that expect a tracked reply carry a fresh v4 UUID.
//! Alongside the random identifier every handler kind keeps one shared
//! monotone counter in an explicit process-wide registry, so instances of
//! the same kind count issuance together without hidden shared state on
//! the type itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use uuid::Uuid;

static REGISTRY: OnceLock<DashMap<&'static str, Arc<AtomicU64>>> = OnceLock::new();

fn registry() -> &'static DashMap<&'static str, Arc<AtomicU64>> {
    REGISTRY.get_or_init(DashMap::new)
}

/// A handle on the shared counter for one handler kind.
///
/// Cloning (or re-creating for the same kind) yields handles over the
/// same counter; the counter resets only on process restart.
#[derive(Debug, Clone)]
pub struct IdSequence {
    counter: Arc<AtomicU64>,
}

impl IdSequence {
    /// Obtain the sequence for a handler kind, creating it on first use.
    pub fn for_kind(kind: &'static str) -> Self {
        let counter = registry()
            .entry(kind)
            .or_insert_with(|| Arc::new(AtomicU64::new(0)))
            .clone();
        Self { counter }
    }

    /// A fresh correlation ID; also advances the shared counter.
    pub fn fresh(&self) -> String {
        self.counter.fetch_add(1, Ordering::Relaxed);
        Uuid::new_v4().to_string()
    }

    /// How many IDs this kind has issued process-wide.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn consecutive_ids_are_pairwise_distinct() {
        let sequence = IdSequence::for_kind("test-distinct");
        let ids: Vec<String> = (0..101).map(|_| sequence.fresh()).collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn ids_look_like_uuids() {
        let sequence = IdSequence::for_kind("test-shape");
        let id = sequence.fresh();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn same_kind_shares_one_counter() {
        let first = IdSequence::for_kind("test-shared");
        let second = IdSequence::for_kind("test-shared");

        let before = first.issued();
        first.fresh();
        second.fresh();
        second.fresh();

        assert_eq!(first.issued(), before + 3);
        assert_eq!(second.issued(), before + 3);
    }

    #[test]
    fn different_kinds_do_not_share_counters() {
        let left = IdSequence::for_kind("test-left");
        let right = IdSequence::for_kind("test-right");

        let right_before = right.issued();
        left.fresh();

        assert_eq!(right.issued(), right_before);
    }
}
