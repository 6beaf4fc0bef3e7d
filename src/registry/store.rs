use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

struct Slot<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> Slot<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.ttl
    }
}

/// Concurrent map whose entries expire after a per-entry TTL.
///
/// Expiry is checked lazily on access; [`TtlStore::purge_expired`] sweeps
/// whatever nobody came back for. Each key is guarded by its DashMap shard,
/// so `take` hands a value to exactly one caller.
pub struct TtlStore<V> {
    entries: DashMap<String, Slot<V>>,
}

impl<V> Default for TtlStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlStore<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert under `key` unless a live entry already holds it. An expired
    /// entry in the slot is replaced. On conflict the value is handed back.
    pub fn insert_unique(&self, key: String, value: V, ttl: Duration) -> Result<(), V> {
        let now = Instant::now();
        let slot = Slot {
            value,
            created_at: now,
            ttl,
        };
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(slot);
                    Ok(())
                } else {
                    Err(slot.value)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
                Ok(())
            }
        }
    }

    /// Remove and return a live entry. Expired entries are dropped and
    /// reported as missing.
    pub fn take(&self, key: &str) -> Option<V> {
        let (_, slot) = self.entries.remove(key)?;
        if slot.is_expired(Instant::now()) {
            None
        } else {
            Some(slot.value)
        }
    }

    #[must_use]
    pub fn contains_live(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|slot| !slot.is_expired(Instant::now()))
            .unwrap_or(false)
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, slot| {
            let keep = !slot.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Entries currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
