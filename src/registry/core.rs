use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use super::continuation::{Continuation, Resumed};
use super::keys::{generate_key, is_valid_key, key_space, nth_key};
use super::store::TtlStore;
use crate::control_point::State;
use crate::error::RegistryError;
use crate::handler::ResponseHandler;

/// Fixed-width key selecting a continuation kind.
pub type FactoryKey = String;

/// Turns an instance key into a continuation, or `None` when unknown.
pub type Resolver = Arc<dyn Fn(&str) -> Option<Continuation> + Send + Sync>;

/// Random attempts before registration falls back to a sequential scan.
const RANDOM_FACTORY_ATTEMPTS: usize = 64;

/// Random attempts before minting scans the instance key space in order.
const RANDOM_INSTANCE_ATTEMPTS: usize = 16;

/// Largest instance key space minting will scan sequentially.
const SEQUENTIAL_SCAN_LIMIT: u64 = 1 << 20;

/// Mints between opportunistic sweeps of expired continuations.
const PURGE_EVERY: u64 = 256;

/// Key widths and continuation lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    pub factory_key_width: usize,
    pub instance_key_len: usize,
    pub ttl: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            factory_key_width: 3,
            instance_key_len: 10,
            ttl: Duration::from_secs(300),
        }
    }
}

impl RegistryConfig {
    /// Widths below one are raised to one.
    #[must_use]
    pub fn new(factory_key_width: usize, instance_key_len: usize, ttl: Duration) -> Self {
        Self {
            factory_key_width: factory_key_width.max(1),
            instance_key_len: instance_key_len.max(1),
            ttl,
        }
    }
}

/// Process-wide table of continuation kinds plus the store of live
/// one-time continuations.
///
/// Construct one at startup, share it through `Arc`, and hand it to the
/// [`Router`](crate::router::Router). Keys are `factory_key + instance_key`;
/// the built-in one-time kind is registered on construction and removes an
/// entry the first time it resolves.
pub struct ContinuationRegistry {
    config: RegistryConfig,
    factories: RwLock<HashMap<FactoryKey, Resolver>>,
    store: Arc<TtlStore<Continuation>>,
    one_time_key: FactoryKey,
    mints: AtomicU64,
}

impl Default for ContinuationRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl fmt::Debug for ContinuationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuationRegistry")
            .field("config", &self.config)
            .field("one_time_key", &self.one_time_key)
            .field("factories", &self.factory_count())
            .field("live_continuations", &self.live_continuations())
            .finish()
    }
}

impl ContinuationRegistry {
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        let config = RegistryConfig::new(config.factory_key_width, config.instance_key_len, config.ttl);
        let store: Arc<TtlStore<Continuation>> = Arc::new(TtlStore::new());

        // The table is empty, so the first random key is always free.
        let one_time_key = generate_key(config.factory_key_width);
        let one_time_store = Arc::clone(&store);
        let one_time: Resolver = Arc::new(move |instance: &str| one_time_store.take(instance));
        let mut factories = HashMap::new();
        factories.insert(one_time_key.clone(), one_time);

        info!(
            factory_key_width = config.factory_key_width,
            instance_key_len = config.instance_key_len,
            ttl_secs = config.ttl.as_secs(),
            one_time_key = %one_time_key,
            "Continuation registry created"
        );

        Self {
            config,
            factories: RwLock::new(factories),
            store,
            one_time_key,
            mints: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Factory key of the built-in one-time continuation kind.
    #[must_use]
    pub fn one_time_factory_key(&self) -> &str {
        &self.one_time_key
    }

    /// Register a continuation kind under a fresh random key.
    ///
    /// Key choice, uniqueness check and insertion happen under one write
    /// lock. After a run of random collisions the key space is scanned in
    /// order, so registration always succeeds while any key is free.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Exhausted`] when all `62^width` keys are taken.
    pub fn register_factory<F>(&self, resolver: F) -> Result<FactoryKey, RegistryError>
    where
        F: Fn(&str) -> Option<Continuation> + Send + Sync + 'static,
    {
        let width = self.config.factory_key_width;
        let capacity = key_space(width);
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);

        if factories.len() as u64 >= capacity {
            warn!(capacity, "Continuation factory key space exhausted");
            return Err(RegistryError::Exhausted { capacity });
        }

        let key = (0..RANDOM_FACTORY_ATTEMPTS)
            .map(|_| generate_key(width))
            .find(|candidate| !factories.contains_key(candidate))
            .or_else(|| {
                (0..capacity)
                    .map(|n| nth_key(n, width))
                    .find(|candidate| !factories.contains_key(candidate))
            })
            .ok_or(RegistryError::Exhausted { capacity })?;

        factories.insert(key.clone(), Arc::new(resolver));
        debug!(factory_key = %key, registered = factories.len(), "Continuation factory registered");
        Ok(key)
    }

    /// Register a continuation kind under a caller-chosen key.
    ///
    /// Returns `Ok(false)` when the key is already taken. A full table
    /// always reports `Ok(false)`, since every valid key is then in use.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidKey`] when the key has the wrong width or
    /// characters outside `[0-9A-Za-z]`.
    pub fn register_factory_with_key<F>(&self, key: &str, resolver: F) -> Result<bool, RegistryError>
    where
        F: Fn(&str) -> Option<Continuation> + Send + Sync + 'static,
    {
        let width = self.config.factory_key_width;
        if key.len() != width {
            return Err(RegistryError::InvalidKey {
                key: key.to_string(),
                reason: "wrong width",
            });
        }
        if !is_valid_key(key, width) {
            return Err(RegistryError::InvalidKey {
                key: key.to_string(),
                reason: "characters outside [0-9A-Za-z]",
            });
        }

        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        if factories.contains_key(key) {
            return Ok(false);
        }
        factories.insert(key.to_string(), Arc::new(resolver));
        debug!(factory_key = %key, "Continuation factory registered with explicit key");
        Ok(true)
    }

    #[must_use]
    pub fn factory_count(&self) -> usize {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Store a one-time continuation with the default TTL and return its key.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InstanceKeysExhausted`] when no free instance key
    /// could be found.
    pub fn mint(&self, continuation: Continuation) -> Result<String, RegistryError> {
        self.mint_with_ttl(continuation, self.config.ttl)
    }

    /// As [`ContinuationRegistry::mint`] with an explicit lifetime.
    ///
    /// A few random keys are tried first. Small key spaces are then swept of
    /// expired entries and scanned in order, so minting fails only when every
    /// key is held by a live continuation. Large key spaces are not scanned.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InstanceKeysExhausted`] when no free key was found.
    pub fn mint_with_ttl(&self, continuation: Continuation, ttl: Duration) -> Result<String, RegistryError> {
        let len = self.config.instance_key_len;
        let capacity = key_space(len);
        let mut pending = continuation;

        for _ in 0..RANDOM_INSTANCE_ATTEMPTS {
            let candidate = generate_key(len);
            match self.store.insert_unique(candidate.clone(), pending, ttl) {
                Ok(()) => return Ok(self.minted(&candidate)),
                Err(returned) => {
                    trace!("Instance key collision, retrying");
                    pending = returned;
                }
            }
        }

        if capacity <= SEQUENTIAL_SCAN_LIMIT {
            self.store.purge_expired();
            for n in 0..capacity {
                let candidate = nth_key(n, len);
                match self.store.insert_unique(candidate.clone(), pending, ttl) {
                    Ok(()) => return Ok(self.minted(&candidate)),
                    Err(returned) => pending = returned,
                }
            }
        }

        warn!(capacity, live = self.store.len(), "No free continuation instance key");
        Err(RegistryError::InstanceKeysExhausted { capacity })
    }

    fn minted(&self, instance_key: &str) -> String {
        let minted = self.mints.fetch_add(1, Ordering::Relaxed) + 1;
        if minted % PURGE_EVERY == 0 {
            let purged = self.store.purge_expired();
            if purged > 0 {
                debug!(purged, live = self.store.len(), "Expired continuations purged");
            }
        }
        format!("{}{}", self.one_time_key, instance_key)
    }

    /// One-time link to a fixed handler.
    ///
    /// # Errors
    ///
    /// As [`ContinuationRegistry::mint`].
    pub fn mint_handler<H: ResponseHandler + 'static>(&self, handler: H) -> Result<String, RegistryError> {
        self.mint(Continuation::from_handler(handler))
    }

    /// One-time link to a handler that continues into `next` when more
    /// segments follow the key.
    ///
    /// # Errors
    ///
    /// As [`ContinuationRegistry::mint`].
    pub fn mint_handler_then<H: ResponseHandler + 'static>(
        &self,
        handler: H,
        next: State,
    ) -> Result<String, RegistryError> {
        self.mint(Continuation::from_handler(handler).then_state(next))
    }

    /// One-time link that resumes into an existing state.
    ///
    /// # Errors
    ///
    /// As [`ContinuationRegistry::mint`].
    pub fn mint_state(&self, state: State) -> Result<String, RegistryError> {
        self.mint(Continuation::from_state(state))
    }

    /// Resolve a full key (`factory_key + instance_key`).
    ///
    /// Unknown factory keys, keys shorter than the factory width, and stale
    /// or already-used instance keys all yield `None`. The factory table
    /// lock is released before the resolver runs.
    #[must_use]
    pub fn resolve(&self, full_key: &str) -> Option<State> {
        let width = self.config.factory_key_width;
        let (factory_key, instance_key) = match (full_key.get(..width), full_key.get(width..)) {
            (Some(factory), Some(instance)) => (factory, instance),
            _ => return None,
        };

        let resolver = {
            let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(factories.get(factory_key)?)
        };

        let continuation = resolver(instance_key)?;
        trace!(factory_key, "Continuation resolved");
        Some(Arc::new(Resumed::new(continuation)))
    }

    /// Drop expired one-time continuations now.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    /// One-time continuations currently stored (including expired ones not
    /// yet swept).
    #[must_use]
    pub fn live_continuations(&self) -> usize {
        self.store.len()
    }
}
