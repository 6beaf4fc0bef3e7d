//! # Continuation Registry
//!
//! Maps short fixed-width *factory keys* to continuation resolvers, and keeps
//! the TTL store of live one-time continuations behind the built-in kind.
//!
//! A full continuation key is `factory_key + instance_key`, both drawn from
//! `[0-9A-Za-z]` (default widths 3 and 10). It appears in URLs after the
//! router's resume marker: `/x/<full key>/...`.
//!
//! ## Lifecycle of a one-time continuation
//!
//! ```text
//! mint ──► stored ──► resolved once (removed)
//!                └──► expired after TTL (evicted)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cprouter::handler::text;
//! use cprouter::registry::ContinuationRegistry;
//!
//! let registry = ContinuationRegistry::default();
//! let key = registry.mint_handler(text("thanks for your order")).unwrap();
//! assert!(registry.resolve(&key).is_some());
//! assert!(registry.resolve(&key).is_none());
//! ```

mod continuation;
mod core;
pub mod keys;
mod store;

pub use self::core::{ContinuationRegistry, FactoryKey, RegistryConfig, Resolver};
pub use continuation::{Continuation, HandlerFactory, NextFactory};
pub use store::TtlStore;
