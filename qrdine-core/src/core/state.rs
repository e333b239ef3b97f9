//! Engine state — single handle over all engine services
//!
//! `CoreState` holds shared references to every service the operations
//! need. Cloning is shallow (all `Arc`s), so handlers and spawned tasks
//! can each own a copy.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::cart::CartLock;
use crate::core::Config;
use crate::db::{Datastore, MemoryStore};
use crate::fanout::EventBus;
use crate::idempotency::IdempotencyCoordinator;
use crate::kv::{KvStore, MemoryKv};

/// Shared engine state.
///
/// | Field | Role |
/// |-------------|----------------------------------------------|
/// | config | immutable configuration |
/// | store | durable record storage (collaborator trait) |
/// | kv | TTL'd key-value store for locks/idempotency |
/// | tokens | table token + session capability verification|
/// | idempotency | retry deduplication for logical writes |
/// | cart_lock | per-cart advisory mutual exclusion |
/// | bus | table/staff event fanout |
#[derive(Clone)]
pub struct CoreState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Datastore>,
    pub kv: Arc<dyn KvStore>,
    pub tokens: Arc<TokenService>,
    pub idempotency: Arc<IdempotencyCoordinator>,
    pub cart_lock: Arc<CartLock>,
    pub bus: Arc<EventBus>,
}

impl CoreState {
    /// Wire the engine against the in-memory reference collaborators
    /// (tests and single-node embedding).
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let kv = Arc::new(MemoryKv::new());
        Self::with_collaborators(config, store, kv)
    }

    /// Wire the engine against externally provided storage collaborators.
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn Datastore>,
        kv: Arc<dyn KvStore>,
    ) -> Self {
        let config = Arc::new(config);
        let tokens = Arc::new(TokenService::new(&config));
        let idempotency = Arc::new(IdempotencyCoordinator::new(kv.clone(), &config));
        let cart_lock = Arc::new(CartLock::new(kv.clone(), &config));
        let bus = Arc::new(EventBus::new(config.event_channel_capacity));
        Self {
            config,
            store,
            kv,
            tokens,
            idempotency,
            cart_lock,
            bus,
        }
    }
}

impl std::fmt::Debug for CoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
