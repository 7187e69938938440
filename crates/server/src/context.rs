//! Shared services every session and room borrows from.
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use battle_core::{BattleEnv, BattleId, CatchTime, ContentCatalog, EffectRegistry, TurnResolver};

use crate::config::ServerConfig;
use crate::events::EventBus;
use crate::party::PartyStore;

/// Creatures generated for NPC parties and bosses get catch times above this
/// base so they never collide with owned creatures.
const GENERATED_CATCH_TIME_BASE: u64 = 1 << 48;

struct IdMint {
    battles: AtomicU64,
    generated: AtomicU64,
}

/// Content, effect registry, party store, and event bus behind cheap clones.
#[derive(Clone)]
pub struct BattleServices {
    catalog: Arc<dyn ContentCatalog>,
    registry: Arc<EffectRegistry>,
    party: Arc<dyn PartyStore>,
    events: EventBus,
    config: ServerConfig,
    ids: Arc<IdMint>,
}

impl BattleServices {
    /// Bundles services with the built-in effect registry.
    pub fn new(
        catalog: Arc<dyn ContentCatalog>,
        party: Arc<dyn PartyStore>,
        config: ServerConfig,
    ) -> Self {
        Self {
            catalog,
            registry: Arc::new(EffectRegistry::with_builtin()),
            party,
            events: EventBus::with_capacity(config.event_buffer),
            config,
            ids: Arc::new(IdMint {
                battles: AtomicU64::new(1),
                generated: AtomicU64::new(GENERATED_CATCH_TIME_BASE),
            }),
        }
    }

    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn catalog(&self) -> &dyn ContentCatalog {
        self.catalog.as_ref()
    }

    /// Shared handle to the catalog, for collaborators that outlive a borrow.
    pub fn catalog_handle(&self) -> Arc<dyn ContentCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn party(&self) -> &dyn PartyStore {
        self.party.as_ref()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn env(&self) -> BattleEnv<'_> {
        BattleEnv::new(self.catalog.as_ref())
    }

    pub fn resolver(&self) -> TurnResolver<'_> {
        TurnResolver::new(self.env(), &self.registry)
    }

    pub fn next_battle_id(&self) -> BattleId {
        BattleId(self.ids.battles.fetch_add(1, Ordering::Relaxed))
    }

    /// Catch time for a creature the server generates (NPC party, boss).
    pub fn mint_catch_time(&self) -> CatchTime {
        CatchTime(self.ids.generated.fetch_add(1, Ordering::Relaxed))
    }
}
