//! Battle server: sessions, PvP rooms, and the per-player command surface.
//!
//! This crate wires the deterministic rules in `battle-core` to the outside
//! world. Consumers build a [`BattleServices`] bundle, wrap it in a
//! [`BattleOrchestrator`], and drive each connected player through a
//! [`PlayerHandle`].
//!
//! Modules are organized by responsibility:
//! - [`orchestrator`] owns the player → battle map and routes inbound commands
//! - [`session`] runs PvE battles against NPC and boss providers
//! - [`pvp`] hosts two-player rooms and the invite book
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`party`] and [`rewards`] cover persistence and battle payouts
pub mod api;
pub mod config;
pub mod context;
pub mod events;
pub mod orchestrator;
pub mod party;
pub mod pvp;
pub mod rewards;
pub mod session;

mod workers;

pub use api::{
    ActionProvider, PlayerConnection, PlayerHandle, RandomSkillProvider, Result,
    ScriptedProvider, ServiceError, StrongestSkillProvider,
};
pub use config::ServerConfig;
pub use context::BattleServices;
pub use events::{
    BattleEvent, CombatantView, Event, EventBus, LobbyEvent, OutcomeEvent, Topic, extract_events,
};
pub use orchestrator::BattleOrchestrator;
pub use party::{InMemoryPartyStore, OwnedCreature, PartyError, PartyStore};
pub use pvp::{InviteBook, InviteError, PvpRoom, Submission};
pub use rewards::{ItemDrop, RewardPayload};
pub use session::BattleSession;
