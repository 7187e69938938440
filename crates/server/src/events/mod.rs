//! Topic-based event bus for battle events.
//!
//! Events are published to specific topics, and consumers subscribe only to
//! the topics they need: clients follow [`Topic::Battle`], reward and
//! achievement services follow [`Topic::Outcome`].

mod bus;
mod extractor;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use extractor::{extract_events, notice_events};
pub use types::{BattleEvent, CombatantView, LobbyEvent, OutcomeEvent};
