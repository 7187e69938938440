//! Turn resolution and everything around it: commands, formulas, ordering,
//! spawning combatants from templates and capture odds.

mod action;
mod capture;
mod error;
pub mod formula;
mod order;
mod report;
mod resolver;
mod round;
mod spawn;

pub use action::{BattleAction, TurnIntent};
pub use capture::capture_chance;
pub use error::{CommandError, TargetIssue};
pub use order::{Contender, order};
pub use report::{AttackReport, TurnReport};
pub use resolver::TurnResolver;
pub use spawn::{CreatureSpec, scaled_hp, scaled_stat, spawn_boss, spawn_creature};
