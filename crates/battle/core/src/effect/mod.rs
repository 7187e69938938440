//! Atomic effects and the machinery that runs them.
//!
//! An effect is a small struct implementing [`Effect`]: it declares the
//! [`Timing`]s it listens to and mutates the [`ActionContext`] when one fires.
//! Effects come from three places:
//!
//! - passive abilities resolved from content descriptors at battle start,
//! - the optional effect embedded in a skill, built fresh for each use,
//! - timed effects other effects attach at runtime (bind, taunt, wish...).
//!
//! The [`EffectRegistry`] maps numeric ids to constructors; the
//! [`EffectPipeline`] collects and orders whatever is attached when a timing
//! fires.
mod args;
mod context;
pub mod library;
mod notice;
mod pipeline;
mod registry;
mod timing;

pub use args::{EffectArgs, EffectBuildError};
pub use context::{ActionContext, AttackFlags, Modifiers, Role};
pub use notice::{DamageCause, Notice, PreventReason};
pub use pipeline::{Dispatch, EffectPipeline};
pub use registry::{EffectFactory, EffectRegistry};
pub use timing::Timing;

use crate::state::Combatant;

/// Result of one `apply` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Conditions were not met; nothing changed.
    Idle,
    Triggered,
    /// Ran for the last time; the pipeline detaches it.
    Expired,
}

/// A unit of battle behavior.
pub trait Effect: Send + Sync {
    /// Registered name; also the namespace for the owner's scratch slots.
    fn name(&self) -> &'static str;

    fn timings(&self) -> &'static [Timing];

    /// Higher runs earlier within a timing.
    fn priority(&self) -> i32 {
        0
    }

    /// Restricts the effect to actions where its owner holds this role.
    fn role(&self) -> Option<Role> {
        None
    }

    /// Runs even while the owner is fainted (revives).
    fn wakes_fainted(&self) -> bool {
        false
    }

    /// Called once when the effect is attached to `owner`.
    fn on_attach(&self, _owner: &mut Combatant) {}

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied;
}
