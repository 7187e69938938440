//! Built-in effect library.
//!
//! Each file owns a block of ids and registers them in `register`. Ids are
//! stable: content files refer to them directly.
//!
//! | ids | file |
//! |---|---|
//! | 1-39 | [`damage`] |
//! | 40-49 | [`accuracy`] |
//! | 50-57 | [`critical`] |
//! | 60-66 | [`priority`] |
//! | 70-89 | [`stages`] |
//! | 90-104 | [`ailment`] |
//! | 105-114 | [`healing`] |
//! | 120-129 | [`shield`] |
//! | 130-139 | [`reflect`] |
//! | 140-148 | [`timed`] |
//! | 149-161 | [`misc`] |
use std::sync::Arc;

use super::{ActionContext, AttackFlags, Effect, EffectBuildError, EffectRegistry};
use crate::state::StatKind;

pub mod accuracy;
pub mod ailment;
pub mod critical;
pub mod damage;
pub mod healing;
pub mod misc;
pub mod priority;
pub mod reflect;
pub mod shield;
pub mod stages;
pub mod timed;

pub(crate) fn register_builtin(registry: &mut EffectRegistry) {
    damage::register(registry);
    accuracy::register(registry);
    critical::register(registry);
    priority::register(registry);
    stages::register(registry);
    ailment::register(registry);
    healing::register(registry);
    shield::register(registry);
    reflect::register(registry);
    timed::register(registry);
    misc::register(registry);
}

/// Stats that battle stages apply to, accuracy excluded.
const CORE_STATS: [StatKind; 5] = [
    StatKind::Attack,
    StatKind::Defense,
    StatKind::SpAttack,
    StatKind::SpDefense,
    StatKind::Speed,
];

fn built<E: Effect + 'static>(effect: E) -> Result<Arc<dyn Effect>, EffectBuildError> {
    Ok(Arc::new(effect))
}

/// `pct` percent of `value`, rounded down.
pub(crate) fn pct_of(value: u32, pct: u32) -> u32 {
    (value as u64 * pct as u64 / 100) as u32
}

/// The action's skill reached the target.
fn connected(ctx: &ActionContext<'_>) -> bool {
    ctx.skill.is_some()
        && !ctx
            .flags
            .intersects(AttackFlags::MISS | AttackFlags::BLOCKED | AttackFlags::PREVENTED)
}

/// The owner was hit for damage by this action.
fn took_hit(ctx: &ActionContext<'_>) -> bool {
    !ctx.owner_is_attacker() && ctx.dealt > 0
}

/// Decrements the owner's `turns` counter under `name` and returns what is left.
fn tick_turns(ctx: &mut ActionContext<'_>, name: &'static str) -> u32 {
    let scratch = &mut ctx.owner_mut().scratch;
    let left = scratch.counter(name, "turns").saturating_sub(1);
    scratch.set_counter(name, "turns", left);
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let registry = EffectRegistry::with_builtin();
        let names: HashSet<&str> = (0..200)
            .filter_map(|id| registry.name(crate::state::EffectId(id)))
            .collect();
        assert_eq!(names.len(), registry.len());
    }
}
