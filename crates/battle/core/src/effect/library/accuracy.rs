//! Hit-chance modifiers.

use super::built;
use crate::effect::{ActionContext, Applied, AttackFlags, Effect, EffectRegistry, Role, Timing};
use crate::env::SkillCategory;

/// Adds to the attacker's hit rate, or subtracts when held by the defender.
#[derive(Clone, Debug)]
pub struct HitRateShift {
    name: &'static str,
    role: Role,
    delta: i32,
    /// Only while the owner's HP is at or below this percentage.
    below_hp: Option<u32>,
}

impl Effect for HitRateShift {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(self.role)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if let Some(limit) = self.below_hp
            && ctx.owner().hp_percent() > limit
        {
            return Applied::Idle;
        }
        match self.role {
            Role::Attacker => ctx.mods.hit_rate_delta += self.delta,
            Role::Defender => ctx.mods.hit_rate_delta -= self.delta,
        }
        Applied::Triggered
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SureHitWhen {
    Always,
    FoeAiling,
    StatusSkill,
}

#[derive(Clone, Debug)]
pub struct SureHit {
    name: &'static str,
    when: SureHitWhen,
}

impl Effect for SureHit {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let applies = match self.when {
            SureHitWhen::Always => true,
            SureHitWhen::FoeAiling => ctx.foe().ailment().is_some(),
            SureHitWhen::StatusSkill => ctx.category() == Some(SkillCategory::Status),
        };
        if !applies {
            return Applied::Idle;
        }
        ctx.mods.guaranteed_hit = true;
        Applied::Triggered
    }
}

/// After a miss, the owner's next attack cannot miss.
#[derive(Clone, Debug)]
pub struct LockOn;

impl LockOn {
    const NAME: &'static str = "lock_on";
}

impl Effect for LockOn {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck, Timing::AfterHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.timing == Timing::AfterHitCheck {
            let missed = ctx.flags.contains(AttackFlags::MISS);
            ctx.owner_mut().scratch.set_flag(Self::NAME, "armed", missed);
            return Applied::Idle;
        }
        if !ctx.owner().scratch.flag(Self::NAME, "armed") {
            return Applied::Idle;
        }
        ctx.mods.guaranteed_hit = true;
        ctx.triggered(Self::NAME);
        Applied::Triggered
    }
}

/// Pins the hit chance to a fixed value.
#[derive(Clone, Debug)]
pub struct HitOverride {
    rate: u32,
}

impl Effect for HitOverride {
    fn name(&self) -> &'static str {
        "hit_override"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        ctx.mods.hit_rate_override = Some(self.rate);
        Applied::Triggered
    }
}

/// Defender-held: with `chance`, incoming attacks are forced to miss.
///
/// Writing the override is idempotent, so running it twice or being skipped
/// after another effect already forced the miss leaves the same outcome.
#[derive(Clone, Debug)]
pub struct ForcedMiss {
    chance: u32,
}

impl Effect for ForcedMiss {
    fn name(&self) -> &'static str {
        "forced_miss"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.mods.hit_rate_override == Some(0) {
            return Applied::Idle;
        }
        if !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        ctx.mods.hit_rate_override = Some(0);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Defender-held: turns a landed hit into a miss after the roll.
#[derive(Clone, Debug)]
pub struct Dodge {
    chance: u32,
}

impl Effect for Dodge {
    fn name(&self) -> &'static str {
        "dodge"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.flags.contains(AttackFlags::MISS)
            || ctx.mods.guaranteed_hit
            || !ctx.is_damaging()
            || !ctx.roll(self.chance)
        {
            return Applied::Idle;
        }
        ctx.flags.insert(AttackFlags::MISS);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(40, "accuracy_boost", |a| {
        built(HitRateShift {
            name: "accuracy_boost",
            role: Role::Attacker,
            delta: a.bounded(0, 1, 100)?,
            below_hp: None,
        })
    });
    r.register(41, "evasion", |a| {
        built(HitRateShift {
            name: "evasion",
            role: Role::Defender,
            delta: a.bounded(0, 1, 100)?,
            below_hp: None,
        })
    });
    r.register(42, "sure_hit", |_| {
        built(SureHit {
            name: "sure_hit",
            when: SureHitWhen::Always,
        })
    });
    r.register(43, "sure_hit_vs_ailing", |_| {
        built(SureHit {
            name: "sure_hit_vs_ailing",
            when: SureHitWhen::FoeAiling,
        })
    });
    r.register(44, "lock_on", |_| built(LockOn));
    r.register(45, "hit_override", |a| built(HitOverride { rate: a.chance(0)? }));
    r.register(46, "forced_miss", |a| {
        built(ForcedMiss {
            chance: a.chance_or(0, 100)?,
        })
    });
    r.register(47, "dodge", |a| built(Dodge { chance: a.chance(0)? }));
    r.register(48, "low_hp_evasion", |a| {
        built(HitRateShift {
            name: "low_hp_evasion",
            role: Role::Defender,
            below_hp: Some(a.chance(0)?),
            delta: a.bounded(1, 1, 100)?,
        })
    });
    r.register(49, "status_sure_hit", |_| {
        built(SureHit {
            name: "status_sure_hit",
            when: SureHitWhen::StatusSkill,
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectPipeline;
    use crate::state::{EffectLifetime, Side};
    use crate::testing::{arena_state, rules, tackle};
    use std::sync::Arc;

    #[test]
    fn forced_miss_is_idempotent() {
        let mut state = arena_state();
        let cfg = rules();
        let miss: Arc<dyn Effect> = Arc::new(ForcedMiss { chance: 100 });
        state
            .active_mut(Side::Away)
            .attach(Arc::clone(&miss), 0, EffectLifetime::Battle);
        state
            .active_mut(Side::Away)
            .attach(miss, 1, EffectLifetime::Battle);

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        let once = EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, None);
        assert_eq!(ctx.mods.hit_rate_override, Some(0));
        assert_eq!(once.triggered, 1);

        let again = EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, None);
        assert_eq!(ctx.mods.hit_rate_override, Some(0));
        assert_eq!(again.triggered, 0);
    }

    #[test]
    fn evasion_subtracts_from_hit_rate() {
        let mut state = arena_state();
        let cfg = rules();
        state.active_mut(Side::Away).attach(
            Arc::new(HitRateShift {
                name: "evasion",
                role: Role::Defender,
                delta: 20,
                below_hp: None,
            }),
            0,
            EffectLifetime::Battle,
        );
        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, None);
        assert_eq!(ctx.mods.hit_rate_delta, -20);
    }
}
