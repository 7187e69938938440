//! Protection, shields and damage immunity.

use std::sync::Arc;

use super::{built, pct_of};
use crate::effect::{ActionContext, Applied, AttackFlags, Effect, EffectRegistry, Role, Timing};
use crate::env::SkillCategory;
use crate::state::{Combatant, EffectLifetime, Element, VolatileFlags};

/// Skill effect: a one-turn stance that gets less reliable when chained.
///
/// The n-th consecutive successful use succeeds with `100 >> n` percent.
#[derive(Clone, Debug)]
pub struct Stance {
    name: &'static str,
    flag: VolatileFlags,
}

impl Stance {
    const STREAK: &'static str = "stance";
}

impl Effect for Stance {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.flags.contains(AttackFlags::PREVENTED) {
            return Applied::Idle;
        }
        let turn = ctx.turn;
        let scratch = &ctx.owner().scratch;
        let chained = scratch.counter(Self::STREAK, "turn") + 1 == turn;
        let streak = if chained {
            scratch.counter(Self::STREAK, "streak")
        } else {
            0
        };

        let chance = 100u32.checked_shr(streak).unwrap_or(0);
        let succeeded = ctx.roll(chance);
        let scratch = &mut ctx.owner_mut().scratch;
        scratch.set_counter(Self::STREAK, "turn", turn);
        if !succeeded {
            scratch.set_counter(Self::STREAK, "streak", 0);
            return Applied::Idle;
        }
        scratch.set_counter(Self::STREAK, "streak", streak + 1);
        ctx.owner_mut().flags.insert(self.flag);
        Applied::Triggered
    }
}

/// Blocks the next `hits` damaging attacks.
#[derive(Clone, Debug)]
pub struct HitShield {
    hits: u32,
}

impl HitShield {
    const NAME: &'static str = "hit_shield";
}

impl Effect for HitShield {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.scratch.set_counter(Self::NAME, "hits", self.hits);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.is_damaging() || ctx.flags.contains(AttackFlags::BLOCKED) {
            return Applied::Idle;
        }
        ctx.flags.insert(AttackFlags::BLOCKED);
        ctx.triggered(Self::NAME);
        let scratch = &mut ctx.owner_mut().scratch;
        let left = scratch.counter(Self::NAME, "hits").saturating_sub(1);
        scratch.set_counter(Self::NAME, "hits", left);
        if left == 0 {
            scratch.clear_owner(Self::NAME);
            Applied::Expired
        } else {
            Applied::Triggered
        }
    }
}

/// Skill effect: raises a [`HitShield`] on the user.
#[derive(Clone, Debug)]
pub struct Barrier {
    hits: u32,
}

impl Effect for Barrier {
    fn name(&self) -> &'static str {
        "barrier"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.flags.contains(AttackFlags::PREVENTED) {
            return Applied::Idle;
        }
        let me = ctx.me();
        let shield = Arc::new(HitShield { hits: self.hits });
        match ctx.attach_unique(me, shield, EffectLifetime::Volatile) {
            Some(_) => Applied::Triggered,
            None => Applied::Idle,
        }
    }
}

/// A decoy holding HP that soaks attacks in place of its owner.
#[derive(Clone, Debug)]
pub struct Decoy {
    hp: u32,
}

impl Decoy {
    const NAME: &'static str = "decoy";
}

impl Effect for Decoy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -60
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.scratch.set_counter(Self::NAME, "hp", self.hp);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.damage == 0 {
            return Applied::Idle;
        }
        let damage = std::mem::take(&mut ctx.damage);
        let scratch = &mut ctx.owner_mut().scratch;
        let left = scratch.counter(Self::NAME, "hp").saturating_sub(damage);
        scratch.set_counter(Self::NAME, "hp", left);
        ctx.triggered(Self::NAME);
        if left == 0 {
            ctx.owner_mut().scratch.clear_owner(Self::NAME);
            Applied::Expired
        } else {
            Applied::Triggered
        }
    }
}

/// Skill effect: pays `pct` of max HP to raise a [`Decoy`] with that much HP.
#[derive(Clone, Debug)]
pub struct Substitute {
    pct: u32,
}

impl Effect for Substitute {
    fn name(&self) -> &'static str {
        "substitute"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let cost = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        if ctx.flags.contains(AttackFlags::PREVENTED)
            || ctx.owner().hp() <= cost
            || ctx.owner().has_effect(Decoy::NAME)
        {
            return Applied::Idle;
        }
        let me = ctx.me();
        ctx.deal_direct(me, cost, crate::effect::DamageCause::Effect);
        ctx.attach(me, Arc::new(Decoy { hp: cost }), EffectLifetime::Volatile);
        Applied::Triggered
    }
}

/// Held, single use: the first damaging hit deals nothing.
#[derive(Clone, Debug)]
pub struct Disguise;

impl Effect for Disguise {
    fn name(&self) -> &'static str {
        "disguise"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -70
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.damage == 0 {
            return Applied::Idle;
        }
        ctx.damage = 0;
        ctx.triggered(self.name());
        Applied::Expired
    }
}

/// What a [`HitFilter`] blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocks {
    Element(Element),
    StatusSkills,
    PrioritySkills,
}

/// Held: blocks matching skills before the hit check.
#[derive(Clone, Debug)]
pub struct HitFilter {
    name: &'static str,
    blocks: Blocks,
}

impl Effect for HitFilter {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let Some(skill) = ctx.skill.as_ref() else {
            return Applied::Idle;
        };
        let blocked = match self.blocks {
            Blocks::Element(element) => skill.element == element,
            Blocks::StatusSkills => skill.category == SkillCategory::Status,
            Blocks::PrioritySkills => i32::from(skill.priority) + ctx.mods.priority_delta > 0,
        };
        if !blocked {
            return Applied::Idle;
        }
        ctx.flags.insert(AttackFlags::BLOCKED);
        ctx.triggered(self.name);
        Applied::Triggered
    }
}

/// Held: survives any hit from full HP with 1 HP left.
#[derive(Clone, Debug)]
pub struct Sturdy;

impl Effect for Sturdy {
    fn name(&self) -> &'static str {
        "sturdy"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -90
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let hp = ctx.owner().hp();
        if !ctx.owner().is_full_hp() || ctx.damage < hp {
            return Applied::Idle;
        }
        ctx.damage = hp - 1;
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(120, "protect", |_| {
        built(Stance {
            name: "protect",
            flag: VolatileFlags::PROTECTED,
        })
    });
    r.register(121, "endure", |_| {
        built(Stance {
            name: "endure",
            flag: VolatileFlags::ENDURING,
        })
    });
    r.register(122, "barrier", |a| {
        built(Barrier {
            hits: a.count_or(0, 10, 1)?,
        })
    });
    r.register(123, "hit_shield", |a| {
        built(HitShield {
            hits: a.count_or(0, 10, 1)?,
        })
    });
    r.register(124, "substitute", |a| {
        built(Substitute {
            pct: a.bounded_or(0, 1, 99, 25)? as u32,
        })
    });
    r.register(125, "disguise", |_| built(Disguise));
    r.register(126, "element_immunity", |a| {
        built(HitFilter {
            name: "element_immunity",
            blocks: Blocks::Element(a.element(0)?),
        })
    });
    r.register(127, "status_guard", |_| {
        built(HitFilter {
            name: "status_guard",
            blocks: Blocks::StatusSkills,
        })
    });
    r.register(128, "sturdy", |_| built(Sturdy));
    r.register(129, "priority_guard", |_| {
        built(HitFilter {
            name: "priority_guard",
            blocks: Blocks::PrioritySkills,
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectPipeline;
    use crate::state::Side;
    use crate::testing::{arena_state, rules, tackle};

    #[test]
    fn hit_shield_blocks_then_expires() {
        let mut state = arena_state();
        let cfg = rules();
        state.active_mut(Side::Away).attach(
            Arc::new(HitShield { hits: 1 }),
            0,
            EffectLifetime::Volatile,
        );

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        let summary = EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, None);
        assert!(ctx.flags.contains(AttackFlags::BLOCKED));
        assert_eq!(summary.expired, 1);
        drop(ctx);
        assert!(!state.active(Side::Away).has_effect("hit_shield"));
    }

    #[test]
    fn sturdy_leaves_one_hp_from_full() {
        let mut state = arena_state();
        let cfg = rules();
        state
            .active_mut(Side::Away)
            .attach(Arc::new(Sturdy), 0, EffectLifetime::Battle);
        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        ctx.damage = 500;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageCalc, None);
        assert_eq!(ctx.damage, 99);
    }

    #[test]
    fn chained_protect_can_fail() {
        let mut state = arena_state();
        let cfg = rules();
        let protect: Arc<dyn Effect> = Arc::new(Stance {
            name: "protect",
            flag: VolatileFlags::PROTECTED,
        });

        let mut succeeded = 0;
        for turn in 1..=12 {
            let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, turn);
            ctx.skill = Some(tackle());
            EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&protect));
            if ctx.attacker.flags.contains(VolatileFlags::PROTECTED) {
                succeeded += 1;
            }
            ctx.attacker.clear_turn_flags();
        }
        assert!(succeeded >= 1);
        assert!(succeeded < 12);
    }

    #[test]
    fn decoy_soaks_damage() {
        let mut state = arena_state();
        let cfg = rules();
        let sub: Arc<dyn Effect> = Arc::new(Substitute { pct: 25 });
        {
            let mut ctx = ActionContext::new(state.arena(Side::Away), Side::Away, &cfg, 1)
                .with_skill(tackle());
            EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&sub));
        }
        assert_eq!(state.active(Side::Away).hp(), 75);

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 2).with_skill(tackle());
        ctx.damage = 10;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageCalc, None);
        assert_eq!(ctx.damage, 0);
        drop(ctx);
        assert_eq!(state.active(Side::Away).scratch.counter("decoy", "hp"), 15);
    }
}
