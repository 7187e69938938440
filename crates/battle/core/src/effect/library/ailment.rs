//! Ailment infliction, immunity and cures.

use std::sync::Arc;

use super::{built, connected, pct_of, took_hit, tick_turns};
use crate::effect::{ActionContext, Applied, Effect, EffectRegistry, Role, Timing};
use crate::env::SkillCategory;
use crate::state::{Ailment, AilmentSet, Combatant, EffectLifetime, Guards, VolatileFlags};

/// Skill effect: inflicts an ailment on the target with `chance`.
#[derive(Clone, Debug)]
pub struct InflictAilment {
    ailment: Ailment,
    chance: u32,
    turns: u8,
}

impl Effect for InflictAilment {
    fn name(&self) -> &'static str {
        "inflict_ailment"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        let them = ctx.them();
        if ctx.inflict(them, self.ailment, self.turns) {
            Applied::Triggered
        } else {
            Applied::Idle
        }
    }
}

/// Skill effect: one of several ailments at random.
#[derive(Clone, Debug)]
pub struct RandomAilment {
    chance: u32,
}

impl RandomAilment {
    const POOL: [Ailment; 3] = [Ailment::Burn, Ailment::Paralysis, Ailment::Freeze];
}

impl Effect for RandomAilment {
    fn name(&self) -> &'static str {
        "tri_attack"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        let pick = ctx.range(0, Self::POOL.len() as u32 - 1) as usize;
        let them = ctx.them();
        if ctx.inflict(them, Self::POOL[pick], 0) {
            Applied::Triggered
        } else {
            Applied::Idle
        }
    }
}

/// Skill effect: the user afflicts itself (optionally after a full heal).
#[derive(Clone, Debug)]
pub struct SelfAilment {
    name: &'static str,
    ailment: Ailment,
    turns: u8,
    full_heal: bool,
}

impl Effect for SelfAilment {
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
        let me = ctx.me();
        if self.full_heal {
            if ctx.owner().is_full_hp() {
                return Applied::Idle;
            }
            ctx.cure(me);
            let missing = ctx.owner().missing_hp();
            ctx.heal(me, missing);
        }
        ctx.inflict(me, self.ailment, self.turns);
        Applied::Triggered
    }
}

/// Defender-held: physical attackers may catch an ailment on contact.
#[derive(Clone, Debug)]
pub struct ContactAilment {
    ailment: Ailment,
    chance: u32,
    turns: u8,
}

impl Effect for ContactAilment {
    fn name(&self) -> &'static str {
        "contact_ailment"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !took_hit(ctx)
            || ctx.category() != Some(SkillCategory::Physical)
            || !ctx.roll(self.chance)
        {
            return Applied::Idle;
        }
        let them = ctx.them();
        if !ctx.inflict(them, self.ailment, self.turns) {
            return Applied::Idle;
        }
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Ward against a set of ailments, set on attach.
#[derive(Clone, Debug)]
pub struct AilmentWard {
    name: &'static str,
    ward: AilmentSet,
}

impl Effect for AilmentWard {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.ailment_ward.insert(self.ward);
        if let Some(state) = owner.ailment()
            && self.ward.contains(state.kind.into())
        {
            owner.cure();
        }
    }

    fn apply(&self, _ctx: &mut ActionContext<'_>) -> Applied {
        Applied::Idle
    }
}

/// Cures the owner: at turn end with `chance`, or as a skill effect.
#[derive(Clone, Debug)]
pub struct SelfCure {
    name: &'static str,
    chance: u32,
    at_turn_end: bool,
}

impl Effect for SelfCure {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        if self.at_turn_end {
            &[Timing::TurnEnd]
        } else {
            &[Timing::AfterDamageApply]
        }
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.owner().ailment().is_none() || !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        let me = ctx.me();
        ctx.cure(me);
        ctx.triggered(self.name);
        Applied::Triggered
    }
}

/// Skill effect: the target flinches if the user moved first.
#[derive(Clone, Debug)]
pub struct Flinch {
    chance: u32,
}

impl Effect for Flinch {
    fn name(&self) -> &'static str {
        "flinch"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.moved_first
            || ctx.dealt == 0
            || ctx.foe().guards.contains(Guards::FLINCH)
            || !ctx.roll(self.chance)
        {
            return Applied::Idle;
        }
        ctx.foe_mut().flags.insert(VolatileFlags::FLINCHED);
        Applied::Triggered
    }
}

/// Attached to the target by yawn: falls asleep at the end of the next turn.
#[derive(Clone, Debug)]
pub struct Drowsy;

impl Drowsy {
    const NAME: &'static str = "drowsy";
}

impl Effect for Drowsy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.scratch.set_counter(Self::NAME, "turns", 2);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if tick_turns(ctx, Self::NAME) > 0 {
            return Applied::Idle;
        }
        let me = ctx.me();
        ctx.inflict(me, Ailment::Sleep, 0);
        Applied::Expired
    }
}

#[derive(Clone, Debug)]
pub struct Yawn;

impl Effect for Yawn {
    fn name(&self) -> &'static str {
        "yawn"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || ctx.foe().ailment().is_some() || ctx.foe().has_effect(Drowsy::NAME)
        {
            return Applied::Idle;
        }
        let them = ctx.them();
        ctx.attach(them, Arc::new(Drowsy), EffectLifetime::Volatile);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Skill effect: removes the target's ailment and heals the user.
#[derive(Clone, Debug)]
pub struct Purify {
    pct: u32,
}

impl Effect for Purify {
    fn name(&self) -> &'static str {
        "purify"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) {
            return Applied::Idle;
        }
        let (me, them) = (ctx.me(), ctx.them());
        if ctx.cure(them).is_none() {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.owner().max_hp(), self.pct);
        ctx.heal(me, amount);
        Applied::Triggered
    }
}

/// Residual immunity that also heals while poisoned.
#[derive(Clone, Debug)]
pub struct PoisonHeal {
    pct: u32,
}

impl Effect for PoisonHeal {
    fn name(&self) -> &'static str {
        "poison_heal"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.guards.insert(Guards::RESIDUAL);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let poisoned = ctx.owner().has_ailment(Ailment::Poison)
            || ctx.owner().has_ailment(Ailment::Toxic);
        if !poisoned || ctx.owner().is_full_hp() {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let me = ctx.me();
        ctx.heal(me, amount);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

fn turns_arg(a: &crate::effect::EffectArgs<'_>, index: usize) -> Result<u8, crate::EffectBuildError> {
    a.bounded_or(index, 0, 20, 0).map(|v| v as u8)
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(90, "inflict_ailment", |a| {
        built(InflictAilment {
            ailment: a.ailment(0)?,
            chance: a.chance_or(1, 100)?,
            turns: turns_arg(a, 2)?,
        })
    });
    r.register(91, "self_ailment", |a| {
        built(SelfAilment {
            name: "self_ailment",
            ailment: a.ailment(0)?,
            turns: turns_arg(a, 1)?,
            full_heal: false,
        })
    });
    r.register(92, "rest", |a| {
        built(SelfAilment {
            name: "rest",
            ailment: Ailment::Sleep,
            turns: a.bounded_or(0, 1, 10, 2)? as u8,
            full_heal: true,
        })
    });
    r.register(93, "contact_ailment", |a| {
        built(ContactAilment {
            ailment: a.ailment(0)?,
            chance: a.chance(1)?,
            turns: turns_arg(a, 2)?,
        })
    });
    r.register(94, "ailment_immunity", |a| {
        built(AilmentWard {
            name: "ailment_immunity",
            ward: a.ailment(0)?.into(),
        })
    });
    r.register(95, "full_ailment_immunity", |_| {
        built(AilmentWard {
            name: "full_ailment_immunity",
            ward: AilmentSet::all(),
        })
    });
    r.register(96, "shed_skin", |a| {
        built(SelfCure {
            name: "shed_skin",
            chance: a.chance(0)?,
            at_turn_end: true,
        })
    });
    r.register(97, "refresh", |_| {
        built(SelfCure {
            name: "refresh",
            chance: 100,
            at_turn_end: false,
        })
    });
    r.register(98, "flinch", |a| built(Flinch { chance: a.chance(0)? }));
    r.register(99, "flinch_immunity", |_| {
        built(super::stages::GuardGrant::new("flinch_immunity", Guards::FLINCH))
    });
    r.register(100, "yawn", |_| built(Yawn));
    r.register(101, "tri_attack", |a| {
        built(RandomAilment {
            chance: a.chance(0)?,
        })
    });
    r.register(102, "purify", |a| built(Purify { pct: a.chance(0)? }));
    r.register(103, "residual_guard", |_| {
        built(super::stages::GuardGrant::new("residual_guard", Guards::RESIDUAL))
    });
    r.register(104, "poison_heal", |a| {
        built(PoisonHeal {
            pct: a.chance_or(0, 12)?,
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectPipeline, Notice};
    use crate::state::Side;
    use crate::testing::{arena_state, rules, tackle};

    #[test]
    fn ward_blocks_and_cures_on_attach() {
        let mut state = arena_state();
        state.active_mut(Side::Home).inflict(Ailment::Poison, 3);
        state.active_mut(Side::Home).attach(
            Arc::new(AilmentWard {
                name: "ailment_immunity",
                ward: Ailment::Poison.into(),
            }),
            0,
            EffectLifetime::Battle,
        );
        let c = state.active_mut(Side::Home);
        assert!(c.ailment().is_none());
        assert!(!c.inflict(Ailment::Poison, 3));
    }

    #[test]
    fn yawn_sleeps_at_end_of_next_turn() {
        let mut state = arena_state();
        let cfg = rules();
        let yawn: Arc<dyn Effect> = Arc::new(Yawn);
        {
            let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1)
                .with_skill(tackle());
            EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&yawn));
            EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        }
        assert!(state.active(Side::Away).ailment().is_none());
        assert!(state.active(Side::Away).has_effect("drowsy"));

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 2);
        EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        assert!(ctx.log().contains(&Notice::AilmentApplied {
            side: Side::Away,
            ailment: Ailment::Sleep
        }));
        drop(ctx);
        assert!(!state.active(Side::Away).has_effect("drowsy"));
    }

    #[test]
    fn flinch_requires_moving_first() {
        let mut state = arena_state();
        let cfg = rules();
        let flinch: Arc<dyn Effect> = Arc::new(Flinch { chance: 100 });
        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        ctx.dealt = 10;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&flinch));
        assert!(!ctx.defender.flags.contains(VolatileFlags::FLINCHED));

        ctx.moved_first = true;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&flinch));
        assert!(ctx.defender.flags.contains(VolatileFlags::FLINCHED));
    }
}
