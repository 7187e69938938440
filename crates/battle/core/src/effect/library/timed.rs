//! Effects that count down over several turns.
//!
//! Skill effects here attach a timer to one of the combatants. Timers keep
//! their remaining turns in the holder's scratch under their own name and
//! detach by returning [`Applied::Expired`].

use std::sync::Arc;

use super::{CORE_STATS, built, connected, pct_of, tick_turns};
use crate::effect::{
    ActionContext, Applied, AttackFlags, DamageCause, Effect, EffectRegistry, Notice,
    PreventReason, Role, Timing,
};
use crate::env::SkillCategory;
use crate::state::{Ailment, Combatant, EffectLifetime, SkillId, VolatileFlags};

fn attach_timer(ctx: &mut ActionContext<'_>, target: Role, timer: Arc<dyn Effect>) -> Applied {
    match ctx.attach_unique(target, timer, EffectLifetime::Volatile) {
        Some(_) => Applied::Triggered,
        None => Applied::Idle,
    }
}

fn seal(ctx: &mut ActionContext<'_>) -> Applied {
    ctx.flags.insert(AttackFlags::PREVENTED);
    let side = ctx.owner_side();
    ctx.notify(Notice::Prevented {
        side,
        reason: PreventReason::Sealed,
    });
    Applied::Triggered
}

// ============================================================================
// Perish count
// ============================================================================

#[derive(Clone, Debug)]
pub struct PerishCount {
    turns: u32,
}

impl PerishCount {
    const NAME: &'static str = "perish_count";
}

impl Effect for PerishCount {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.scratch.set_counter(Self::NAME, "turns", self.turns);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if tick_turns(ctx, Self::NAME) > 0 {
            return Applied::Idle;
        }
        let hp = ctx.owner().hp();
        let me = ctx.me();
        ctx.deal_direct(me, hp, DamageCause::Effect);
        Applied::Expired
    }
}

/// Skill effect: both combatants faint after `turns` turn ends unless withdrawn.
#[derive(Clone, Debug)]
pub struct Perish {
    turns: u32,
}

impl Effect for Perish {
    fn name(&self) -> &'static str {
        "perish"
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
        let mut any = false;
        for role in [Role::Attacker, Role::Defender] {
            let timer = Arc::new(PerishCount { turns: self.turns });
            any |= ctx
                .attach_unique(role, timer, EffectLifetime::Volatile)
                .is_some();
        }
        if any { Applied::Triggered } else { Applied::Idle }
    }
}

// ============================================================================
// Damage over time
// ============================================================================

/// Held: a sleeping foe loses HP every turn end.
#[derive(Clone, Debug)]
pub struct NightmareAura {
    pct: u32,
}

impl Effect for NightmareAura {
    fn name(&self) -> &'static str {
        "nightmare_aura"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.foe().has_ailment(Ailment::Sleep) || ctx.foe().is_fainted() {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.foe().max_hp(), self.pct).max(1);
        let them = ctx.them();
        ctx.deal_direct(them, amount, DamageCause::Effect);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Attached by bind: the holder cannot switch and loses HP each turn end.
#[derive(Clone, Debug)]
pub struct Bound {
    turns: u32,
    pct: u32,
}

impl Bound {
    const NAME: &'static str = "bound";
}

impl Effect for Bound {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.flags.insert(VolatileFlags::BOUND);
        owner.scratch.set_counter(Self::NAME, "turns", self.turns);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let amount = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let me = ctx.me();
        ctx.deal_direct(me, amount, DamageCause::Effect);
        if tick_turns(ctx, Self::NAME) > 0 {
            return Applied::Triggered;
        }
        ctx.owner_mut().flags.remove(VolatileFlags::BOUND);
        Applied::Expired
    }
}

#[derive(Clone, Debug)]
pub struct Bind {
    turns: u32,
    pct: u32,
}

impl Effect for Bind {
    fn name(&self) -> &'static str {
        "bind"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || ctx.foe().is_fainted() {
            return Applied::Idle;
        }
        let them = ctx.them();
        let timer = Arc::new(Bound {
            turns: self.turns,
            pct: self.pct,
        });
        attach_timer(ctx, them, timer)
    }
}

/// Attached by curse: loses a quarter of max HP every turn end.
#[derive(Clone, Debug)]
pub struct Cursed;

impl Effect for Cursed {
    fn name(&self) -> &'static str {
        "cursed"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let amount = (ctx.owner().max_hp() / 4).max(1);
        let me = ctx.me();
        ctx.deal_direct(me, amount, DamageCause::Effect);
        Applied::Triggered
    }
}

/// Skill effect: the user pays half its max HP to curse the foe.
#[derive(Clone, Debug)]
pub struct Curse;

impl Effect for Curse {
    fn name(&self) -> &'static str {
        "curse"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || ctx.foe().has_effect("cursed") {
            return Applied::Idle;
        }
        let cost = (ctx.owner().max_hp() / 2).max(1);
        let (me, them) = (ctx.me(), ctx.them());
        ctx.deal_direct(me, cost, DamageCause::Effect);
        attach_timer(ctx, them, Arc::new(Cursed))
    }
}

/// Held: drains a share of the foe's max HP each turn end.
#[derive(Clone, Debug)]
pub struct TurnEndDrain {
    pct: u32,
}

impl Effect for TurnEndDrain {
    fn name(&self) -> &'static str {
        "turn_end_drain"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.foe().is_fainted() {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.foe().max_hp(), self.pct).max(1);
        let (me, them) = (ctx.me(), ctx.them());
        let drained = ctx.deal_direct(them, amount, DamageCause::Effect);
        ctx.heal(me, drained);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

// ============================================================================
// Stages and uses
// ============================================================================

/// Held: every turn end one stat rises by `amount` and a different one drops by 1.
#[derive(Clone, Debug)]
pub struct Moody {
    amount: i8,
}

impl Effect for Moody {
    fn name(&self) -> &'static str {
        "moody"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let last = CORE_STATS.len() as u32 - 1;
        let up = ctx.range(0, last) as usize;
        let down = (up + 1 + ctx.range(0, last - 1) as usize) % CORE_STATS.len();
        let me = ctx.me();
        ctx.shift_stage(me, CORE_STATS[up], self.amount);
        ctx.shift_stage(me, CORE_STATS[down], -1);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Held: restores skill uses each turn end.
#[derive(Clone, Debug)]
pub struct RegenerateUses {
    amount: u8,
}

impl Effect for RegenerateUses {
    fn name(&self) -> &'static str {
        "regenerate_uses"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let restored = ctx.owner_mut().restore_uses(self.amount);
        if restored == 0 {
            return Applied::Idle;
        }
        let side = ctx.owner_side();
        ctx.notify(Notice::UsesChanged {
            side,
            delta: restored as i32,
        });
        Applied::Triggered
    }
}

// ============================================================================
// Sealing
// ============================================================================

/// Attached by taunt: the holder cannot use status skills.
#[derive(Clone, Debug)]
pub struct Taunted {
    turns: u32,
}

impl Taunted {
    const NAME: &'static str = "taunted";
}

impl Effect for Taunted {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck, Timing::TurnEnd]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.scratch.set_counter(Self::NAME, "turns", self.turns);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.timing == Timing::TurnEnd {
            return if tick_turns(ctx, Self::NAME) == 0 {
                Applied::Expired
            } else {
                Applied::Idle
            };
        }
        if ctx.category() != Some(SkillCategory::Status) {
            return Applied::Idle;
        }
        seal(ctx)
    }
}

#[derive(Clone, Debug)]
pub struct Taunt {
    turns: u32,
}

impl Effect for Taunt {
    fn name(&self) -> &'static str {
        "taunt"
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
        let them = ctx.them();
        attach_timer(ctx, them, Arc::new(Taunted { turns: self.turns }))
    }
}

/// Attached by disable: seals the holder's last used skill.
#[derive(Clone, Debug)]
pub struct Disabled {
    turns: u32,
}

impl Disabled {
    const NAME: &'static str = "disabled";
}

impl Effect for Disabled {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck, Timing::TurnEnd]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn on_attach(&self, owner: &mut Combatant) {
        let sealed = owner.last_skill.map_or(-1, |id| i64::from(id.0));
        owner.scratch.set_int(Self::NAME, "skill", sealed);
        owner.scratch.set_counter(Self::NAME, "turns", self.turns);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.timing == Timing::TurnEnd {
            return if tick_turns(ctx, Self::NAME) == 0 {
                Applied::Expired
            } else {
                Applied::Idle
            };
        }
        let sealed = ctx.owner().scratch.int(Self::NAME, "skill");
        let using = ctx.skill_id().map(|SkillId(id)| i64::from(id));
        if using != Some(sealed) {
            return Applied::Idle;
        }
        seal(ctx)
    }
}

#[derive(Clone, Debug)]
pub struct Disable {
    turns: u32,
}

impl Effect for Disable {
    fn name(&self) -> &'static str {
        "disable"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || ctx.foe().last_skill.is_none() {
            return Applied::Idle;
        }
        let them = ctx.them();
        attach_timer(ctx, them, Arc::new(Disabled { turns: self.turns }))
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(140, "perish", |a| {
        built(Perish {
            turns: a.count_or(0, 10, 3)?,
        })
    });
    r.register(141, "nightmare_aura", |a| {
        built(NightmareAura {
            pct: a.chance_or(0, 12)?,
        })
    });
    r.register(142, "bind", |a| {
        built(Bind {
            turns: a.count_or(0, 10, 4)?,
            pct: a.chance_or(1, 12)?,
        })
    });
    r.register(143, "curse", |_| built(Curse));
    r.register(144, "moody", |a| {
        built(Moody {
            amount: a.bounded_or(0, 1, 6, 2)? as i8,
        })
    });
    r.register(145, "taunt", |a| {
        built(Taunt {
            turns: a.count_or(0, 10, 3)?,
        })
    });
    r.register(146, "disable", |a| {
        built(Disable {
            turns: a.count_or(0, 10, 4)?,
        })
    });
    r.register(147, "turn_end_drain", |a| {
        built(TurnEndDrain {
            pct: a.chance_or(0, 12)?,
        })
    });
    r.register(148, "regenerate_uses", |a| {
        built(RegenerateUses {
            amount: a.count_or(0, 10, 1)? as u8,
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectPipeline;
    use crate::env::SkillData;
    use crate::state::Side;
    use crate::testing::{arena_state, arena_state_with_reserves, rules, tackle};

    #[test]
    fn perish_count_knocks_out_both_after_three_turn_ends() {
        let mut state = arena_state_with_reserves();
        let cfg = rules();
        let perish: Arc<dyn Effect> = Arc::new(Perish { turns: 3 });
        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&perish));
        for _ in 0..2 {
            EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        }
        assert!(!ctx.attacker.is_fainted());
        EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        assert!(ctx.attacker.is_fainted());
        assert!(ctx.defender.is_fainted());
    }

    #[test]
    fn bound_holder_takes_damage_and_is_released() {
        let mut state = arena_state();
        let cfg = rules();
        state.active_mut(Side::Away).attach(
            Arc::new(Bound { turns: 2, pct: 10 }),
            0,
            EffectLifetime::Volatile,
        );
        assert!(state.active(Side::Away).flags.contains(VolatileFlags::BOUND));

        let mut ctx = ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1);
        EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        EffectPipeline::dispatch(&mut ctx, Timing::TurnEnd, None);
        assert_eq!(ctx.defender.hp(), 80);
        assert!(!ctx.defender.flags.contains(VolatileFlags::BOUND));
        assert!(ctx.defender.effects().is_empty());
    }

    #[test]
    fn taunt_seals_status_skills_only() {
        let mut state = arena_state();
        let cfg = rules();
        state.active_mut(Side::Home).attach(
            Arc::new(Taunted { turns: 3 }),
            0,
            EffectLifetime::Volatile,
        );
        let growl = SkillData {
            category: SkillCategory::Status,
            power: 0,
            ..tackle()
        };

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, None);
        assert!(!ctx.flags.contains(AttackFlags::PREVENTED));

        ctx.skill = Some(growl);
        EffectPipeline::dispatch(&mut ctx, Timing::BeforeHitCheck, None);
        assert!(ctx.flags.contains(AttackFlags::PREVENTED));
    }

    #[test]
    fn disable_needs_a_last_skill() {
        let mut state = arena_state();
        let cfg = rules();
        let disable: Arc<dyn Effect> = Arc::new(Disable { turns: 2 });
        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        assert_eq!(disable.apply(&mut ctx), Applied::Idle);

        let sealed = tackle().id;
        ctx.defender.record_skill_use(sealed);
        assert_eq!(disable.apply(&mut ctx), Applied::Triggered);
        assert_eq!(ctx.defender.scratch.int("disabled", "skill"), i64::from(sealed.0));
    }
}
