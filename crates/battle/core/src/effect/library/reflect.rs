//! Damage returned to the attacker, recoil and faint-triggered effects.

use std::sync::Arc;

use super::{built, pct_of, took_hit, tick_turns};
use crate::effect::{
    ActionContext, Applied, AttackFlags, DamageCause, Effect, EffectRegistry, Notice, Role, Timing,
};
use crate::env::SkillCategory;
use crate::state::{Combatant, EffectLifetime, Guards};

/// Held: returns a share of damage taken to the attacker.
#[derive(Clone, Debug)]
pub struct ReflectDamage {
    pct: u32,
}

impl Effect for ReflectDamage {
    fn name(&self) -> &'static str {
        "reflect_damage"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !took_hit(ctx) {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.dealt, self.pct).max(1);
        let them = ctx.them();
        ctx.deal_direct(them, amount, DamageCause::Reflected);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Held: physical attackers lose a share of their own max HP.
#[derive(Clone, Debug)]
pub struct RoughSkin {
    pct: u32,
}

impl Effect for RoughSkin {
    fn name(&self) -> &'static str {
        "rough_skin"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !took_hit(ctx) || ctx.category() != Some(SkillCategory::Physical) {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.foe().max_hp(), self.pct).max(1);
        let them = ctx.them();
        ctx.deal_direct(them, amount, DamageCause::Reflected);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Skill effect: hits back for a multiple of the last hit of `category`
/// taken this turn. Deals nothing otherwise.
#[derive(Clone, Debug)]
pub struct Counter {
    category: SkillCategory,
    pct: u32,
}

impl Effect for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let taken = ctx
            .owner()
            .last_hit
            .filter(|hit| hit.turn == ctx.turn && hit.category == self.category)
            .map(|hit| hit.amount);
        match taken {
            Some(amount) if amount > 0 => {
                ctx.damage = pct_of(amount, self.pct);
                Applied::Triggered
            }
            _ => {
                ctx.damage = 0;
                Applied::Idle
            }
        }
    }
}

/// Skill effect: the user takes a share of the damage it dealt.
#[derive(Clone, Debug)]
pub struct Recoil {
    pct: u32,
}

impl Effect for Recoil {
    fn name(&self) -> &'static str {
        "recoil"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.dealt == 0 || ctx.owner().guards.contains(Guards::RECOIL) {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.dealt, self.pct).max(1);
        let me = ctx.me();
        ctx.deal_direct(me, amount, DamageCause::Recoil);
        Applied::Triggered
    }
}

/// Skill effect: missing costs the user a share of its max HP.
#[derive(Clone, Debug)]
pub struct CrashOnMiss {
    pct: u32,
}

impl Effect for CrashOnMiss {
    fn name(&self) -> &'static str {
        "crash_on_miss"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.flags.contains(AttackFlags::MISS) || ctx.owner().guards.contains(Guards::RECOIL) {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let me = ctx.me();
        ctx.deal_direct(me, amount, DamageCause::Recoil);
        Applied::Triggered
    }
}

/// Attached by destiny bond: fainting to an attack takes the attacker down too.
#[derive(Clone, Debug)]
pub struct BondMark;

impl BondMark {
    const NAME: &'static str = "bond_mark";
}

impl Effect for BondMark {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply, Timing::TurnEnd]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn wakes_fainted(&self) -> bool {
        true
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.scratch.set_counter(Self::NAME, "turns", 2);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.timing == Timing::TurnEnd {
            return if tick_turns(ctx, Self::NAME) == 0 {
                Applied::Expired
            } else {
                Applied::Idle
            };
        }
        if !took_hit(ctx) || !ctx.owner().is_fainted() {
            return Applied::Idle;
        }
        let hp = ctx.foe().hp();
        let them = ctx.them();
        ctx.deal_direct(them, hp, DamageCause::Effect);
        ctx.triggered("destiny_bond");
        Applied::Expired
    }
}

#[derive(Clone, Debug)]
pub struct DestinyBond;

impl Effect for DestinyBond {
    fn name(&self) -> &'static str {
        "destiny_bond"
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
        ctx.owner_mut().detach_named(BondMark::NAME);
        ctx.attach(me, Arc::new(BondMark), EffectLifetime::Volatile);
        Applied::Triggered
    }
}

/// Held, single use: comes back from fainting with a share of max HP.
#[derive(Clone, Debug)]
pub struct ReviveOnce {
    pct: u32,
}

impl Effect for ReviveOnce {
    fn name(&self) -> &'static str {
        "revive_once"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply, Timing::TurnEnd]
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn wakes_fainted(&self) -> bool {
        true
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.owner().is_fainted() {
            return Applied::Idle;
        }
        let hp = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let hp = ctx.owner_mut().revive(hp);
        let side = ctx.owner_side();
        ctx.notify(Notice::Revived { side, hp });
        ctx.triggered(self.name());
        Applied::Expired
    }
}

/// Skill effect: the user faints whether or not it connects.
#[derive(Clone, Debug)]
pub struct SelfDestruct;

impl Effect for SelfDestruct {
    fn name(&self) -> &'static str {
        "self_destruct"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterHitCheck, Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let missed = ctx.flags.contains(AttackFlags::MISS);
        let at_hit_check = ctx.timing == Timing::AfterHitCheck;
        if at_hit_check != missed {
            return Applied::Idle;
        }
        let hp = ctx.owner().hp();
        let me = ctx.me();
        ctx.deal_direct(me, hp, DamageCause::Effect);
        Applied::Triggered
    }
}

/// Held: may survive a knockout blow with 1 HP.
#[derive(Clone, Debug)]
pub struct LuckyEndure {
    chance: u32,
}

impl Effect for LuckyEndure {
    fn name(&self) -> &'static str {
        "lucky_endure"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -85
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let hp = ctx.owner().hp();
        if ctx.damage < hp || !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        ctx.damage = hp.saturating_sub(1);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(130, "reflect_damage", |a| {
        built(ReflectDamage {
            pct: a.percent(0)?,
        })
    });
    r.register(131, "counter", |a| {
        built(Counter {
            category: a.category(0)?,
            pct: a.bounded_or(1, 1, 1000, 200)? as u32,
        })
    });
    r.register(132, "rough_skin", |a| {
        built(RoughSkin {
            pct: a.chance_or(0, 12)?,
        })
    });
    r.register(133, "recoil", |a| {
        built(Recoil {
            pct: a.chance_or(0, 25)?,
        })
    });
    r.register(134, "crash_on_miss", |a| {
        built(CrashOnMiss {
            pct: a.chance_or(0, 50)?,
        })
    });
    r.register(135, "destiny_bond", |_| built(DestinyBond));
    r.register(136, "revive_once", |a| {
        built(ReviveOnce {
            pct: a.chance_or(0, 50)?,
        })
    });
    r.register(137, "self_destruct", |_| built(SelfDestruct));
    r.register(138, "recoil_guard", |_| {
        built(super::stages::GuardGrant::new("recoil_guard", Guards::RECOIL))
    });
    r.register(139, "lucky_endure", |a| {
        built(LuckyEndure {
            chance: a.chance(0)?,
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectPipeline;
    use crate::state::{LastHit, Side};
    use crate::testing::{arena_state, rules, tackle};

    #[test]
    fn recoil_respects_guard() {
        let mut state = arena_state();
        let cfg = rules();
        let recoil: Arc<dyn Effect> = Arc::new(Recoil { pct: 50 });
        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        ctx.dealt = 20;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&recoil));
        assert_eq!(ctx.attacker.hp(), 90);

        ctx.attacker.guards.insert(Guards::RECOIL);
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, Some(&recoil));
        assert_eq!(ctx.attacker.hp(), 90);
    }

    #[test]
    fn counter_doubles_same_turn_hit() {
        let mut state = arena_state();
        let cfg = rules();
        state.active_mut(Side::Home).last_hit = Some(LastHit {
            amount: 30,
            category: SkillCategory::Physical,
            turn: 3,
        });
        let counter: Arc<dyn Effect> = Arc::new(Counter {
            category: SkillCategory::Physical,
            pct: 200,
        });

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 3).with_skill(tackle());
        ctx.damage = 5;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageCalc, Some(&counter));
        assert_eq!(ctx.damage, 60);

        ctx.turn = 4;
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageCalc, Some(&counter));
        assert_eq!(ctx.damage, 0);
    }

    #[test]
    fn revive_once_wakes_a_fainted_owner() {
        let mut state = arena_state();
        let cfg = rules();
        state.active_mut(Side::Away).attach(
            Arc::new(ReviveOnce { pct: 50 }),
            0,
            EffectLifetime::Battle,
        );
        state.active_mut(Side::Away).take_damage(u32::MAX);

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        let summary = EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, None);
        assert_eq!(summary.expired, 1);
        assert_eq!(ctx.defender.hp(), 50);
        assert!(ctx.log().contains(&Notice::Revived {
            side: Side::Away,
            hp: 50
        }));
    }

    #[test]
    fn destiny_bond_takes_the_attacker_down() {
        let mut state = arena_state();
        let cfg = rules();
        state
            .active_mut(Side::Away)
            .attach(Arc::new(BondMark), 0, EffectLifetime::Volatile);

        let mut ctx =
            ActionContext::new(state.arena(Side::Home), Side::Home, &cfg, 1).with_skill(tackle());
        ctx.dealt = ctx.defender.take_damage(u32::MAX);
        EffectPipeline::dispatch(&mut ctx, Timing::AfterDamageApply, None);
        assert!(ctx.attacker.is_fainted());
    }
}
