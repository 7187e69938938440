//! Skill mechanics that don't fit a family: charging, multi-hit, use drain
//! and HP exchange.

use super::{built, connected, pct_of};
use crate::effect::{
    ActionContext, Applied, AttackFlags, DamageCause, Effect, EffectRegistry, Notice,
    PreventReason, Role, Timing,
};
use crate::state::VolatileFlags;

fn prevent(ctx: &mut ActionContext<'_>, reason: PreventReason) {
    ctx.flags.insert(AttackFlags::PREVENTED);
    let side = ctx.owner_side();
    ctx.notify(Notice::Prevented { side, reason });
}

/// Skill effect: the first use only charges; the next use strikes.
#[derive(Clone, Debug)]
pub struct ChargeTurn;

impl Effect for ChargeTurn {
    fn name(&self) -> &'static str {
        "charge_turn"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let flags = &mut ctx.owner_mut().flags;
        if flags.contains(VolatileFlags::CHARGING) {
            flags.remove(VolatileFlags::CHARGING);
            return Applied::Idle;
        }
        flags.insert(VolatileFlags::CHARGING);
        prevent(ctx, PreventReason::Charging);
        Applied::Triggered
    }
}

/// Skill effect: the user must skip its next action after landing.
#[derive(Clone, Debug)]
pub struct Recharge;

impl Effect for Recharge {
    fn name(&self) -> &'static str {
        "recharge"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.landed() {
            return Applied::Idle;
        }
        ctx.owner_mut().flags.insert(VolatileFlags::RECHARGING);
        Applied::Triggered
    }
}

/// Skill effect: knocks out outright. Fails against higher-level targets;
/// accuracy grows with the level gap.
#[derive(Clone, Debug)]
pub struct OneHitKnockout {
    chance: u32,
}

impl Effect for OneHitKnockout {
    fn name(&self) -> &'static str {
        "one_hit_ko"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck, Timing::BeforeDamageCalc]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.timing == Timing::BeforeDamageCalc {
            ctx.mods.instant_kill = true;
            return Applied::Triggered;
        }
        let (own, foe) = (ctx.owner().level, ctx.foe().level);
        let chance = if own < foe {
            0
        } else {
            (self.chance + u32::from(own - foe)).min(100)
        };
        ctx.mods.hit_rate_override = Some(chance);
        Applied::Triggered
    }
}

/// Skill effect: strikes `min..=max` times; damage scales with the hit count.
#[derive(Clone, Debug)]
pub struct MultiHit {
    min: u32,
    max: u32,
}

impl Effect for MultiHit {
    fn name(&self) -> &'static str {
        "multi_hit"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc]
    }

    fn priority(&self) -> i32 {
        10
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let hits = ctx.range(self.min, self.max);
        if hits <= 1 {
            return Applied::Idle;
        }
        ctx.mods.scale_damage(hits * 100);
        Applied::Triggered
    }
}

/// Held: the owner takes the element of each skill it uses.
#[derive(Clone, Debug)]
pub struct Protean;

impl Effect for Protean {
    fn name(&self) -> &'static str {
        "protean"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn priority(&self) -> i32 {
        20
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let Some(element) = ctx.element() else {
            return Applied::Idle;
        };
        if ctx.owner().element == element {
            return Applied::Idle;
        }
        ctx.owner_mut().element = element;
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Skill effect: drains uses from the foe's last skill.
#[derive(Clone, Debug)]
pub struct Spite {
    amount: u8,
}

impl Effect for Spite {
    fn name(&self) -> &'static str {
        "spite"
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
        let Some(skill) = ctx.foe().last_skill else {
            return Applied::Idle;
        };
        let drained = ctx.foe_mut().drain_uses(skill, self.amount);
        if drained == 0 {
            return Applied::Idle;
        }
        let side = ctx.side_of(ctx.them());
        ctx.notify(Notice::UsesChanged {
            side,
            delta: -i32::from(drained),
        });
        Applied::Triggered
    }
}

/// Skill effect: restores the user's skill uses.
#[derive(Clone, Debug)]
pub struct RestoreUses {
    amount: u8,
}

impl Effect for RestoreUses {
    fn name(&self) -> &'static str {
        "restore_uses"
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

/// Skill effect: the foe cannot switch out while it stays on the field.
#[derive(Clone, Debug)]
pub struct MeanLook;

impl Effect for MeanLook {
    fn name(&self) -> &'static str {
        "mean_look"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !connected(ctx) || ctx.foe().flags.contains(VolatileFlags::BOUND) {
            return Applied::Idle;
        }
        ctx.foe_mut().flags.insert(VolatileFlags::BOUND);
        Applied::Triggered
    }
}

/// Skill effect: both combatants end on the average of their HP.
#[derive(Clone, Debug)]
pub struct PainSplit;

impl PainSplit {
    fn settle(ctx: &mut ActionContext<'_>, role: Role, target: u32) {
        let current = ctx.combatant(role).hp();
        if target < current {
            ctx.deal_direct(role, current - target, DamageCause::Effect);
        } else if target > current {
            ctx.combatant_mut(role).set_hp(target);
            let amount = ctx.combatant(role).hp() - current;
            let side = ctx.side_of(role);
            ctx.notify(Notice::Healed { side, amount });
        }
    }
}

impl Effect for PainSplit {
    fn name(&self) -> &'static str {
        "pain_split"
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
        let average = (ctx.owner().hp() + ctx.foe().hp()) / 2;
        let (me, them) = (ctx.me(), ctx.them());
        Self::settle(ctx, me, average);
        Self::settle(ctx, them, average);
        Applied::Triggered
    }
}

/// Held: on entry, the owner takes the foe's element.
#[derive(Clone, Debug)]
pub struct MimicElement;

impl Effect for MimicElement {
    fn name(&self) -> &'static str {
        "mimic_element"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BattleStart]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let element = ctx.foe().element;
        if ctx.owner().element == element {
            return Applied::Idle;
        }
        ctx.owner_mut().element = element;
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Skill effect: pays HP up front for extra power.
#[derive(Clone, Debug)]
pub struct PayHpPower {
    hp_pct: u32,
    power_pct: u32,
}

impl Effect for PayHpPower {
    fn name(&self) -> &'static str {
        "pay_hp_power"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let cost = pct_of(ctx.owner().max_hp(), self.hp_pct).max(1);
        if ctx.owner().hp() <= cost {
            return Applied::Idle;
        }
        let me = ctx.me();
        ctx.deal_direct(me, cost, DamageCause::Effect);
        ctx.scale_power(self.power_pct);
        Applied::Triggered
    }
}

/// Skill effect: fails if the user was hit earlier in the turn.
#[derive(Clone, Debug)]
pub struct FocusPunch;

impl Effect for FocusPunch {
    fn name(&self) -> &'static str {
        "focus_punch"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let turn = ctx.turn;
        let hit = ctx
            .owner()
            .last_hit
            .is_some_and(|hit| hit.turn == turn && hit.amount > 0);
        if !hit {
            return Applied::Idle;
        }
        prevent(ctx, PreventReason::Flinch);
        Applied::Triggered
    }
}

/// Held: the owner always moves after its opponent.
#[derive(Clone, Debug)]
pub struct Stall;

impl Effect for Stall {
    fn name(&self) -> &'static str {
        "stall"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeSpeedCheck]
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        ctx.mods.always_first = false;
        ctx.mods.priority_delta -= 100;
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(149, "charge_turn", |_| built(ChargeTurn));
    r.register(150, "recharge", |_| built(Recharge));
    r.register(151, "one_hit_ko", |a| {
        built(OneHitKnockout {
            chance: a.chance_or(0, 30)?,
        })
    });
    r.register(152, "multi_hit", |a| {
        let min = a.count_or(0, 10, 2)?;
        let max = a.count_or(1, 10, 5)?.max(min);
        built(MultiHit { min, max })
    });
    r.register(153, "protean", |_| built(Protean));
    r.register(154, "spite", |a| {
        built(Spite {
            amount: a.count_or(0, 99, 4)? as u8,
        })
    });
    r.register(155, "restore_uses", |a| {
        built(RestoreUses {
            amount: a.count_or(0, 99, 10)? as u8,
        })
    });
    r.register(156, "mean_look", |_| built(MeanLook));
    r.register(157, "pain_split", |_| built(PainSplit));
    r.register(158, "mimic_element", |_| built(MimicElement));
    r.register(159, "pay_hp_power", |a| {
        built(PayHpPower {
            hp_pct: a.bounded_or(0, 1, 99, 25)? as u32,
            power_pct: a.bounded_or(1, 0, 1000, 150)? as u32,
        })
    });
    r.register(160, "focus_punch", |_| built(FocusPunch));
    r.register(161, "stall", |_| built(Stall));
}
