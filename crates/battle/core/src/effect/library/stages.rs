//! Stat-stage effects.

use super::{CORE_STATS, built, connected, took_hit};
use crate::effect::{
    ActionContext, Applied, AttackFlags, Effect, EffectRegistry, Notice, Role, Timing,
};
use crate::env::SkillCategory;
use crate::state::{Combatant, Guards, StatKind, StatStages};

/// When a stage shift fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftTrigger {
    /// After the owner's skill connects.
    OnUse,
    /// When the owner is damaged.
    WhenHit,
    /// When the owner is struck by a physical attack.
    WhenStruck,
    /// When the owner's attack knocks out the foe.
    OnKnockout,
    /// When the owner's attack misses.
    OnMiss,
    /// The first time the owner takes the field.
    OnEntry,
    TurnStartAtFullHp,
    TurnEnd,
}

impl ShiftTrigger {
    fn timings(self) -> &'static [Timing] {
        match self {
            ShiftTrigger::OnUse
            | ShiftTrigger::WhenHit
            | ShiftTrigger::WhenStruck
            | ShiftTrigger::OnKnockout => &[Timing::AfterDamageApply],
            ShiftTrigger::OnMiss => &[Timing::AfterHitCheck],
            ShiftTrigger::OnEntry => &[Timing::BattleStart],
            ShiftTrigger::TurnStartAtFullHp => &[Timing::TurnStart],
            ShiftTrigger::TurnEnd => &[Timing::TurnEnd],
        }
    }

    fn role(self) -> Option<Role> {
        match self {
            ShiftTrigger::OnUse | ShiftTrigger::OnKnockout | ShiftTrigger::OnMiss => {
                Some(Role::Attacker)
            }
            ShiftTrigger::WhenHit | ShiftTrigger::WhenStruck => Some(Role::Defender),
            _ => None,
        }
    }

    fn fires(self, ctx: &ActionContext<'_>) -> bool {
        match self {
            ShiftTrigger::OnUse => connected(ctx),
            ShiftTrigger::WhenHit => took_hit(ctx),
            ShiftTrigger::WhenStruck => {
                took_hit(ctx) && ctx.category() == Some(SkillCategory::Physical)
            }
            ShiftTrigger::OnKnockout => ctx.dealt > 0 && ctx.foe().is_fainted(),
            ShiftTrigger::OnMiss => ctx.flags.contains(AttackFlags::MISS),
            ShiftTrigger::TurnStartAtFullHp => ctx.owner().is_full_hp(),
            ShiftTrigger::OnEntry | ShiftTrigger::TurnEnd => true,
        }
    }
}

/// Shifts one or more stats of the owner (`on_foe == false`) or the foe.
#[derive(Clone, Debug)]
pub struct StageShift {
    name: &'static str,
    trigger: ShiftTrigger,
    stats: &'static [StatKind],
    single: Option<StatKind>,
    delta: i8,
    on_foe: bool,
    chance: u32,
}

impl StageShift {
    fn one(
        name: &'static str,
        trigger: ShiftTrigger,
        stat: StatKind,
        delta: i8,
        on_foe: bool,
        chance: u32,
    ) -> Self {
        Self {
            name,
            trigger,
            stats: &[],
            single: Some(stat),
            delta,
            on_foe,
            chance,
        }
    }

    fn all(name: &'static str, delta: i8, on_foe: bool, chance: u32) -> Self {
        Self {
            name,
            trigger: ShiftTrigger::OnUse,
            stats: &CORE_STATS,
            single: None,
            delta,
            on_foe,
            chance,
        }
    }
}

impl Effect for StageShift {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        self.trigger.timings()
    }

    fn role(&self) -> Option<Role> {
        self.trigger.role()
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !self.trigger.fires(ctx) || !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        let target = if self.on_foe { ctx.them() } else { ctx.me() };
        let mut changed = false;
        for stat in self.single.iter().chain(self.stats.iter()) {
            changed |= ctx.shift_stage(target, *stat, self.delta) != 0;
        }
        if !changed {
            return Applied::Idle;
        }
        Applied::Triggered
    }
}

/// Whole-stage-table manipulations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageTable {
    /// Both combatants back to neutral.
    ResetBoth,
    ClearFoeBoosts,
    ClearOwnDrops,
    InvertFoe,
    CopyFoe,
    Swap,
}

#[derive(Clone, Debug)]
pub struct StageRewrite {
    name: &'static str,
    op: StageTable,
}

impl StageRewrite {
    fn rewrite(c: &mut Combatant, f: impl FnOnce(&mut StatStages)) -> bool {
        let before = *c.stages();
        f(c.stages_mut());
        before != *c.stages()
    }
}

impl Effect for StageRewrite {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        match self.op {
            StageTable::ClearOwnDrops => &[Timing::AfterDamageApply, Timing::TurnEnd],
            _ => &[Timing::AfterDamageApply],
        }
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let in_action = ctx.timing == Timing::AfterDamageApply;
        if in_action && (!ctx.owner_is_attacker() || !connected(ctx)) {
            return Applied::Idle;
        }
        let (me, them) = (ctx.me(), ctx.them());
        let changed = match self.op {
            StageTable::ResetBoth => {
                let a = Self::rewrite(ctx.combatant_mut(me), StatStages::reset);
                let b = Self::rewrite(ctx.combatant_mut(them), StatStages::reset);
                if a || b {
                    for role in [me, them] {
                        let side = ctx.side_of(role);
                        ctx.notify(Notice::StagesReset { side });
                    }
                }
                a || b
            }
            StageTable::ClearFoeBoosts => {
                Self::rewrite(ctx.foe_mut(), StatStages::clear_positive)
            }
            StageTable::ClearOwnDrops => {
                Self::rewrite(ctx.owner_mut(), StatStages::clear_negative)
            }
            StageTable::InvertFoe => {
                if ctx.foe().guards.contains(Guards::STAGE_DROPS) {
                    false
                } else {
                    Self::rewrite(ctx.foe_mut(), StatStages::invert)
                }
            }
            StageTable::CopyFoe => {
                let copied = *ctx.foe().stages();
                Self::rewrite(ctx.owner_mut(), |s| *s = copied)
            }
            StageTable::Swap => {
                let mine = *ctx.owner().stages();
                let theirs = *ctx.foe().stages();
                *ctx.owner_mut().stages_mut() = theirs;
                *ctx.foe_mut().stages_mut() = mine;
                mine != theirs
            }
        };
        if !changed {
            return Applied::Idle;
        }
        ctx.triggered(self.name);
        Applied::Triggered
    }
}

/// Persistent guard bits set when attached.
#[derive(Clone, Debug)]
pub struct GuardGrant {
    name: &'static str,
    guards: Guards,
}

impl Effect for GuardGrant {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.guards.insert(self.guards);
    }

    fn apply(&self, _ctx: &mut ActionContext<'_>) -> Applied {
        Applied::Idle
    }
}

impl GuardGrant {
    pub const fn new(name: &'static str, guards: Guards) -> Self {
        Self { name, guards }
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    use ShiftTrigger::*;

    r.register(70, "raise_own_stat", |a| {
        built(StageShift::one(
            "raise_own_stat",
            OnUse,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            a.chance_or(2, 100)?,
        ))
    });
    r.register(71, "lower_foe_stat", |a| {
        built(StageShift::one(
            "lower_foe_stat",
            OnUse,
            a.stat(0)?,
            -a.stage_amount(1)?,
            true,
            a.chance_or(2, 100)?,
        ))
    });
    r.register(72, "lower_own_stat", |a| {
        built(StageShift::one(
            "lower_own_stat",
            OnUse,
            a.stat(0)?,
            -a.stage_amount(1)?,
            false,
            100,
        ))
    });
    r.register(73, "raise_all_own", |a| {
        built(StageShift::all(
            "raise_all_own",
            a.stage_amount(0)?,
            false,
            a.chance_or(1, 100)?,
        ))
    });
    r.register(74, "lower_all_foe", |a| {
        built(StageShift::all(
            "lower_all_foe",
            -a.stage_amount(0)?,
            true,
            a.chance_or(1, 100)?,
        ))
    });
    r.register(75, "reset_all_stages", |_| {
        built(StageRewrite {
            name: "reset_all_stages",
            op: StageTable::ResetBoth,
        })
    });
    r.register(76, "clear_foe_boosts", |_| {
        built(StageRewrite {
            name: "clear_foe_boosts",
            op: StageTable::ClearFoeBoosts,
        })
    });
    r.register(77, "clear_own_drops", |_| {
        built(StageRewrite {
            name: "clear_own_drops",
            op: StageTable::ClearOwnDrops,
        })
    });
    r.register(78, "invert_foe_stages", |_| {
        built(StageRewrite {
            name: "invert_foe_stages",
            op: StageTable::InvertFoe,
        })
    });
    r.register(79, "copy_foe_stages", |_| {
        built(StageRewrite {
            name: "copy_foe_stages",
            op: StageTable::CopyFoe,
        })
    });
    r.register(80, "swap_stages", |_| {
        built(StageRewrite {
            name: "swap_stages",
            op: StageTable::Swap,
        })
    });
    r.register(81, "stage_drop_immunity", |_| {
        built(GuardGrant::new("stage_drop_immunity", Guards::STAGE_DROPS))
    });
    r.register(82, "raise_when_hit", |a| {
        built(StageShift::one(
            "raise_when_hit",
            WhenHit,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            a.chance_or(2, 100)?,
        ))
    });
    r.register(83, "raise_on_knockout", |a| {
        built(StageShift::one(
            "raise_on_knockout",
            OnKnockout,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            100,
        ))
    });
    r.register(84, "intimidate", |a| {
        built(StageShift::one(
            "intimidate",
            OnEntry,
            a.stat(0)?,
            -a.stage_amount(1)?,
            true,
            100,
        ))
    });
    r.register(85, "entry_boost", |a| {
        built(StageShift::one(
            "entry_boost",
            OnEntry,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            100,
        ))
    });
    r.register(86, "turn_end_raise", |a| {
        built(StageShift::one(
            "turn_end_raise",
            TurnEnd,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            a.chance_or(2, 100)?,
        ))
    });
    r.register(87, "lower_striker", |a| {
        built(StageShift::one(
            "lower_striker",
            WhenStruck,
            a.stat(0)?,
            -a.stage_amount(1)?,
            true,
            a.chance_or(2, 100)?,
        ))
    });
    r.register(88, "raise_after_miss", |a| {
        built(StageShift::one(
            "raise_after_miss",
            OnMiss,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            100,
        ))
    });
    r.register(89, "full_hp_focus", |a| {
        built(StageShift::one(
            "full_hp_focus",
            TurnStartAtFullHp,
            a.stat(0)?,
            a.stage_amount(1)?,
            false,
            100,
        ))
    });
}
