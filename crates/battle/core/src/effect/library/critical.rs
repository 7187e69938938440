//! Critical-hit modifiers.

use super::{built, pct_of};
use crate::effect::{ActionContext, Applied, Effect, EffectRegistry, Role, Timing};
use crate::state::StatKind;

/// Adds to the crit rate, optionally only against weakened or ailing foes.
#[derive(Clone, Debug)]
pub struct CritRate {
    name: &'static str,
    bp: i32,
    foe_hp_at_most: Option<u32>,
}

impl Effect for CritRate {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeCritCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if let Some(limit) = self.foe_hp_at_most
            && ctx.foe().hp_percent() > limit
        {
            return Applied::Idle;
        }
        ctx.mods.crit_rate_delta += self.bp;
        Applied::Triggered
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CritForce {
    Always,
    FoeAiling,
    Never,
}

/// Forces the crit roll. Immunity runs last so it wins over forced crits.
#[derive(Clone, Debug)]
pub struct CritOverride {
    name: &'static str,
    force: CritForce,
}

impl Effect for CritOverride {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeCritCheck]
    }

    fn priority(&self) -> i32 {
        match self.force {
            CritForce::Never => -100,
            _ => 0,
        }
    }

    fn role(&self) -> Option<Role> {
        match self.force {
            CritForce::Never => Some(Role::Defender),
            _ => Some(Role::Attacker),
        }
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let value = match self.force {
            CritForce::Always => true,
            CritForce::FoeAiling if ctx.foe().ailment().is_some() => true,
            CritForce::FoeAiling => return Applied::Idle,
            CritForce::Never => false,
        };
        ctx.mods.crit_override = Some(value);
        Applied::Triggered
    }
}

/// After landing a crit, the next crit is more likely.
#[derive(Clone, Debug)]
pub struct CritStreak {
    bp: i32,
}

impl CritStreak {
    const NAME: &'static str = "crit_streak";
}

impl Effect for CritStreak {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeCritCheck, Timing::AfterCritCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.timing == Timing::AfterCritCheck {
            let crit = ctx.is_crit();
            ctx.owner_mut().scratch.set_flag(Self::NAME, "hot", crit);
            return Applied::Idle;
        }
        if !ctx.owner().scratch.flag(Self::NAME, "hot") {
            return Applied::Idle;
        }
        ctx.mods.crit_rate_delta += self.bp;
        Applied::Triggered
    }
}

/// Heals the attacker for a share of damage dealt by a crit.
#[derive(Clone, Debug)]
pub struct CritHeal {
    pct: u32,
}

impl Effect for CritHeal {
    fn name(&self) -> &'static str {
        "crit_heal"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.is_crit() || ctx.dealt == 0 {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.dealt, self.pct).max(1);
        let me = ctx.me();
        if ctx.heal(me, amount) == 0 {
            return Applied::Idle;
        }
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Defender-held: taking a crit maximizes attack.
#[derive(Clone, Debug)]
pub struct CritAnger;

impl Effect for CritAnger {
    fn name(&self) -> &'static str {
        "crit_anger"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.is_crit() || ctx.dealt == 0 {
            return Applied::Idle;
        }
        let me = ctx.me();
        if ctx.shift_stage(me, StatKind::Attack, 12) == 0 {
            return Applied::Idle;
        }
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(50, "crit_rate_boost", |a| {
        built(CritRate {
            name: "crit_rate_boost",
            bp: a.bounded(0, 1, 100)? * 100,
            foe_hp_at_most: None,
        })
    });
    r.register(51, "guaranteed_crit", |_| {
        built(CritOverride {
            name: "guaranteed_crit",
            force: CritForce::Always,
        })
    });
    r.register(52, "crit_immunity", |_| {
        built(CritOverride {
            name: "crit_immunity",
            force: CritForce::Never,
        })
    });
    r.register(53, "crit_vs_ailing", |_| {
        built(CritOverride {
            name: "crit_vs_ailing",
            force: CritForce::FoeAiling,
        })
    });
    r.register(54, "crit_streak", |a| {
        built(CritStreak {
            bp: a.bounded(0, 1, 100)? * 100,
        })
    });
    r.register(55, "crit_heal", |a| built(CritHeal { pct: a.percent(0)? }));
    r.register(56, "crit_anger", |_| built(CritAnger));
    r.register(57, "crit_vs_low_hp", |a| {
        built(CritRate {
            name: "crit_vs_low_hp",
            foe_hp_at_most: Some(a.chance(0)?),
            bp: a.bounded(1, 1, 100)? * 100,
        })
    });
}
