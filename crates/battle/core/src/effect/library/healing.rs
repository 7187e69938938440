//! HP recovery.

use std::sync::Arc;

use super::{built, connected, pct_of, tick_turns};
use crate::effect::{ActionContext, Applied, Effect, EffectRegistry, Notice, Role, Timing};
use crate::state::{Combatant, EffectLifetime, Element, VolatileFlags};

/// What a heal is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealBase {
    MaxHp,
    MissingHp,
    /// Damage dealt by the current action.
    Dealt,
}

/// Heals the user by a share of `base` after its skill resolves.
#[derive(Clone, Debug)]
pub struct SkillHeal {
    name: &'static str,
    base: HealBase,
    pct: u32,
}

impl Effect for SkillHeal {
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
        if !connected(ctx) {
            return Applied::Idle;
        }
        let owner = ctx.owner();
        let amount = match self.base {
            HealBase::MaxHp => pct_of(owner.max_hp(), self.pct),
            HealBase::MissingHp => pct_of(owner.missing_hp(), self.pct),
            HealBase::Dealt => pct_of(ctx.dealt, self.pct),
        };
        if amount == 0 {
            return Applied::Idle;
        }
        let me = ctx.me();
        if ctx.heal(me, amount) > 0 {
            Applied::Triggered
        } else {
            Applied::Idle
        }
    }
}

/// Held: recovers a share of max HP each turn end.
#[derive(Clone, Debug)]
pub struct TurnEndHeal {
    pct: u32,
}

impl Effect for TurnEndHeal {
    fn name(&self) -> &'static str {
        "turn_end_heal"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.owner().is_full_hp() {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let me = ctx.me();
        ctx.heal(me, amount);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Held, single use: heals once HP drops to `threshold` percent or below.
#[derive(Clone, Debug)]
pub struct EmergencyHeal {
    threshold: u32,
    pct: u32,
}

impl Effect for EmergencyHeal {
    fn name(&self) -> &'static str {
        "emergency_heal"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply, Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let owner = ctx.owner();
        if owner.is_fainted() || owner.hp_percent() > self.threshold {
            return Applied::Idle;
        }
        let amount = pct_of(owner.max_hp(), self.pct).max(1);
        let me = ctx.me();
        if ctx.heal(me, amount) == 0 {
            return Applied::Idle;
        }
        ctx.triggered(self.name());
        Applied::Expired
    }
}

/// Held: heals after knocking out the foe.
#[derive(Clone, Debug)]
pub struct HealOnKnockout {
    pct: u32,
}

impl Effect for HealOnKnockout {
    fn name(&self) -> &'static str {
        "heal_on_ko"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.dealt == 0 || !ctx.foe().is_fainted() {
            return Applied::Idle;
        }
        let amount = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let me = ctx.me();
        ctx.heal(me, amount);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Attached to the target by heal block.
#[derive(Clone, Debug)]
pub struct HealBlocked {
    turns: u32,
}

impl HealBlocked {
    const NAME: &'static str = "heal_blocked";
}

impl Effect for HealBlocked {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn on_attach(&self, owner: &mut Combatant) {
        owner.flags.insert(VolatileFlags::HEAL_BLOCKED);
        owner.scratch.set_counter(Self::NAME, "turns", self.turns);
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if tick_turns(ctx, Self::NAME) > 0 {
            return Applied::Idle;
        }
        ctx.owner_mut().flags.remove(VolatileFlags::HEAL_BLOCKED);
        Applied::Expired
    }
}

#[derive(Clone, Debug)]
pub struct HealBlock {
    turns: u32,
}

impl Effect for HealBlock {
    fn name(&self) -> &'static str {
        "heal_block"
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
        let effect = Arc::new(HealBlocked { turns: self.turns });
        match ctx.attach_unique(them, effect, EffectLifetime::Volatile) {
            Some(_) => Applied::Triggered,
            None => Applied::Idle,
        }
    }
}

/// Held: attacks of `element` heal instead of damaging.
#[derive(Clone, Debug)]
pub struct AbsorbElement {
    element: Element,
    pct: u32,
}

impl Effect for AbsorbElement {
    fn name(&self) -> &'static str {
        "absorb_element"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -50
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.is_damaging() || ctx.element() != Some(self.element) {
            return Applied::Idle;
        }
        ctx.damage = 0;
        let amount = pct_of(ctx.owner().max_hp(), self.pct);
        let me = ctx.me();
        ctx.heal(me, amount);
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// Pending wish: heals whoever holds the field at the end of next turn.
#[derive(Clone, Debug)]
pub struct WishPending {
    pct: u32,
}

impl WishPending {
    const NAME: &'static str = "wish_pending";
}

impl Effect for WishPending {
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
        let amount = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        let me = ctx.me();
        ctx.heal(me, amount);
        Applied::Expired
    }
}

#[derive(Clone, Debug)]
pub struct Wish {
    pct: u32,
}

impl Effect for Wish {
    fn name(&self) -> &'static str {
        "wish"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageApply]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.flags.intersects(crate::effect::AttackFlags::PREVENTED) {
            return Applied::Idle;
        }
        let me = ctx.me();
        let pending = Arc::new(WishPending { pct: self.pct });
        match ctx.attach_unique(me, pending, EffectLifetime::Battle) {
            Some(_) => Applied::Triggered,
            None => Applied::Idle,
        }
    }
}

/// Held, single use: restores skill uses once any skill runs dry.
#[derive(Clone, Debug)]
pub struct UseBerry {
    amount: u8,
}

impl Effect for UseBerry {
    fn name(&self) -> &'static str {
        "leppa"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::TurnEnd]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let dry = ctx.owner().skills().iter().any(|slot| slot.uses == 0);
        if !dry {
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
        ctx.triggered(self.name());
        Applied::Expired
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(105, "heal_percent", |a| {
        built(SkillHeal {
            name: "heal_percent",
            base: HealBase::MaxHp,
            pct: a.chance_or(0, 50)?,
        })
    });
    r.register(106, "drain", |a| {
        built(SkillHeal {
            name: "drain",
            base: HealBase::Dealt,
            pct: a.chance_or(0, 50)?,
        })
    });
    r.register(107, "turn_end_heal", |a| {
        built(TurnEndHeal {
            pct: a.chance_or(0, 6)?,
        })
    });
    r.register(108, "emergency_heal", |a| {
        built(EmergencyHeal {
            threshold: a.chance_or(0, 50)?,
            pct: a.chance_or(1, 25)?,
        })
    });
    r.register(109, "heal_on_ko", |a| {
        built(HealOnKnockout {
            pct: a.chance_or(0, 25)?,
        })
    });
    r.register(110, "heal_block", |a| {
        built(HealBlock {
            turns: a.count_or(0, 10, 5)?,
        })
    });
    r.register(111, "absorb_element", |a| {
        built(AbsorbElement {
            element: a.element(0)?,
            pct: a.chance_or(1, 25)?,
        })
    });
    r.register(112, "wish", |a| {
        built(Wish {
            pct: a.chance_or(0, 50)?,
        })
    });
    r.register(113, "leppa", |a| {
        built(UseBerry {
            amount: a.count_or(0, 99, 10)? as u8,
        })
    });
    r.register(114, "heal_missing", |a| {
        built(SkillHeal {
            name: "heal_missing",
            base: HealBase::MissingHp,
            pct: a.chance_or(0, 50)?,
        })
    });
}
