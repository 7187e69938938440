//! Turn-order modifiers. All run before the speed check of the holder's action.

use super::built;
use crate::effect::{ActionContext, Applied, Effect, EffectRegistry, Role, Timing};
use crate::env::SkillCategory;
use crate::state::Element;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityWhen {
    Always,
    OwnerHpAtMost(u32),
    StatusSkill,
    FirstTurn,
    Element(Element),
}

#[derive(Clone, Debug)]
pub struct PriorityShift {
    name: &'static str,
    delta: i32,
    when: PriorityWhen,
}

impl Effect for PriorityShift {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeSpeedCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let applies = match self.when {
            PriorityWhen::Always => true,
            PriorityWhen::OwnerHpAtMost(pct) => ctx.owner().hp_percent() <= pct,
            PriorityWhen::StatusSkill => ctx.category() == Some(SkillCategory::Status),
            PriorityWhen::FirstTurn => ctx.turn <= 1,
            PriorityWhen::Element(element) => ctx.element() == Some(element),
        };
        if !applies {
            return Applied::Idle;
        }
        ctx.mods.priority_delta += self.delta;
        Applied::Triggered
    }
}

/// Acts before anything not also marked always-first, with `chance`.
#[derive(Clone, Debug)]
pub struct AlwaysFirst {
    name: &'static str,
    chance: u32,
}

impl Effect for AlwaysFirst {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeSpeedCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.roll(self.chance) {
            return Applied::Idle;
        }
        ctx.mods.always_first = true;
        if self.chance < 100 {
            ctx.triggered(self.name);
        }
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    r.register(60, "priority_boost", |a| {
        built(PriorityShift {
            name: "priority_boost",
            delta: a.bounded(0, -7, 7)?,
            when: PriorityWhen::Always,
        })
    });
    r.register(61, "always_first", |_| {
        built(AlwaysFirst {
            name: "always_first",
            chance: 100,
        })
    });
    r.register(62, "low_hp_priority", |a| {
        built(PriorityShift {
            name: "low_hp_priority",
            when: PriorityWhen::OwnerHpAtMost(a.chance(0)?),
            delta: a.bounded(1, -7, 7)?,
        })
    });
    r.register(63, "status_priority", |a| {
        built(PriorityShift {
            name: "status_priority",
            delta: a.bounded_or(0, -7, 7, 1)?,
            when: PriorityWhen::StatusSkill,
        })
    });
    r.register(64, "first_turn_priority", |a| {
        built(PriorityShift {
            name: "first_turn_priority",
            delta: a.bounded_or(0, -7, 7, 1)?,
            when: PriorityWhen::FirstTurn,
        })
    });
    r.register(65, "element_priority", |a| {
        built(PriorityShift {
            name: "element_priority",
            when: PriorityWhen::Element(a.element(0)?),
            delta: a.bounded_or(1, -7, 7, 1)?,
        })
    });
    r.register(66, "quick_start", |a| {
        built(AlwaysFirst {
            name: "quick_start",
            chance: a.chance(0)?,
        })
    });
}
