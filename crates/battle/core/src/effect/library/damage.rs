//! Damage and power modifiers.

use super::{built, pct_of};
use crate::effect::{ActionContext, Applied, AttackFlags, Effect, EffectRegistry, Role, Timing};
use crate::env::SkillCategory;
use crate::state::{Ailment, Element};

/// Condition under which a damage modifier applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Always,
    Category(SkillCategory),
    Element(Element),
    /// Skill element matches the owner's element.
    SameElement,
    OwnerHpAtMost(u32),
    OwnerFullHp,
    OwnerAiling,
    FoeHpAtMost(u32),
    FoeAiling,
    FoeAilment(Ailment),
    SuperEffective,
    NotVeryEffective,
    Crit,
    MovedFirst,
    MovedLast,
    Chance(u32),
}

impl Gate {
    pub fn admits(self, ctx: &mut ActionContext<'_>) -> bool {
        match self {
            Gate::Always => true,
            Gate::Category(category) => ctx.category() == Some(category),
            Gate::Element(element) => ctx.element() == Some(element),
            Gate::SameElement => ctx.element() == Some(ctx.owner().element),
            Gate::OwnerHpAtMost(pct) => ctx.owner().hp_percent() <= pct,
            Gate::OwnerFullHp => ctx.owner().is_full_hp(),
            Gate::OwnerAiling => ctx.owner().ailment().is_some(),
            Gate::FoeHpAtMost(pct) => ctx.foe().hp_percent() <= pct,
            Gate::FoeAiling => ctx.foe().ailment().is_some(),
            Gate::FoeAilment(kind) => ctx.foe().has_ailment(kind),
            Gate::SuperEffective => ctx.effectiveness > 100,
            Gate::NotVeryEffective => ctx.effectiveness < 100,
            Gate::Crit => ctx.is_crit(),
            Gate::MovedFirst => ctx.moved_first,
            Gate::MovedLast => !ctx.moved_first,
            Gate::Chance(pct) => ctx.roll(pct),
        }
    }
}

/// Compounds the damage multiplier when a gate admits.
///
/// Attacker-side scales are boosts, defender-side scales are reductions.
#[derive(Clone, Debug)]
pub struct DamageScale {
    name: &'static str,
    role: Role,
    gate: Gate,
    pct: u32,
}

impl DamageScale {
    pub fn boost(name: &'static str, gate: Gate, bonus: u32) -> Self {
        Self {
            name,
            role: Role::Attacker,
            gate,
            pct: 100 + bonus,
        }
    }

    pub fn reduction(name: &'static str, gate: Gate, cut: u32) -> Self {
        Self {
            name,
            role: Role::Defender,
            gate,
            pct: 100 - cut.min(100),
        }
    }
}

impl Effect for DamageScale {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc]
    }

    fn role(&self) -> Option<Role> {
        Some(self.role)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if !ctx.is_damaging() || !self.gate.admits(ctx) {
            return Applied::Idle;
        }
        ctx.mods.scale_damage(self.pct);
        ctx.triggered(self.name);
        Applied::Triggered
    }
}

/// Adds (or subtracts) a flat amount to the multiplied result.
#[derive(Clone, Debug)]
pub struct FlatDamage {
    name: &'static str,
    role: Role,
    amount: i32,
}

impl Effect for FlatDamage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -10
    }

    fn role(&self) -> Option<Role> {
        Some(self.role)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.damage == 0 {
            return Applied::Idle;
        }
        ctx.damage = (ctx.damage as i64 + self.amount as i64).max(1) as u32;
        Applied::Triggered
    }
}

/// Raises damage to at least `amount`.
#[derive(Clone, Debug)]
pub struct MinimumDamage {
    amount: u32,
}

impl Effect for MinimumDamage {
    fn name(&self) -> &'static str {
        "minimum_damage"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -20
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if ctx.damage == 0 || ctx.damage >= self.amount {
            return Applied::Idle;
        }
        ctx.damage = self.amount;
        Applied::Triggered
    }
}

/// Caps incoming damage at a share of the owner's max HP.
#[derive(Clone, Debug)]
pub struct DamageCap {
    pct: u32,
}

impl Effect for DamageCap {
    fn name(&self) -> &'static str {
        "damage_cap"
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::AfterDamageCalc]
    }

    fn priority(&self) -> i32 {
        -80
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Defender)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let cap = pct_of(ctx.owner().max_hp(), self.pct).max(1);
        if ctx.damage <= cap {
            return Applied::Idle;
        }
        ctx.damage = cap;
        ctx.triggered(self.name());
        Applied::Triggered
    }
}

/// How a fixed-damage skill computes its damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixedRule {
    Amount(u32),
    /// Equal to the user's level.
    Level,
    /// A share of the target's current HP.
    FoeHpShare(u32),
}

/// Replaces the formula result outright. Runs after every other modifier.
#[derive(Clone, Debug)]
pub struct FixedDamage {
    name: &'static str,
    rule: FixedRule,
}

impl Effect for FixedDamage {
    fn name(&self) -> &'static str {
        self.name
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
        if ctx.effectiveness == 0 {
            return Applied::Idle;
        }
        ctx.damage = match self.rule {
            FixedRule::Amount(amount) => amount,
            FixedRule::Level => ctx.owner().level as u32,
            FixedRule::FoeHpShare(pct) => pct_of(ctx.foe().hp(), pct).max(1),
        };
        Applied::Triggered
    }
}

/// How a power modifier derives the skill's power.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerRule {
    /// `+step` power for each positive stage the user holds.
    StoredPower { step: u32 },
    /// Stronger the lower the user's HP.
    Reversal,
    /// Stronger the healthier the target.
    Crush,
    /// Flat percentage.
    Scale(u32),
    Random { min: u32, max: u32 },
}

#[derive(Clone, Debug)]
pub struct PowerShift {
    name: &'static str,
    rule: PowerRule,
}

impl Effect for PowerShift {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let base = ctx.skill.as_ref().map_or(0, |s| s.power);
        let power = match self.rule {
            PowerRule::StoredPower { step } => {
                base + step * ctx.owner().stages().positive_total()
            }
            PowerRule::Reversal => match ctx.owner().hp_percent() {
                0..=4 => 200,
                5..=10 => 150,
                11..=20 => 100,
                21..=35 => 80,
                36..=68 => 40,
                _ => 20,
            },
            PowerRule::Crush => (120 * ctx.foe().hp_percent() / 100).max(1),
            PowerRule::Scale(pct) => pct_of(base, pct),
            PowerRule::Random { min, max } => ctx.range(min, max),
        };
        ctx.set_power(power);
        Applied::Triggered
    }
}

/// Power grows with consecutive uses of the same skill.
#[derive(Clone, Debug)]
pub struct RepeatPower {
    step_pct: u32,
    max_stacks: u32,
}

impl RepeatPower {
    const NAME: &'static str = "repeat_power";
}

impl Effect for RepeatPower {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc, Timing::AfterHitCheck]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        let skill = ctx.skill_id().map_or(0, |id| id.0 as i64);
        let timing = ctx.timing;
        let missed = ctx.flags.contains(AttackFlags::MISS);
        let scratch = &mut ctx.owner_mut().scratch;
        if timing == Timing::AfterHitCheck {
            if missed || scratch.int(Self::NAME, "skill") != skill {
                scratch.set_counter(Self::NAME, "stacks", 0);
            }
            scratch.set_int(Self::NAME, "skill", skill);
            return Applied::Idle;
        }

        let stacks = scratch.counter(Self::NAME, "stacks");
        scratch.set_counter(Self::NAME, "stacks", (stacks + 1).min(self.max_stacks));
        if stacks == 0 {
            return Applied::Idle;
        }
        ctx.scale_power(100 + self.step_pct * stacks);
        Applied::Triggered
    }
}

/// Power grows with every damaging hit the owner has taken.
#[derive(Clone, Debug)]
pub struct RagePower {
    per_hit_pct: u32,
}

impl RagePower {
    const NAME: &'static str = "rage_power";
}

impl Effect for RagePower {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc, Timing::AfterDamageApply]
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        match (ctx.timing, ctx.owner_is_attacker()) {
            (Timing::AfterDamageApply, false) if ctx.dealt > 0 => {
                ctx.owner_mut().scratch.bump(Self::NAME, "hits");
                Applied::Idle
            }
            (Timing::BeforeDamageCalc, true) => {
                let hits = ctx.owner().scratch.counter(Self::NAME, "hits");
                if hits == 0 {
                    return Applied::Idle;
                }
                ctx.scale_power(100 + self.per_hit_pct * hits.min(10));
                ctx.triggered(Self::NAME);
                Applied::Triggered
            }
            _ => Applied::Idle,
        }
    }
}

/// Sets a stage-handling modifier before the formula runs.
#[derive(Clone, Debug)]
pub struct StageBypass {
    name: &'static str,
    defender_stages: bool,
}

impl Effect for StageBypass {
    fn name(&self) -> &'static str {
        self.name
    }

    fn timings(&self) -> &'static [Timing] {
        &[Timing::BeforeDamageCalc]
    }

    fn role(&self) -> Option<Role> {
        Some(Role::Attacker)
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> Applied {
        if self.defender_stages {
            ctx.mods.ignore_defender_stages = true;
        } else {
            ctx.mods.ignore_attacker_drops = true;
        }
        Applied::Triggered
    }
}

pub(super) fn register(r: &mut EffectRegistry) {
    use Gate::*;
    use SkillCategory::{Physical, Special};

    r.register(1, "damage_boost", |a| {
        built(DamageScale::boost("damage_boost", Always, a.percent(0)?))
    });
    r.register(2, "physical_boost", |a| {
        built(DamageScale::boost("physical_boost", Category(Physical), a.percent(0)?))
    });
    r.register(3, "special_boost", |a| {
        built(DamageScale::boost("special_boost", Category(Special), a.percent(0)?))
    });
    r.register(4, "element_boost", |a| {
        built(DamageScale::boost("element_boost", Element(a.element(0)?), a.percent(1)?))
    });
    r.register(5, "low_hp_boost", |a| {
        built(DamageScale::boost("low_hp_boost", OwnerHpAtMost(a.chance(0)?), a.percent(1)?))
    });
    r.register(6, "full_hp_boost", |a| {
        built(DamageScale::boost("full_hp_boost", OwnerFullHp, a.percent(0)?))
    });
    r.register(7, "execute_boost", |a| {
        built(DamageScale::boost("execute_boost", FoeHpAtMost(a.chance(0)?), a.percent(1)?))
    });
    r.register(8, "foe_ailing_boost", |a| {
        built(DamageScale::boost("foe_ailing_boost", FoeAiling, a.percent(0)?))
    });
    r.register(9, "foe_ailment_boost", |a| {
        built(DamageScale::boost("foe_ailment_boost", FoeAilment(a.ailment(0)?), a.percent(1)?))
    });
    r.register(10, "super_effective_boost", |a| {
        built(DamageScale::boost("super_effective_boost", SuperEffective, a.percent(0)?))
    });
    r.register(11, "crit_damage_boost", |a| {
        built(DamageScale::boost("crit_damage_boost", Crit, a.percent(0)?))
    });
    r.register(12, "first_strike_boost", |a| {
        built(DamageScale::boost("first_strike_boost", MovedFirst, a.percent(0)?))
    });
    r.register(13, "last_strike_boost", |a| {
        built(DamageScale::boost("last_strike_boost", MovedLast, a.percent(0)?))
    });
    r.register(14, "lucky_damage_boost", |a| {
        built(DamageScale::boost("lucky_damage_boost", Chance(a.chance(0)?), a.percent(1)?))
    });
    r.register(15, "damage_reduction", |a| {
        built(DamageScale::reduction("damage_reduction", Always, a.chance(0)?))
    });
    r.register(16, "physical_reduction", |a| {
        built(DamageScale::reduction("physical_reduction", Category(Physical), a.chance(0)?))
    });
    r.register(17, "special_reduction", |a| {
        built(DamageScale::reduction("special_reduction", Category(Special), a.chance(0)?))
    });
    r.register(18, "element_resist", |a| {
        built(DamageScale::reduction("element_resist", Element(a.element(0)?), a.chance(1)?))
    });
    r.register(19, "super_effective_reduction", |a| {
        built(DamageScale::reduction("super_effective_reduction", SuperEffective, a.chance(0)?))
    });
    r.register(20, "full_hp_reduction", |a| {
        built(DamageScale::reduction("full_hp_reduction", OwnerFullHp, a.chance(0)?))
    });
    r.register(21, "damage_cap", |a| built(DamageCap { pct: a.count(0, 100)? }));
    r.register(22, "flat_damage_bonus", |a| {
        built(FlatDamage {
            name: "flat_damage_bonus",
            role: Role::Attacker,
            amount: a.bounded(0, 0, 10_000)?,
        })
    });
    r.register(23, "flat_damage_reduction", |a| {
        built(FlatDamage {
            name: "flat_damage_reduction",
            role: Role::Defender,
            amount: -a.bounded(0, 0, 10_000)?,
        })
    });
    r.register(24, "minimum_damage", |a| {
        built(MinimumDamage {
            amount: a.count(0, 10_000)?,
        })
    });
    r.register(25, "fixed_damage", |a| {
        built(FixedDamage {
            name: "fixed_damage",
            rule: FixedRule::Amount(a.count(0, 10_000)?),
        })
    });
    r.register(26, "level_damage", |_| {
        built(FixedDamage {
            name: "level_damage",
            rule: FixedRule::Level,
        })
    });
    r.register(27, "fraction_damage", |a| {
        built(FixedDamage {
            name: "fraction_damage",
            rule: FixedRule::FoeHpShare(a.count(0, 100)?),
        })
    });
    r.register(28, "stored_power", |a| {
        built(PowerShift {
            name: "stored_power",
            rule: PowerRule::StoredPower {
                step: a.count(0, 100)?,
            },
        })
    });
    r.register(29, "reversal_power", |_| {
        built(PowerShift {
            name: "reversal_power",
            rule: PowerRule::Reversal,
        })
    });
    r.register(30, "crush_power", |_| {
        built(PowerShift {
            name: "crush_power",
            rule: PowerRule::Crush,
        })
    });
    r.register(31, "repeat_power", |a| {
        built(RepeatPower {
            step_pct: a.percent(0)?,
            max_stacks: a.count_or(1, 10, 4)?,
        })
    });
    r.register(32, "rage_power", |a| {
        built(RagePower {
            per_hit_pct: a.percent(0)?,
        })
    });
    r.register(33, "same_element_boost", |a| {
        built(DamageScale::boost("same_element_boost", SameElement, a.percent(0)?))
    });
    r.register(34, "ignore_foe_stages", |_| {
        built(StageBypass {
            name: "ignore_foe_stages",
            defender_stages: true,
        })
    });
    r.register(35, "ignore_own_drops", |_| {
        built(StageBypass {
            name: "ignore_own_drops",
            defender_stages: false,
        })
    });
    r.register(36, "power_boost", |a| {
        built(PowerShift {
            name: "power_boost",
            rule: PowerRule::Scale(100 + a.percent(0)?),
        })
    });
    r.register(37, "random_power", |a| {
        let min = a.count(0, 500)?;
        let max = a.bounded(1, min as i32, 500)? as u32;
        built(PowerShift {
            name: "random_power",
            rule: PowerRule::Random { min, max },
        })
    });
    r.register(38, "ailing_boost", |a| {
        built(DamageScale::boost("ailing_boost", OwnerAiling, a.percent(0)?))
    });
    r.register(39, "not_very_effective_boost", |a| {
        built(DamageScale::boost("not_very_effective_boost", NotVeryEffective, a.percent(0)?))
    });
}
