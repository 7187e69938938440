//! The mutable scratch object threaded through one action.

use std::sync::Arc;

use bitflags::bitflags;

use super::{DamageCause, Effect, Notice, Timing};
use crate::config::BattleConfig;
use crate::env::{BattleRng, SkillCategory, SkillData};
use crate::state::{
    Ailment, Arena, Combatant, EffectLifetime, Element, Side, SkillId, StatKind,
};

/// Which combatant of the current action an effect belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Attacker,
    Defender,
}

impl Role {
    pub const fn opposite(self) -> Role {
        match self {
            Role::Attacker => Role::Defender,
            Role::Defender => Role::Attacker,
        }
    }
}

/// Accumulators effects write to and the resolver reads back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modifiers {
    pub priority_delta: i32,
    pub always_first: bool,
    /// Added to the stage-adjusted accuracy, in percentage points.
    pub hit_rate_delta: i32,
    /// Replaces the hit chance entirely.
    pub hit_rate_override: Option<u32>,
    pub guaranteed_hit: bool,
    /// Added to the base crit rate, in basis points.
    pub crit_rate_delta: i32,
    pub crit_override: Option<bool>,
    pub instant_kill: bool,
    pub ignore_defender_stages: bool,
    pub ignore_attacker_drops: bool,
    /// Product of every multiplicative damage modifier, in percent. Folded
    /// into the formula result before after-damage-calc runs.
    pub damage_multiplier_pct: u32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            priority_delta: 0,
            always_first: false,
            hit_rate_delta: 0,
            hit_rate_override: None,
            guaranteed_hit: false,
            crit_rate_delta: 0,
            crit_override: None,
            instant_kill: false,
            ignore_defender_stages: false,
            ignore_attacker_drops: false,
            damage_multiplier_pct: 100,
        }
    }
}

impl Modifiers {
    /// Compounds `pct` into the damage multiplier.
    pub fn scale_damage(&mut self, pct: u32) {
        self.damage_multiplier_pct =
            (u64::from(self.damage_multiplier_pct) * u64::from(pct) / 100).min(u64::from(u32::MAX))
                as u32;
    }

    /// Applies the accumulated multiplier to a formula result. Damage that
    /// was not fully cancelled stays at least 1.
    pub fn multiplied(&self, damage: u32) -> u32 {
        if damage == 0 || self.damage_multiplier_pct == 0 {
            return 0;
        }
        (u64::from(damage) * u64::from(self.damage_multiplier_pct) / 100)
            .clamp(1, u64::from(u32::MAX)) as u32
    }
}

bitflags! {
    /// Outcome markers for the current action.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AttackFlags: u8 {
        const CRIT = 1 << 0;
        const MISS = 1 << 1;
        /// Stopped by a defensive effect before landing.
        const BLOCKED = 1 << 2;
        /// The attacker never acted.
        const PREVENTED = 1 << 3;
    }
}

/// Context for one action (or one neutral phase such as turn end).
///
/// `attacker`/`defender` are absolute for the action. `role` is the role of
/// the effect currently running, so `owner()`/`foe()` resolve relative to it.
pub struct ActionContext<'a> {
    pub attacker: &'a mut Combatant,
    pub defender: &'a mut Combatant,
    pub attacker_side: Side,
    pub role: Role,
    pub skill: Option<SkillData>,
    pub turn: u32,
    pub timing: Timing,
    /// Running damage value between the calc phases.
    pub damage: u32,
    /// Type effectiveness in percent.
    pub effectiveness: u32,
    /// HP actually removed by the attack.
    pub dealt: u32,
    pub mods: Modifiers,
    pub flags: AttackFlags,
    pub moved_first: bool,
    pub rules: &'a BattleConfig,
    reserves: [bool; 2],
    rng: &'a mut BattleRng,
    seq: &'a mut u64,
    log: Vec<Notice>,
}

impl<'a> ActionContext<'a> {
    pub fn new(arena: Arena<'a>, attacker_side: Side, rules: &'a BattleConfig, turn: u32) -> Self {
        Self {
            attacker: arena.attacker,
            defender: arena.defender,
            attacker_side,
            role: Role::Attacker,
            skill: None,
            turn,
            timing: Timing::TurnStart,
            damage: 0,
            effectiveness: 100,
            dealt: 0,
            mods: Modifiers::default(),
            flags: AttackFlags::empty(),
            moved_first: false,
            rules,
            reserves: [arena.attacker_reserve, arena.defender_reserve],
            rng: arena.rng,
            seq: arena.seq,
            log: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: SkillData) -> Self {
        self.skill = Some(skill);
        self
    }

    pub fn with_mods(mut self, mods: Modifiers) -> Self {
        self.mods = mods;
        self
    }

    // ========================================================================
    // Role-relative access
    // ========================================================================

    pub fn combatant(&self, role: Role) -> &Combatant {
        match role {
            Role::Attacker => &*self.attacker,
            Role::Defender => &*self.defender,
        }
    }

    pub fn combatant_mut(&mut self, role: Role) -> &mut Combatant {
        match role {
            Role::Attacker => &mut *self.attacker,
            Role::Defender => &mut *self.defender,
        }
    }

    pub fn side_of(&self, role: Role) -> Side {
        match role {
            Role::Attacker => self.attacker_side,
            Role::Defender => self.attacker_side.opponent(),
        }
    }

    pub fn owner(&self) -> &Combatant {
        self.combatant(self.role)
    }

    pub fn owner_mut(&mut self) -> &mut Combatant {
        self.combatant_mut(self.role)
    }

    pub fn foe(&self) -> &Combatant {
        self.combatant(self.role.opposite())
    }

    pub fn foe_mut(&mut self) -> &mut Combatant {
        self.combatant_mut(self.role.opposite())
    }

    pub fn me(&self) -> Role {
        self.role
    }

    pub fn them(&self) -> Role {
        self.role.opposite()
    }

    pub fn owner_side(&self) -> Side {
        self.side_of(self.role)
    }

    /// Whether `role`'s side had a healthy creature waiting when the action
    /// began.
    pub fn has_reserve(&self, role: Role) -> bool {
        match role {
            Role::Attacker => self.reserves[0],
            Role::Defender => self.reserves[1],
        }
    }

    /// A combatant is down with nobody left to replace it: the battle is over
    /// even though the state has not been settled yet.
    pub fn is_decided(&self) -> bool {
        [Role::Attacker, Role::Defender]
            .into_iter()
            .any(|role| self.combatant(role).is_fainted() && !self.has_reserve(role))
    }

    /// True when the running effect belongs to the acting combatant.
    pub fn owner_is_attacker(&self) -> bool {
        self.role == Role::Attacker
    }

    // ========================================================================
    // Skill queries
    // ========================================================================

    pub fn skill_id(&self) -> Option<SkillId> {
        self.skill.as_ref().map(|s| s.id)
    }

    pub fn category(&self) -> Option<SkillCategory> {
        self.skill.as_ref().map(|s| s.category)
    }

    pub fn element(&self) -> Option<Element> {
        self.skill.as_ref().map(|s| s.element)
    }

    pub fn is_damaging(&self) -> bool {
        self.skill.as_ref().is_some_and(SkillData::is_damaging)
    }

    /// The action is a damaging skill that connected.
    pub fn landed(&self) -> bool {
        self.is_damaging()
            && !self
                .flags
                .intersects(AttackFlags::MISS | AttackFlags::BLOCKED | AttackFlags::PREVENTED)
    }

    pub fn is_crit(&self) -> bool {
        self.flags.contains(AttackFlags::CRIT)
    }

    /// Scales the skill's base power by `pct` percent.
    pub fn scale_power(&mut self, pct: u32) {
        if let Some(skill) = self.skill.as_mut() {
            skill.power = (skill.power as u64 * pct as u64 / 100) as u32;
        }
    }

    pub fn set_power(&mut self, power: u32) {
        if let Some(skill) = self.skill.as_mut() {
            skill.power = power;
        }
    }

    // ========================================================================
    // Randomness
    // ========================================================================

    pub fn roll(&mut self, pct: u32) -> bool {
        self.rng.chance(pct)
    }

    /// Chance in basis points.
    pub fn roll_bp(&mut self, bp: u32) -> bool {
        self.rng.chance_bp(bp)
    }

    pub fn range(&mut self, min: u32, max: u32) -> u32 {
        self.rng.range(min, max)
    }

    // ========================================================================
    // Mutations that report
    // ========================================================================

    pub fn notify(&mut self, notice: Notice) {
        self.log.push(notice);
    }

    /// Records that the running effect fired.
    pub fn triggered(&mut self, effect: &'static str) {
        let side = self.owner_side();
        self.notify(Notice::EffectTriggered { side, effect });
    }

    /// Removes HP outside the attack formula. Returns HP removed.
    pub fn deal_direct(&mut self, target: Role, amount: u32, cause: DamageCause) -> u32 {
        let dealt = self.combatant_mut(target).take_damage(amount);
        if dealt > 0 {
            let side = self.side_of(target);
            self.notify(Notice::Damaged {
                side,
                amount: dealt,
                cause,
            });
        }
        dealt
    }

    pub fn heal(&mut self, target: Role, amount: u32) -> u32 {
        let healed = self.combatant_mut(target).heal(amount);
        if healed > 0 {
            let side = self.side_of(target);
            self.notify(Notice::Healed {
                side,
                amount: healed,
            });
        }
        healed
    }

    /// Shifts a stage. Drops aimed at the foe respect its stage-drop guard.
    pub fn shift_stage(&mut self, target: Role, stat: StatKind, delta: i8) -> i8 {
        let foreign_drop = delta < 0 && target != self.role;
        let combatant = self.combatant_mut(target);
        if combatant.is_fainted() {
            return 0;
        }
        let applied = if foreign_drop {
            combatant.drop_stage(stat, delta)
        } else {
            combatant.shift_stage(stat, delta)
        };
        if applied != 0 {
            let side = self.side_of(target);
            self.notify(Notice::StageChanged {
                side,
                stat,
                delta: applied,
            });
        }
        applied
    }

    /// Inflicts an ailment; `turns == 0` uses the configured default.
    pub fn inflict(&mut self, target: Role, ailment: Ailment, turns: u8) -> bool {
        let turns = if turns == 0 {
            self.rules.default_ailment_turns
        } else {
            turns
        };
        let applied = self.combatant_mut(target).inflict(ailment, turns);
        if applied {
            let side = self.side_of(target);
            self.notify(Notice::AilmentApplied { side, ailment });
        }
        applied
    }

    pub fn cure(&mut self, target: Role) -> Option<Ailment> {
        let cured = self.combatant_mut(target).cure();
        if let Some(ailment) = cured {
            let side = self.side_of(target);
            self.notify(Notice::AilmentCleared { side, ailment });
        }
        cured
    }

    /// Attaches an effect to `target` and returns its registration sequence.
    pub fn attach(&mut self, target: Role, effect: Arc<dyn Effect>, lifetime: EffectLifetime) -> u64 {
        let seq = *self.seq;
        *self.seq += 1;
        self.combatant_mut(target).attach(effect, seq, lifetime);
        seq
    }

    /// Like [`attach`](Self::attach), but a no-op when `target` already
    /// carries an effect with the same name.
    pub fn attach_unique(
        &mut self,
        target: Role,
        effect: Arc<dyn Effect>,
        lifetime: EffectLifetime,
    ) -> Option<u64> {
        if self.combatant(target).has_effect(effect.name()) {
            return None;
        }
        Some(self.attach(target, effect, lifetime))
    }

    // ========================================================================
    // Results
    // ========================================================================

    pub fn log(&self) -> &[Notice] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.log)
    }
}
