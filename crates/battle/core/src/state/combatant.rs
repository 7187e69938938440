use core::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;

use super::{
    Ailment, AilmentSet, AilmentState, BaseStats, CatchTime, CreatureId, Element, Guards,
    ScratchMap, SkillId, StatKind, StatStages, VolatileFlags, apply_accuracy_stage, apply_stage,
};
use crate::config::BattleConfig;
use crate::effect::Effect;
use crate::env::{EffectDescriptor, SkillCategory};

/// A learned skill with its remaining uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSlot {
    pub skill: SkillId,
    pub uses: u8,
    pub max_uses: u8,
}

impl SkillSlot {
    pub const fn new(skill: SkillId, max_uses: u8) -> Self {
        Self {
            skill,
            uses: max_uses,
            max_uses,
        }
    }

    pub const fn is_usable(&self) -> bool {
        self.uses > 0
    }
}

/// The most recent damaging hit this combatant received.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LastHit {
    pub amount: u32,
    pub category: SkillCategory,
    pub turn: u32,
}

/// How long an attached effect survives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectLifetime {
    /// Stays for the whole battle (abilities, boss passives).
    Battle,
    /// Removed when the carrier leaves the field.
    Volatile,
}

/// An effect instance attached to a combatant.
///
/// `seq` is the battle-wide registration order; it breaks priority ties and
/// orders turn-end effects oldest first.
#[derive(Clone)]
pub struct AttachedEffect {
    pub effect: Arc<dyn Effect>,
    pub seq: u64,
    pub lifetime: EffectLifetime,
}

impl fmt::Debug for AttachedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedEffect")
            .field("effect", &self.effect.name())
            .field("seq", &self.seq)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// A creature participating in a battle.
///
/// HP is kept in `[0, max_hp]` by every mutator; there is no way to write an
/// out-of-range value.
#[derive(Clone, Debug)]
pub struct Combatant {
    pub species: CreatureId,
    pub catch_time: CatchTime,
    pub name: String,
    pub level: u8,
    pub element: Element,
    pub stats: BaseStats,
    hp: u32,
    max_hp: u32,
    skills: ArrayVec<SkillSlot, { BattleConfig::MAX_SKILLS }>,
    ailment: Option<AilmentState>,
    stages: StatStages,
    pub flags: VolatileFlags,
    pub guards: Guards,
    pub ailment_ward: AilmentSet,
    pub last_skill: Option<SkillId>,
    pub last_hit: Option<LastHit>,
    /// Effect descriptors resolved into attached effects at battle start.
    pub abilities: Vec<EffectDescriptor>,
    /// Whether battle-start effects have fired for this combatant.
    pub entered: bool,
    effects: Vec<AttachedEffect>,
    pub scratch: ScratchMap,
}

impl Combatant {
    pub fn new(
        species: CreatureId,
        catch_time: CatchTime,
        name: impl Into<String>,
        level: u8,
        max_hp: u32,
        stats: BaseStats,
        element: Element,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            species,
            catch_time,
            name: name.into(),
            level: level.clamp(1, BattleConfig::MAX_LEVEL),
            element,
            stats,
            hp: max_hp,
            max_hp,
            skills: ArrayVec::new(),
            ailment: None,
            stages: StatStages::default(),
            flags: VolatileFlags::empty(),
            guards: Guards::empty(),
            ailment_ward: AilmentSet::empty(),
            last_skill: None,
            last_hit: None,
            abilities: Vec::new(),
            entered: false,
            effects: Vec::new(),
            scratch: ScratchMap::default(),
        }
    }

    /// Adds skills, ignoring any beyond the four-slot limit.
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillSlot>) -> Self {
        for slot in skills {
            if self.skills.try_push(slot).is_err() {
                break;
            }
        }
        self
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.set_hp(hp);
        self
    }

    pub fn with_abilities(mut self, abilities: Vec<EffectDescriptor>) -> Self {
        self.abilities = abilities;
        self
    }

    // ===== hit points =====

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp == self.max_hp
    }

    /// Current HP as a percentage of max, rounded down.
    pub fn hp_percent(&self) -> u32 {
        (self.hp as u64 * 100 / self.max_hp as u64) as u32
    }

    pub fn missing_hp(&self) -> u32 {
        self.max_hp - self.hp
    }

    /// Writes HP, clamped into `[0, max_hp]`.
    pub fn set_hp(&mut self, hp: u32) {
        if hp > self.max_hp {
            tracing::trace!(
                target: "battle::state",
                name = %self.name,
                requested = hp,
                max = self.max_hp,
                "hp write clamped"
            );
        }
        self.hp = hp.min(self.max_hp);
    }

    /// Changes max HP, keeping current HP within the new bound.
    pub fn set_max_hp(&mut self, max_hp: u32) {
        self.max_hp = max_hp.max(1);
        self.hp = self.hp.min(self.max_hp);
    }

    /// Removes up to `amount` HP and returns the amount actually removed.
    ///
    /// An enduring combatant keeps at least 1 HP.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let floor = if self.flags.contains(VolatileFlags::ENDURING) && self.hp > 0 {
            1
        } else {
            0
        };
        let after = self.hp.saturating_sub(amount).max(floor);
        let dealt = self.hp - after;
        self.hp = after;
        dealt
    }

    /// Restores up to `amount` HP and returns the amount actually restored.
    ///
    /// Fainted or heal-blocked combatants receive nothing.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_fainted() || self.flags.contains(VolatileFlags::HEAL_BLOCKED) {
            return 0;
        }
        let after = self.hp.saturating_add(amount).min(self.max_hp);
        let healed = after - self.hp;
        self.hp = after;
        healed
    }

    /// Brings a fainted combatant back with `hp` (at least 1).
    pub fn revive(&mut self, hp: u32) -> u32 {
        if !self.is_fainted() {
            return 0;
        }
        self.hp = hp.clamp(1, self.max_hp);
        self.hp
    }

    // ===== skills =====

    pub fn skills(&self) -> &[SkillSlot] {
        &self.skills
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillSlot> {
        self.skills.iter().find(|slot| slot.skill == id)
    }

    pub fn has_usable_skill(&self) -> bool {
        self.skills.iter().any(SkillSlot::is_usable)
    }

    /// Spends one use of `id`. Returns false if the skill is unknown or empty.
    pub fn consume_use(&mut self, id: SkillId) -> bool {
        match self.skills.iter_mut().find(|slot| slot.skill == id) {
            Some(slot) if slot.uses > 0 => {
                slot.uses -= 1;
                true
            }
            _ => false,
        }
    }

    /// Restores up to `amount` uses on every skill. Returns total uses restored.
    pub fn restore_uses(&mut self, amount: u8) -> u32 {
        let mut restored = 0;
        for slot in &mut self.skills {
            let after = slot.uses.saturating_add(amount).min(slot.max_uses);
            restored += (after - slot.uses) as u32;
            slot.uses = after;
        }
        restored
    }

    /// Drains up to `amount` uses from `id`. Returns uses removed.
    pub fn drain_uses(&mut self, id: SkillId, amount: u8) -> u8 {
        match self.skills.iter_mut().find(|slot| slot.skill == id) {
            Some(slot) => {
                let drained = slot.uses.min(amount);
                slot.uses -= drained;
                drained
            }
            None => 0,
        }
    }

    // ===== ailments =====

    pub fn ailment(&self) -> Option<&AilmentState> {
        self.ailment.as_ref()
    }

    pub fn ailment_mut(&mut self) -> Option<&mut AilmentState> {
        self.ailment.as_mut()
    }

    pub fn has_ailment(&self, kind: Ailment) -> bool {
        self.ailment.is_some_and(|state| state.kind == kind)
    }

    /// Inflicts an ailment. Fails if fainted, already afflicted, or warded.
    pub fn inflict(&mut self, kind: Ailment, turns: u8) -> bool {
        if self.is_fainted()
            || self.ailment.is_some()
            || self.ailment_ward.contains(kind.into())
            || turns == 0
        {
            return false;
        }
        self.ailment = Some(AilmentState {
            kind,
            turns_left: turns,
            elapsed: 0,
        });
        true
    }

    pub fn cure(&mut self) -> Option<Ailment> {
        self.ailment.take().map(|state| state.kind)
    }

    /// Counts one turn-end against the ailment. Returns the kind if it wore off.
    pub fn tick_ailment(&mut self) -> Option<Ailment> {
        let state = self.ailment.as_mut()?;
        state.elapsed = state.elapsed.saturating_add(1);
        state.turns_left = state.turns_left.saturating_sub(1);
        if state.turns_left == 0 {
            self.cure()
        } else {
            None
        }
    }

    // ===== stages =====

    pub fn stages(&self) -> &StatStages {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut StatStages {
        &mut self.stages
    }

    pub fn stage(&self, kind: StatKind) -> i8 {
        self.stages.get(kind)
    }

    /// Shifts a stage and returns the applied change.
    pub fn shift_stage(&mut self, kind: StatKind, delta: i8) -> i8 {
        self.stages.shift(kind, delta)
    }

    /// Lowers a stage on behalf of an opponent, honoring [`Guards::STAGE_DROPS`].
    pub fn drop_stage(&mut self, kind: StatKind, amount: i8) -> i8 {
        if self.guards.contains(Guards::STAGE_DROPS) {
            return 0;
        }
        self.stages.shift(kind, -amount.abs())
    }

    /// Stat value after stages and ailment penalties.
    pub fn effective_stat(&self, kind: StatKind) -> u32 {
        self.effective_stat_with(kind, self.stage(kind))
    }

    /// Stat value using an explicit stage instead of the stored one.
    pub fn effective_stat_with(&self, kind: StatKind, stage: i8) -> u32 {
        if kind == StatKind::Accuracy {
            return apply_accuracy_stage(100, stage);
        }
        let mut value = apply_stage(self.stats.get(kind), stage);
        match (kind, self.ailment.map(|s| s.kind)) {
            (StatKind::Speed, Some(Ailment::Paralysis)) => value /= 2,
            (StatKind::Attack, Some(Ailment::Burn)) => value /= 2,
            _ => {}
        }
        value.max(1)
    }

    pub fn effective_speed(&self) -> u32 {
        self.effective_stat(StatKind::Speed)
    }

    // ===== attached effects =====

    pub fn effects(&self) -> &[AttachedEffect] {
        &self.effects
    }

    pub fn attach(&mut self, effect: Arc<dyn Effect>, seq: u64, lifetime: EffectLifetime) {
        effect.on_attach(self);
        tracing::trace!(
            target: "battle::effect",
            name = %self.name,
            effect = effect.name(),
            seq,
            "effect attached"
        );
        self.effects.push(AttachedEffect {
            effect,
            seq,
            lifetime,
        });
    }

    pub fn detach(&mut self, seq: u64) -> bool {
        let before = self.effects.len();
        self.effects.retain(|attached| attached.seq != seq);
        before != self.effects.len()
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|a| a.effect.name() == name)
    }

    /// Removes every attached effect named `name`. Returns how many were removed.
    pub fn detach_named(&mut self, name: &str) -> usize {
        let before = self.effects.len();
        self.effects.retain(|attached| attached.effect.name() != name);
        before - self.effects.len()
    }

    // ===== field transitions =====

    pub fn record_skill_use(&mut self, skill: SkillId) {
        self.last_skill = Some(skill);
    }

    pub fn clear_turn_flags(&mut self) {
        self.flags.remove(VolatileFlags::ONE_TURN);
    }

    /// Resets volatile battle state when the combatant is withdrawn.
    ///
    /// The ailment, HP, skill uses, and battle-lifetime effects persist.
    pub fn withdraw(&mut self) {
        self.stages.reset();
        self.flags = VolatileFlags::empty();
        self.last_hit = None;
        self.effects
            .retain(|attached| attached.lifetime == EffectLifetime::Battle);
        let effects = &self.effects;
        self.scratch
            .retain_owners(|owner| effects.iter().any(|attached| attached.effect.name() == owner));
    }
}
