//! Building combatants from catalog templates.

use crate::env::{BattleEnv, CreatureTemplate, OracleError};
use crate::state::{BaseStats, BossId, CatchTime, Combatant, CreatureId, SkillId, SkillSlot};

/// An owned or generated creature about to enter battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureSpec {
    pub species: CreatureId,
    pub catch_time: CatchTime,
    pub level: u8,
    /// Individual value added to every base stat.
    #[cfg_attr(feature = "serde", serde(default))]
    pub iv: u8,
    /// Current HP carried over from the party; `None` means full.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hp: Option<u32>,
    /// Equipped skills; empty means "latest four from the learnset".
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub nickname: Option<String>,
}

impl CreatureSpec {
    pub fn new(species: CreatureId, catch_time: CatchTime, level: u8) -> Self {
        Self {
            species,
            catch_time,
            level,
            iv: 0,
            hp: None,
            skills: Vec::new(),
            nickname: None,
        }
    }

    pub fn with_iv(mut self, iv: u8) -> Self {
        self.iv = iv;
        self
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_skills(mut self, skills: impl Into<Vec<SkillId>>) -> Self {
        self.skills = skills.into();
        self
    }
}

/// `(2 * base + iv) * level / 100 + 5`.
pub fn scaled_stat(base: u32, iv: u8, level: u8) -> u32 {
    (2 * base + u32::from(iv)) * u32::from(level) / 100 + 5
}

/// `(2 * base + iv) * level / 100 + level + 10`.
pub fn scaled_hp(base: u32, iv: u8, level: u8) -> u32 {
    (2 * base + u32::from(iv)) * u32::from(level) / 100 + u32::from(level) + 10
}

fn scaled_stats(template: &CreatureTemplate, iv: u8, level: u8) -> BaseStats {
    let b = template.base;
    BaseStats::new(
        scaled_stat(b.attack, iv, level),
        scaled_stat(b.defense, iv, level),
        scaled_stat(b.sp_attack, iv, level),
        scaled_stat(b.sp_defense, iv, level),
        scaled_stat(b.speed, iv, level),
    )
}

fn skill_slots(env: &BattleEnv<'_>, skills: &[SkillId]) -> Result<Vec<SkillSlot>, OracleError> {
    skills
        .iter()
        .map(|id| env.skill(*id).map(|skill| SkillSlot::new(*id, skill.max_uses)))
        .collect()
}

/// Builds a combatant for `spec`, with the species' abilities queued for
/// attachment at battle start.
pub fn spawn_creature(env: &BattleEnv<'_>, spec: &CreatureSpec) -> Result<Combatant, OracleError> {
    let template = env.creature(spec.species)?;
    let skills = if spec.skills.is_empty() {
        template.skills_at(spec.level)
    } else {
        spec.skills.clone()
    };
    let max_hp = scaled_hp(template.base_hp, spec.iv, spec.level);
    let name = spec.nickname.clone().unwrap_or_else(|| template.name.clone());
    let combatant = Combatant::new(
        template.id,
        spec.catch_time,
        name,
        spec.level,
        max_hp,
        scaled_stats(template, spec.iv, spec.level),
        template.element,
    )
    .with_skills(skill_slots(env, &skills)?)
    .with_abilities(template.abilities.clone());

    Ok(match spec.hp {
        Some(hp) => combatant.with_hp(hp),
        None => combatant,
    })
}

/// Builds a boss combatant. Boss abilities are queued after the species'.
pub fn spawn_boss(
    env: &BattleEnv<'_>,
    boss: BossId,
    catch_time: CatchTime,
) -> Result<Combatant, OracleError> {
    let data = env.boss(boss)?;
    let template = env.creature(data.species)?;
    let max_hp = data
        .max_hp
        .unwrap_or_else(|| scaled_hp(template.base_hp, data.iv, data.level));
    let abilities = template
        .abilities
        .iter()
        .chain(&data.abilities)
        .cloned()
        .collect();
    Ok(Combatant::new(
        template.id,
        catch_time,
        data.name.clone(),
        data.level,
        max_hp,
        scaled_stats(template, data.iv, data.level),
        template.element,
    )
    .with_skills(skill_slots(env, &data.skills)?)
    .with_abilities(abilities))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_formulas() {
        assert_eq!(scaled_stat(100, 0, 50), 105);
        assert_eq!(scaled_stat(100, 31, 100), 236);
        assert_eq!(scaled_hp(50, 0, 50), 110);
        assert_eq!(scaled_hp(1, 0, 1), 11);
    }
}
