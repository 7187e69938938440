//! In-memory content catalog implementing every battle oracle.

use std::collections::HashMap;

use battle_core::env::{
    BossOracle, CreatureOracle, EncounterOracle, ItemOracle, RulesOracle, SkillOracle,
    TypeChartOracle,
};
use battle_core::{
    BattleConfig, BossId, BossTemplate, CreatureId, CreatureTemplate, EffectDescriptor,
    EffectRegistry, Element, EncounterSlot, ItemData, ItemId, SkillData, SkillId,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{
    BossLoader, ConfigLoader, CreatureLoader, EncounterLoader, ItemLoader, LoadResult, SkillLoader,
    TypeChartLoader,
};

/// One non-neutral matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChartEntry {
    pub attack: Element,
    pub defend: Element,
    /// Damage multiplier in percent.
    pub percent: u32,
}

/// Attack element × defend element → percent. Unlisted pairs are neutral.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeChart {
    matchups: HashMap<(Element, Element), u32>,
}

impl TypeChart {
    pub const NEUTRAL: u32 = 100;

    /// Adds a matchup, returning the previous multiplier for the pair.
    pub fn insert(&mut self, entry: TypeChartEntry) -> Option<u32> {
        self.matchups
            .insert((entry.attack, entry.defend), entry.percent)
    }

    pub fn get(&self, attack: Element, defend: Element) -> u32 {
        self.matchups
            .get(&(attack, defend))
            .copied()
            .unwrap_or(Self::NEUTRAL)
    }

    pub fn len(&self) -> usize {
        self.matchups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchups.is_empty()
    }
}

/// All battle content, keyed for oracle lookups.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    creatures: HashMap<CreatureId, CreatureTemplate>,
    skills: HashMap<SkillId, SkillData>,
    bosses: HashMap<BossId, BossTemplate>,
    encounters: HashMap<u32, EncounterSlot>,
    items: HashMap<ItemId, ItemData>,
    chart: TypeChart,
    rules: BattleConfig,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample content pack compiled into the crate.
    pub fn bundled() -> LoadResult<Self> {
        let mut catalog = Self::new();
        catalog.rules = ConfigLoader::parse(include_str!("../data/config.toml"))?;
        catalog.chart = TypeChartLoader::parse(include_str!("../data/type_chart.ron"))?;
        for creature in CreatureLoader::parse(include_str!("../data/creatures.ron"))? {
            catalog.add_creature(creature);
        }
        for skill in SkillLoader::parse(include_str!("../data/skills.ron"))? {
            catalog.add_skill(skill);
        }
        for boss in BossLoader::parse(include_str!("../data/bosses.ron"))? {
            catalog.add_boss(boss);
        }
        for encounter in EncounterLoader::parse(include_str!("../data/encounters.ron"))? {
            catalog.add_encounter(encounter);
        }
        for item in ItemLoader::parse(include_str!("../data/items.ron"))? {
            catalog.add_item(item);
        }
        catalog.check_references()?;
        Ok(catalog)
    }

    // ========================================================================
    // Building
    // ========================================================================

    pub fn add_creature(&mut self, creature: CreatureTemplate) {
        self.creatures.insert(creature.id, creature);
    }

    pub fn add_skill(&mut self, skill: SkillData) {
        self.skills.insert(skill.id, skill);
    }

    pub fn add_boss(&mut self, boss: BossTemplate) {
        self.bosses.insert(boss.id, boss);
    }

    pub fn add_encounter(&mut self, encounter: EncounterSlot) {
        self.encounters.insert(encounter.slot, encounter);
    }

    pub fn add_item(&mut self, item: ItemData) {
        self.items.insert(item.id, item);
    }

    pub fn set_type_chart(&mut self, chart: TypeChart) {
        self.chart = chart;
    }

    pub fn set_rules(&mut self, rules: BattleConfig) {
        self.rules = rules;
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Fails on any id that points at a record the catalog does not hold.
    pub fn check_references(&self) -> LoadResult<()> {
        for creature in self.creatures.values() {
            for entry in &creature.learnset {
                self.require_skill(entry.skill, &creature.name)?;
            }
        }
        for boss in self.bosses.values() {
            if !self.creatures.contains_key(&boss.species) {
                anyhow::bail!("boss {} uses unknown species {}", boss.name, boss.species);
            }
            for skill in &boss.skills {
                self.require_skill(*skill, &boss.name)?;
            }
            for drop in &boss.drops {
                if !self.items.contains_key(&drop.item) {
                    anyhow::bail!("boss {} drops unknown item {}", boss.name, drop.item);
                }
            }
        }
        for encounter in self.encounters.values() {
            for member in &encounter.party {
                if !self.creatures.contains_key(&member.species) {
                    anyhow::bail!(
                        "encounter {} uses unknown species {}",
                        encounter.name,
                        member.species
                    );
                }
                for skill in &member.skills {
                    self.require_skill(*skill, &encounter.name)?;
                }
            }
        }
        Ok(())
    }

    fn require_skill(&self, skill: SkillId, owner: &str) -> LoadResult<()> {
        if self.skills.contains_key(&skill) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("{} references unknown skill {}", owner, skill))
        }
    }

    /// Logs every effect descriptor the registry cannot build. Such effects
    /// are skipped in battle, so this is a warning rather than a load error.
    pub fn report_unknown_effects(&self, registry: &EffectRegistry) -> usize {
        let skill_effects = self
            .skills
            .values()
            .filter_map(|s| s.effect.as_ref().map(|d| (s.name.as_str(), d)));
        let creature_effects = self
            .creatures
            .values()
            .flat_map(|c| c.abilities.iter().map(move |d| (c.name.as_str(), d)));
        let boss_effects = self
            .bosses
            .values()
            .flat_map(|b| b.abilities.iter().map(move |d| (b.name.as_str(), d)));

        let mut unknown = 0;
        for (owner, descriptor) in skill_effects.chain(creature_effects).chain(boss_effects) {
            if Self::buildable(registry, descriptor) {
                continue;
            }
            warn!(
                target: "battle::content",
                owner,
                effect = %descriptor.id,
                args = ?descriptor.args,
                "effect descriptor cannot be built"
            );
            unknown += 1;
        }
        unknown
    }

    fn buildable(registry: &EffectRegistry, descriptor: &EffectDescriptor) -> bool {
        matches!(registry.try_build(descriptor), Some(Ok(_)))
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn creatures(&self) -> impl Iterator<Item = &CreatureTemplate> {
        self.creatures.values()
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillData> {
        self.skills.values()
    }

    pub fn bosses(&self) -> impl Iterator<Item = &BossTemplate> {
        self.bosses.values()
    }

    pub fn encounters(&self) -> impl Iterator<Item = &EncounterSlot> {
        self.encounters.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemData> {
        self.items.values()
    }

    pub fn type_chart(&self) -> &TypeChart {
        &self.chart
    }
}

impl CreatureOracle for Catalog {
    fn creature(&self, id: CreatureId) -> Option<&CreatureTemplate> {
        self.creatures.get(&id)
    }
}

impl SkillOracle for Catalog {
    fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.skills.get(&id)
    }
}

impl BossOracle for Catalog {
    fn boss(&self, id: BossId) -> Option<&BossTemplate> {
        self.bosses.get(&id)
    }
}

impl EncounterOracle for Catalog {
    fn encounter(&self, slot: u32) -> Option<&EncounterSlot> {
        self.encounters.get(&slot)
    }
}

impl ItemOracle for Catalog {
    fn item(&self, id: ItemId) -> Option<&ItemData> {
        self.items.get(&id)
    }
}

impl TypeChartOracle for Catalog {
    fn effectiveness(&self, attack: Element, defend: Element) -> u32 {
        self.chart.get(attack, defend)
    }
}

impl RulesOracle for Catalog {
    fn rules(&self) -> &BattleConfig {
        &self.rules
    }
}
