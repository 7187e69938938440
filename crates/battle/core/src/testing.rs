//! Fixtures shared by unit tests.

use std::collections::HashMap;

use crate::config::BattleConfig;
use crate::env::{
    BattleRng, BossOracle, BossTemplate, CreatureOracle, CreatureTemplate, EffectDescriptor,
    EncounterOracle, EncounterSlot, ItemData, ItemOracle, LearnEntry, RulesOracle, SkillCategory,
    SkillData, SkillOracle, TypeChartOracle,
};
use crate::state::{
    BaseStats, BattleMode, BattleSide, BattleState, BossId, CatchTime, Combatant, CreatureId,
    Element, ItemId, SideOwner, SkillId, SkillSlot,
};

pub const TACKLE: SkillId = SkillId(1);
pub const EMBER: SkillId = SkillId(2);
pub const GROWL: SkillId = SkillId(3);
pub const QUICK: SkillId = SkillId(4);

/// Level-`level` Normal creature with `max_hp` HP and flat 50 stats.
pub fn creature(catch_time: u64, max_hp: u32, level: u8) -> Combatant {
    Combatant::new(
        CreatureId(1),
        CatchTime(catch_time),
        format!("mon-{catch_time}"),
        level,
        max_hp,
        BaseStats::new(50, 50, 50, 50, 50),
        Element::Normal,
    )
    .with_skills([
        SkillSlot::new(TACKLE, 35),
        SkillSlot::new(EMBER, 25),
        SkillSlot::new(GROWL, 40),
        SkillSlot::new(QUICK, 30),
    ])
}

pub fn rng(seed: u64) -> BattleRng {
    BattleRng::new(seed)
}

/// Rules without randomness in damage, crits, paralysis or confusion.
pub fn rules() -> BattleConfig {
    BattleConfig::deterministic()
}

pub fn tackle() -> SkillData {
    SkillData {
        id: TACKLE,
        name: "tackle".into(),
        element: Element::Normal,
        category: SkillCategory::Physical,
        power: 40,
        accuracy: 100,
        max_uses: 35,
        priority: 0,
        sure_hit: false,
        effect: None,
    }
}

/// Two 100-HP level-50 actives, one per side.
pub fn arena_state() -> BattleState {
    let home = BattleSide::new(SideOwner::Npc { slot: 0 }, vec![creature(1, 100, 50)])
        .expect("healthy home");
    let away = BattleSide::new(SideOwner::Npc { slot: 1 }, vec![creature(2, 100, 50)])
        .expect("healthy away");
    BattleState::new(BattleMode::Npc, home, away, rng(7))
}

/// Like [`arena_state`], with a healthy second creature behind each active.
pub fn arena_state_with_reserves() -> BattleState {
    let home = BattleSide::new(
        SideOwner::Npc { slot: 0 },
        vec![creature(1, 100, 50), creature(3, 100, 50)],
    )
    .expect("healthy home");
    let away = BattleSide::new(
        SideOwner::Npc { slot: 1 },
        vec![creature(2, 100, 50), creature(4, 100, 50)],
    )
    .expect("healthy away");
    BattleState::new(BattleMode::Npc, home, away, rng(7))
}

/// In-memory catalog with a handful of skills and species.
pub struct TestCatalog {
    pub creatures: HashMap<CreatureId, CreatureTemplate>,
    pub skills: HashMap<SkillId, SkillData>,
    pub bosses: HashMap<BossId, BossTemplate>,
    pub encounters: HashMap<u32, EncounterSlot>,
    pub items: HashMap<ItemId, ItemData>,
    pub chart: HashMap<(Element, Element), u32>,
    pub rules: BattleConfig,
}

impl TestCatalog {
    pub fn new() -> Self {
        let mut skills = HashMap::new();
        for skill in [
            tackle(),
            SkillData {
                id: EMBER,
                name: "ember".into(),
                element: Element::Fire,
                category: SkillCategory::Special,
                ..tackle()
            },
            SkillData {
                id: GROWL,
                name: "growl".into(),
                category: SkillCategory::Status,
                power: 0,
                effect: Some(EffectDescriptor::new(71, &[0, 1])),
                ..tackle()
            },
            SkillData {
                id: QUICK,
                name: "quick".into(),
                priority: 1,
                ..tackle()
            },
        ] {
            skills.insert(skill.id, skill);
        }

        let species = CreatureTemplate {
            id: CreatureId(1),
            name: "testmon".into(),
            element: Element::Normal,
            base_hp: 50,
            base: BaseStats::new(50, 50, 50, 50, 50),
            catch_rate: 255,
            base_exp: 60,
            learnset: vec![
                LearnEntry {
                    level: 1,
                    skill: TACKLE,
                },
                LearnEntry {
                    level: 5,
                    skill: GROWL,
                },
            ],
            abilities: Vec::new(),
        };

        let mut chart = HashMap::new();
        chart.insert((Element::Fire, Element::Grass), 200);
        chart.insert((Element::Normal, Element::Ghost), 0);

        Self {
            creatures: HashMap::from([(species.id, species)]),
            skills,
            bosses: HashMap::new(),
            encounters: HashMap::new(),
            items: HashMap::new(),
            chart,
            rules: rules(),
        }
    }

    pub fn with_skill(mut self, skill: SkillData) -> Self {
        self.skills.insert(skill.id, skill);
        self
    }
}

impl CreatureOracle for TestCatalog {
    fn creature(&self, id: CreatureId) -> Option<&CreatureTemplate> {
        self.creatures.get(&id)
    }
}

impl SkillOracle for TestCatalog {
    fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.skills.get(&id)
    }
}

impl BossOracle for TestCatalog {
    fn boss(&self, id: BossId) -> Option<&BossTemplate> {
        self.bosses.get(&id)
    }
}

impl EncounterOracle for TestCatalog {
    fn encounter(&self, slot: u32) -> Option<&EncounterSlot> {
        self.encounters.get(&slot)
    }
}

impl ItemOracle for TestCatalog {
    fn item(&self, id: ItemId) -> Option<&ItemData> {
        self.items.get(&id)
    }
}

impl TypeChartOracle for TestCatalog {
    fn effectiveness(&self, attack: Element, defend: Element) -> u32 {
        self.chart.get(&(attack, defend)).copied().unwrap_or(100)
    }
}

impl RulesOracle for TestCatalog {
    fn rules(&self) -> &BattleConfig {
        &self.rules
    }
}
