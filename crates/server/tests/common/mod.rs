//! Shared fixtures: a small deterministic catalog and a seeded party store.
#![allow(dead_code)]

use std::sync::Arc;

use battle_content::Catalog;
use battle_core::env::{EncounterMember, LearnEntry};
use battle_core::{
    Ailment, BaseStats, BattleConfig, BossId, BossTemplate, CatchTime, CommandError, CreatureId,
    CreatureTemplate, DropEntry, EffectDescriptor, Element, EncounterSlot, ItemData, ItemId,
    ItemKind, PlayerId, SkillCategory, SkillData, SkillId,
};
use battle_server::{
    BattleOrchestrator, BattleServices, Event, InMemoryPartyStore, OwnedCreature, ServerConfig,
    ServiceError,
};
use tokio::sync::broadcast;

pub const HOST: PlayerId = PlayerId(1);
pub const GUEST: PlayerId = PlayerId(2);
pub const OTHER: PlayerId = PlayerId(3);

pub const TACKLE: SkillId = SkillId(1);
pub const GROWL: SkillId = SkillId(2);
/// Sure-hit status skill that poisons for ten turns.
pub const TOXIN: SkillId = SkillId(3);

pub const STARTER: CreatureId = CreatureId(1);
pub const WILD: CreatureId = CreatureId(2);

pub const ORB: ItemId = ItemId(1);
pub const POTION: ItemId = ItemId(2);
pub const TROPHY: ItemId = ItemId(9);

pub const WILD_SLOT: u32 = 1;
pub const TRAINER_SLOT: u32 = 2;
pub const BOSS: BossId = BossId(1);

fn species(id: CreatureId, name: &str) -> CreatureTemplate {
    CreatureTemplate {
        id,
        name: name.into(),
        element: Element::Normal,
        base_hp: 50,
        base: BaseStats::new(50, 50, 50, 50, 50),
        catch_rate: 255,
        base_exp: 40,
        learnset: vec![
            LearnEntry {
                level: 1,
                skill: TACKLE,
            },
            LearnEntry {
                level: 1,
                skill: GROWL,
            },
            LearnEntry {
                level: 1,
                skill: TOXIN,
            },
        ],
        abilities: Vec::new(),
    }
}

/// Two Normal species, three skills, one wild slot, one trainer slot and a
/// single-HP boss. Rules are free of randomness.
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.set_rules(BattleConfig::deterministic());

    catalog.add_creature(species(STARTER, "sproutling"));
    catalog.add_creature(species(WILD, "burrowmole"));

    catalog.add_skill(SkillData {
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
    });
    catalog.add_skill(SkillData {
        id: GROWL,
        name: "growl".into(),
        element: Element::Normal,
        category: SkillCategory::Status,
        power: 0,
        accuracy: 100,
        max_uses: 40,
        priority: 0,
        sure_hit: true,
        effect: None,
    });
    catalog.add_skill(SkillData {
        id: TOXIN,
        name: "toxin".into(),
        element: Element::Normal,
        category: SkillCategory::Status,
        power: 0,
        accuracy: 100,
        max_uses: 20,
        priority: 0,
        sure_hit: true,
        effect: Some(EffectDescriptor::new(90, &[Ailment::Poison as i32, 100, 10])),
    });

    catalog.add_encounter(EncounterSlot {
        slot: WILD_SLOT,
        name: "tall grass".into(),
        party: vec![EncounterMember {
            species: WILD,
            level: 5,
            skills: vec![TACKLE],
        }],
        wild: true,
    });
    catalog.add_encounter(EncounterSlot {
        slot: TRAINER_SLOT,
        name: "youngster".into(),
        party: vec![EncounterMember {
            species: WILD,
            level: 5,
            skills: vec![TACKLE],
        }],
        wild: false,
    });

    catalog.add_boss(BossTemplate {
        id: BOSS,
        name: "glass golem".into(),
        species: WILD,
        level: 5,
        iv: 0,
        max_hp: Some(1),
        skills: vec![TACKLE],
        abilities: Vec::new(),
        drops: vec![DropEntry {
            item: TROPHY,
            chance: 100,
            quantity: 2,
        }],
        exp: 500,
    });

    for item in [
        ItemData {
            id: ORB,
            name: "sure orb".into(),
            kind: ItemKind::Capture { bonus_pct: 400 },
        },
        ItemData {
            id: POTION,
            name: "potion".into(),
            kind: ItemKind::Heal { amount: 20 },
        },
    ] {
        catalog.add_item(item);
    }
    catalog
}

/// Level-`level` starter owned by whoever holds `catch_time`.
pub fn starter(catch_time: u64, level: u8) -> OwnedCreature {
    OwnedCreature::new(STARTER, CatchTime(catch_time), level)
}

pub struct Harness {
    pub party: Arc<InMemoryPartyStore>,
    pub services: BattleServices,
    pub orchestrator: Arc<BattleOrchestrator>,
}

/// Services over [`catalog`] with a fixed seed and an empty party store.
pub fn harness() -> Harness {
    let party = Arc::new(InMemoryPartyStore::new());
    let config = ServerConfig::default().with_rng_seed(42);
    let services = BattleServices::new(Arc::new(catalog()), party.clone(), config);
    let orchestrator = Arc::new(BattleOrchestrator::new(services.clone()));
    Harness {
        party,
        services,
        orchestrator,
    }
}

/// The battle-level cause of a rejected command.
pub fn command_error(err: ServiceError) -> CommandError {
    err.as_command()
        .cloned()
        .unwrap_or_else(|| panic!("expected a command error, got {err}"))
}

/// Everything published so far on one receiver.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

impl Harness {
    pub fn add_player(
        &self,
        player: PlayerId,
        creatures: Vec<OwnedCreature>,
        items: &[(ItemId, u32)],
    ) {
        self.party
            .insert_player(player, creatures, items.iter().copied())
            .expect("player registered");
    }
}
