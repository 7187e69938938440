//! Player-owned creatures and inventory.
//!
//! Sessions read parties through [`PartyStore`] when a battle starts and write
//! HP, items, experience, and captures back when it ends.
use std::collections::HashMap;
use std::sync::RwLock;

use battle_core::{
    CatchTime, CreatureId, CreatureSpec, ErrorSeverity, GameError, ItemId, PlayerId, SkillId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PartyError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    #[error("party store lock poisoned")]
    LockPoisoned,

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
}

impl GameError for PartyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            PartyError::LockPoisoned => ErrorSeverity::Internal,
            PartyError::UnknownPlayer(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            PartyError::LockPoisoned => "PARTY_LOCK_POISONED",
            PartyError::UnknownPlayer(_) => "PARTY_UNKNOWN_PLAYER",
        }
    }
}

/// One creature in a player's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCreature {
    pub species: CreatureId,
    pub catch_time: CatchTime,
    pub level: u8,
    #[serde(default)]
    pub iv: u8,
    /// Current HP; `None` means full.
    #[serde(default)]
    pub hp: Option<u32>,
    #[serde(default)]
    pub skills: Vec<SkillId>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub exp: u32,
}

impl OwnedCreature {
    pub fn new(species: CreatureId, catch_time: CatchTime, level: u8) -> Self {
        Self {
            species,
            catch_time,
            level,
            iv: 0,
            hp: None,
            skills: Vec::new(),
            nickname: None,
            exp: 0,
        }
    }

    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_skills(mut self, skills: impl Into<Vec<SkillId>>) -> Self {
        self.skills = skills.into();
        self
    }

    /// Battle spec for spawning this creature.
    pub fn spec(&self) -> CreatureSpec {
        CreatureSpec {
            species: self.species,
            catch_time: self.catch_time,
            level: self.level,
            iv: self.iv,
            hp: self.hp,
            skills: self.skills.clone(),
            nickname: self.nickname.clone(),
        }
    }
}

/// Persistence collaborator for parties and inventories.
pub trait PartyStore: Send + Sync {
    /// The player's battle party, lead first.
    fn party(&self, player: PlayerId) -> Result<Vec<OwnedCreature>>;

    /// Writes current HP back for each listed creature.
    fn persist_hp(&self, player: PlayerId, hp: &[(CatchTime, u32)]) -> Result<()>;

    /// Removes one unit of `item`. Returns false if the player has none.
    fn consume_item(&self, player: PlayerId, item: ItemId) -> Result<bool>;

    fn item_count(&self, player: PlayerId, item: ItemId) -> Result<u32>;

    fn add_creature(&self, player: PlayerId, creature: OwnedCreature) -> Result<()>;

    fn grant_items(&self, player: PlayerId, item: ItemId, quantity: u32) -> Result<()>;

    /// Adds `exp` to each listed creature.
    fn grant_exp(&self, player: PlayerId, creatures: &[CatchTime], exp: u32) -> Result<()>;
}

#[derive(Debug, Default)]
struct PlayerRecord {
    creatures: Vec<OwnedCreature>,
    items: HashMap<ItemId, u32>,
}

/// In-memory implementation of PartyStore for tests and local runs.
pub struct InMemoryPartyStore {
    players: RwLock<HashMap<PlayerId, PlayerRecord>>,
}

impl InMemoryPartyStore {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a player, replacing any previous record.
    pub fn insert_player(
        &self,
        player: PlayerId,
        creatures: Vec<OwnedCreature>,
        items: impl IntoIterator<Item = (ItemId, u32)>,
    ) -> Result<()> {
        let mut players = self
            .players
            .write()
            .map_err(|_| PartyError::LockPoisoned)?;
        players.insert(
            player,
            PlayerRecord {
                creatures,
                items: items.into_iter().collect(),
            },
        );
        Ok(())
    }

    /// All creatures the player owns, in collection order.
    pub fn creatures(&self, player: PlayerId) -> Result<Vec<OwnedCreature>> {
        self.read(player, |record| record.creatures.clone())
    }

    fn read<T>(&self, player: PlayerId, f: impl FnOnce(&PlayerRecord) -> T) -> Result<T> {
        let players = self
            .players
            .read()
            .map_err(|_| PartyError::LockPoisoned)?;
        let record = players
            .get(&player)
            .ok_or(PartyError::UnknownPlayer(player))?;
        Ok(f(record))
    }

    fn write<T>(&self, player: PlayerId, f: impl FnOnce(&mut PlayerRecord) -> T) -> Result<T> {
        let mut players = self
            .players
            .write()
            .map_err(|_| PartyError::LockPoisoned)?;
        let record = players
            .get_mut(&player)
            .ok_or(PartyError::UnknownPlayer(player))?;
        Ok(f(record))
    }
}

impl Default for InMemoryPartyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PartyStore for InMemoryPartyStore {
    fn party(&self, player: PlayerId) -> Result<Vec<OwnedCreature>> {
        self.read(player, |record| {
            record
                .creatures
                .iter()
                .take(battle_core::BattleConfig::MAX_PARTY)
                .cloned()
                .collect()
        })
    }

    fn persist_hp(&self, player: PlayerId, hp: &[(CatchTime, u32)]) -> Result<()> {
        self.write(player, |record| {
            for (catch_time, value) in hp {
                if let Some(creature) = record
                    .creatures
                    .iter_mut()
                    .find(|c| c.catch_time == *catch_time)
                {
                    creature.hp = Some(*value);
                }
            }
        })
    }

    fn consume_item(&self, player: PlayerId, item: ItemId) -> Result<bool> {
        self.write(player, |record| match record.items.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
    }

    fn item_count(&self, player: PlayerId, item: ItemId) -> Result<u32> {
        self.read(player, |record| record.items.get(&item).copied().unwrap_or(0))
    }

    fn add_creature(&self, player: PlayerId, creature: OwnedCreature) -> Result<()> {
        self.write(player, |record| record.creatures.push(creature))
    }

    fn grant_items(&self, player: PlayerId, item: ItemId, quantity: u32) -> Result<()> {
        self.write(player, |record| {
            let count = record.items.entry(item).or_insert(0);
            *count = count.saturating_add(quantity);
        })
    }

    fn grant_exp(&self, player: PlayerId, creatures: &[CatchTime], exp: u32) -> Result<()> {
        self.write(player, |record| {
            for creature in record
                .creatures
                .iter_mut()
                .filter(|c| creatures.contains(&c.catch_time))
            {
                creature.exp = creature.exp.saturating_add(exp);
            }
        })
    }
}
