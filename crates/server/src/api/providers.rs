//! Asynchronous abstraction for sourcing the opposing side's actions.
//!
//! PvE sessions ask an [`ActionProvider`] for the NPC or boss move each round,
//! so battles can run against random policies, scripted fixtures, or anything
//! smarter plugged in later.
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use battle_core::{BattleAction, BattleEnv, BattleState, ContentCatalog, Side, SkillId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::errors::{Result, ServiceError};

/// Trait for choosing a side's action from the current battle state.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Chooses an action for `side`. `None` leaves the side idle this round.
    async fn choose(&self, side: Side, state: &BattleState) -> Result<Option<BattleAction>>;
}

fn usable_skills(state: &BattleState, side: Side) -> Vec<SkillId> {
    state
        .active(side)
        .skills()
        .iter()
        .filter(|slot| slot.is_usable())
        .map(|slot| slot.skill)
        .collect()
}

/// Picks a uniformly random usable skill.
pub struct RandomSkillProvider {
    rng: Mutex<StdRng>,
}

impl RandomSkillProvider {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl ActionProvider for RandomSkillProvider {
    async fn choose(&self, side: Side, state: &BattleState) -> Result<Option<BattleAction>> {
        let skills = usable_skills(state, side);
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ServiceError::Provider("random provider lock poisoned".into()))?;
        Ok(skills.choose(&mut *rng).copied().map(BattleAction::Skill))
    }
}

/// Always uses the highest-power usable skill. Ties go to the earlier slot.
pub struct StrongestSkillProvider {
    catalog: Arc<dyn ContentCatalog>,
}

impl StrongestSkillProvider {
    pub fn new(catalog: Arc<dyn ContentCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl ActionProvider for StrongestSkillProvider {
    async fn choose(&self, side: Side, state: &BattleState) -> Result<Option<BattleAction>> {
        let env = BattleEnv::new(self.catalog.as_ref());
        let mut best: Option<(SkillId, u32)> = None;
        for skill in usable_skills(state, side) {
            let power = env.skill(skill).map_or(0, |data| data.power);
            if best.is_none_or(|(_, top)| power > top) {
                best = Some((skill, power));
            }
        }
        Ok(best.map(|(skill, _)| BattleAction::Skill(skill)))
    }
}

/// Replays a fixed list of actions, then idles.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<BattleAction>>,
}

impl ScriptedProvider {
    pub fn new(actions: impl IntoIterator<Item = BattleAction>) -> Self {
        Self {
            script: Mutex::new(actions.into_iter().collect()),
        }
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn choose(&self, _side: Side, _state: &BattleState) -> Result<Option<BattleAction>> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| ServiceError::Provider("script lock poisoned".into()))?;
        Ok(script.pop_front())
    }
}
