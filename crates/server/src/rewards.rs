//! Battle payouts for the home player.
use battle_core::{
    BattleEnv, BattleOutcome, BattleState, CatchTime, ItemId, Side, SideOwner,
};
use serde::Serialize;
use tracing::debug;

use crate::party::OwnedCreature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemDrop {
    pub item: ItemId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewardPayload {
    /// Experience granted to each home creature that took the field.
    pub exp: u32,
    pub drops: Vec<ItemDrop>,
    pub captured: Option<OwnedCreature>,
}

impl RewardPayload {
    pub fn is_empty(&self) -> bool {
        self.exp == 0 && self.drops.is_empty() && self.captured.is_none()
    }
}

/// Computes the payout once a PvE battle is over.
///
/// Only a home win pays. Experience is the sum of `base_exp × level` over
/// defeated opponents, or the boss's fixed amount. Boss drops are rolled on
/// the battle's own stream so a replay pays the same.
pub fn compute_rewards(env: &BattleEnv<'_>, state: &mut BattleState) -> RewardPayload {
    let Some(outcome) = state.outcome() else {
        return RewardPayload::default();
    };
    if !state.mode.is_pve() || outcome.winner() != Some(Side::Home) {
        return RewardPayload::default();
    }

    let captured = match outcome {
        BattleOutcome::Captured(_) => Some(captured_creature(state)),
        _ => None,
    };

    let mut payload = RewardPayload {
        captured,
        ..RewardPayload::default()
    };

    match state.side(Side::Away).owner {
        SideOwner::Boss(id) => {
            if let Ok(boss) = env.boss(id) {
                payload.exp = boss.exp;
                for entry in &boss.drops {
                    if state.rng_mut().chance(entry.chance) {
                        payload.drops.push(ItemDrop {
                            item: entry.item,
                            quantity: entry.quantity,
                        });
                    }
                }
            }
        }
        _ => {
            let captured_at = payload.captured.as_ref().map(|c| c.catch_time);
            payload.exp = state
                .side(Side::Away)
                .party()
                .iter()
                .filter(|c| c.is_fainted() || Some(c.catch_time) == captured_at)
                .map(|c| {
                    let base = env.creature(c.species).map_or(0, |t| t.base_exp);
                    base.saturating_mul(u32::from(c.level))
                })
                .fold(0u32, u32::saturating_add);
        }
    }

    debug!(
        target: "battle::rewards",
        exp = payload.exp,
        drops = payload.drops.len(),
        captured = payload.captured.is_some(),
        "rewards computed"
    );
    payload
}

/// The opposing active as a new collection entry. Generated catch times are
/// unique server-wide, so the creature keeps its battle identity.
fn captured_creature(state: &BattleState) -> OwnedCreature {
    let target = state.active(Side::Away);
    OwnedCreature {
        species: target.species,
        catch_time: target.catch_time,
        level: target.level,
        iv: 0,
        hp: Some(target.hp()),
        skills: target.skills().iter().map(|slot| slot.skill).collect(),
        nickname: None,
        exp: 0,
    }
}

/// Home creatures that took the field at least once.
pub fn participants(state: &BattleState) -> Vec<CatchTime> {
    state
        .side(Side::Home)
        .party()
        .iter()
        .filter(|c| c.entered)
        .map(|c| c.catch_time)
        .collect()
}
