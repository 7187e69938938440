//! A full round from submitted actions.
//!
//! Switches and items are applied before attacks and leave their side idle.
//! Capture and flee end the round (and possibly the battle) on their own.

use tracing::debug;

use super::{BattleAction, CommandError, TurnIntent, TurnReport, TurnResolver, capture_chance};
use crate::effect::Notice;
use crate::env::{ItemData, ItemKind};
use crate::state::{BattleMode, BattleOutcome, BattleState, ItemId, Side};

impl TurnResolver<'_> {
    /// Checks that `side` may submit `action` right now. Mutates nothing.
    pub fn validate_action(
        &self,
        state: &BattleState,
        side: Side,
        action: &BattleAction,
    ) -> Result<(), CommandError> {
        self.ensure_ongoing(state)?;
        let active = state.active(side);
        match *action {
            BattleAction::Skill(id) => {
                let usable = active.skill(id).is_some_and(|slot| slot.is_usable());
                if !usable || self.env().skill(id).is_err() {
                    return Err(CommandError::SkillUnavailable(id));
                }
            }
            BattleAction::Switch(target) => {
                state.side(side).check_switch(target)?;
            }
            BattleAction::UseItem(id) => {
                let item = self
                    .env()
                    .item(id)
                    .map_err(|_| CommandError::ItemUnavailable(id))?;
                match item.kind {
                    ItemKind::Capture { .. } => return Err(CommandError::NotApplicable),
                    ItemKind::Revive { .. } => {
                        if !state.side(side).party().iter().any(|c| c.is_fainted()) {
                            return Err(CommandError::NotApplicable);
                        }
                    }
                    ItemKind::Heal { .. } | ItemKind::RestoreUses { .. } | ItemKind::Cure => {}
                }
            }
            BattleAction::Capture(id) => {
                let capturable =
                    state.mode == BattleMode::Npc && state.side(side.opponent()).capturable;
                if !capturable {
                    return Err(CommandError::NotApplicable);
                }
                let item = self
                    .env()
                    .item(id)
                    .map_err(|_| CommandError::ItemUnavailable(id))?;
                if !matches!(item.kind, ItemKind::Capture { .. }) {
                    return Err(CommandError::NotApplicable);
                }
            }
            BattleAction::Flee => {}
        }
        Ok(())
    }

    /// Resolves one round from both sides' actions. `None` leaves a side idle.
    ///
    /// Both actions are validated before anything changes.
    pub fn resolve_round(
        &self,
        state: &mut BattleState,
        actions: [Option<BattleAction>; 2],
    ) -> Result<TurnReport, CommandError> {
        self.ensure_ongoing(state)?;
        for side in Side::BOTH {
            if let Some(action) = &actions[side.index()] {
                self.validate_action(state, side, action)?;
            }
        }

        if let Some(side) = Side::BOTH
            .into_iter()
            .find(|side| actions[side.index()] == Some(BattleAction::Flee))
        {
            return Ok(self.flee(state, side));
        }

        let mut pre = Vec::new();
        for side in Side::BOTH {
            if let Some(BattleAction::Switch(target)) = actions[side.index()] {
                pre.extend(self.switch(state, side, target)?);
            }
        }
        for side in Side::BOTH {
            if let Some(BattleAction::UseItem(id)) = actions[side.index()] {
                let item = self
                    .env()
                    .item(id)
                    .map_err(|_| CommandError::ItemUnavailable(id))?;
                pre.extend(Self::use_item(state, side, item));
            }
        }
        for side in Side::BOTH {
            if let Some(BattleAction::Capture(id)) = actions[side.index()] {
                let (notice, caught) = self.attempt_capture(state, side, id)?;
                pre.push(notice);
                if caught {
                    let mut report = TurnReport::new(state.turn());
                    report.notices = pre;
                    report.phase = state.phase();
                    return Ok(report);
                }
            }
        }

        let intents = actions.map(|action| action.map_or(TurnIntent::Idle, TurnIntent::from));
        let mut report = self.resolve_turn(state, intents)?;
        pre.append(&mut report.notices);
        report.notices = pre;
        Ok(report)
    }

    /// Ends the battle with `side` leaving. PvP treats it as a forfeit.
    pub fn flee(&self, state: &mut BattleState, side: Side) -> TurnReport {
        state.finish(BattleOutcome::Fled(side));
        let mut report = TurnReport::new(state.turn());
        report.notices.push(Notice::Fled { side });
        report.phase = state.phase();
        report
    }

    fn attempt_capture(
        &self,
        state: &mut BattleState,
        side: Side,
        item: ItemId,
    ) -> Result<(Notice, bool), CommandError> {
        let bonus = match self.env().item(item).map(|data| data.kind) {
            Ok(ItemKind::Capture { bonus_pct }) => bonus_pct,
            Ok(_) => return Err(CommandError::NotApplicable),
            Err(_) => return Err(CommandError::ItemUnavailable(item)),
        };
        let target = state.active(side.opponent());
        let catch_rate = self
            .env()
            .creature(target.species)
            .map(|template| template.catch_rate)
            .unwrap_or(0);
        let chance = capture_chance(target, catch_rate, bonus);
        let success = state.rng_mut().chance(chance);
        debug!(
            target: "battle::resolver",
            %side,
            %item,
            chance,
            success,
            "capture attempted"
        );
        if success {
            state.finish(BattleOutcome::Captured(side));
        }
        Ok((
            Notice::CaptureAttempted {
                side,
                chance,
                success,
            },
            success,
        ))
    }

    fn use_item(state: &mut BattleState, side: Side, item: &ItemData) -> Vec<Notice> {
        let mut notices = vec![Notice::ItemUsed { side, item: item.id }];
        match item.kind {
            ItemKind::Heal { amount } => {
                let healed = state.active_mut(side).heal(amount);
                if healed > 0 {
                    notices.push(Notice::Healed {
                        side,
                        amount: healed,
                    });
                }
            }
            ItemKind::RestoreUses { amount } => {
                let restored = state.active_mut(side).restore_uses(amount);
                if restored > 0 {
                    notices.push(Notice::UsesChanged {
                        side,
                        delta: i32::try_from(restored).unwrap_or(i32::MAX),
                    });
                }
            }
            ItemKind::Cure => {
                if let Some(ailment) = state.active_mut(side).cure() {
                    notices.push(Notice::AilmentCleared { side, ailment });
                }
            }
            ItemKind::Revive { percent } => {
                let party = state.side_mut(side).party_mut();
                if let Some(fallen) = party.iter_mut().find(|c| c.is_fainted()) {
                    let hp = fallen.revive(fallen.max_hp() * percent / 100);
                    notices.push(Notice::Revived { side, hp });
                }
            }
            ItemKind::Capture { .. } => {}
        }
        notices
    }
}
