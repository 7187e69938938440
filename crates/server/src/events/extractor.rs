//! Event extraction from turn reports.
//!
//! The resolver records everything as [`Notice`]s; this module turns a
//! [`TurnReport`] into the outbound events clients subscribe to.

use battle_core::{BattleId, Notice, TurnReport};

use super::bus::Event;
use super::types::BattleEvent;

/// Extract battle events from one resolved round.
///
/// # Event Ordering
///
/// 1. RoundStarted
/// 2. AttackResolved, in resolution order
/// 3. Notice-derived events, in the order they happened
/// 4. RoundEnded, carrying the winner once the battle is decided
pub fn extract_events(battle: BattleId, report: &TurnReport) -> Vec<Event> {
    let mut events = vec![Event::Battle(BattleEvent::RoundStarted {
        battle,
        turn: report.turn,
    })];

    events.extend(report.attacks.iter().map(|attack| {
        Event::Battle(BattleEvent::AttackResolved {
            battle,
            turn: report.turn,
            attack: attack.clone(),
        })
    }));
    events.extend(notice_events(battle, &report.notices));

    events.push(Event::Battle(BattleEvent::RoundEnded {
        battle,
        turn: report.turn,
        phase: report.phase,
        winner: report.outcome().and_then(|outcome| outcome.winner()),
    }));
    events
}

/// Events for notices raised outside a round (battle start, forced switch).
pub fn notice_events(battle: BattleId, notices: &[Notice]) -> Vec<Event> {
    notices
        .iter()
        .filter_map(|notice| notice_event(battle, notice))
        .map(Event::Battle)
        .collect()
}

fn notice_event(battle: BattleId, notice: &Notice) -> Option<BattleEvent> {
    let event = match *notice {
        Notice::Damaged {
            side,
            amount,
            cause,
        } => BattleEvent::Damaged {
            battle,
            side,
            amount,
            cause,
        },
        Notice::Healed { side, amount } => BattleEvent::Healed {
            battle,
            side,
            amount,
        },
        Notice::Prevented { side, reason } => BattleEvent::Prevented {
            battle,
            side,
            reason,
        },
        Notice::AilmentApplied { side, ailment } => BattleEvent::AilmentApplied {
            battle,
            side,
            ailment,
        },
        Notice::AilmentCleared { side, ailment } => BattleEvent::AilmentCleared {
            battle,
            side,
            ailment,
        },
        Notice::StageChanged { side, stat, delta } => BattleEvent::StageChanged {
            battle,
            side,
            stat,
            delta,
        },
        Notice::Switched { side, catch_time } => BattleEvent::Switched {
            battle,
            side,
            catch_time,
        },
        Notice::Fainted { side, catch_time } => BattleEvent::Fainted {
            battle,
            side,
            catch_time,
        },
        Notice::ItemUsed { side, item } => BattleEvent::ItemUsed { battle, side, item },
        Notice::CaptureAttempted {
            side,
            chance,
            success,
        } => BattleEvent::CaptureAttempted {
            battle,
            side,
            chance,
            success,
        },
        _ => return None,
    };
    Some(event)
}
