//! Two-player battle rooms.
//!
//! A room owns the authoritative [`BattleState`] for both players. Each side
//! buffers one action; the second submission resolves the round under the
//! same lock that stored it, so a round resolves exactly once and the buffer
//! is empty afterwards.
use battle_core::{
    BattleAction, BattleId, BattleMode, BattleOutcome, BattlePhase, BattleRng, BattleState,
    CommandError, PlayerId, Side, TurnReport,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::Result;
use crate::context::BattleServices;
use crate::events::{BattleEvent, Event, OutcomeEvent, extract_events, notice_events};
use crate::rewards::RewardPayload;
use crate::session::{announce_start, persist_side, player_side};

/// Result of submitting an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Stored until the other side submits.
    Pending,
    /// The submission completed a round (or a forced switch).
    Resolved(TurnReport),
}

impl Submission {
    pub fn report(&self) -> Option<&TurnReport> {
        match self {
            Submission::Pending => None,
            Submission::Resolved(report) => Some(report),
        }
    }

    pub fn into_report(self) -> Option<TurnReport> {
        match self {
            Submission::Pending => None,
            Submission::Resolved(report) => Some(report),
        }
    }
}

struct RoomState {
    battle: BattleState,
    pending: [Option<BattleAction>; 2],
    concluded: bool,
}

/// A PvP battle between the inviter (home) and the invitee (away).
pub struct PvpRoom {
    id: BattleId,
    players: [PlayerId; 2],
    services: BattleServices,
    inner: Mutex<RoomState>,
}

impl PvpRoom {
    /// Spawns both parties and starts the battle.
    pub fn open(services: &BattleServices, home: PlayerId, away: PlayerId) -> Result<Self> {
        let home_side = player_side(services, home)?;
        let away_side = player_side(services, away)?;

        let id = services.next_battle_id();
        let rng = BattleRng::new(services.config().seed_for(id));
        let mut battle = BattleState::new(BattleMode::Pvp, home_side, away_side, rng);
        let opening = services.resolver().start_battle(&mut battle);

        info!(target: "battle::room", battle = %id, %home, %away, "room opened");
        announce_start(services, id, &battle, &opening);

        Ok(Self {
            id,
            players: [home, away],
            services: services.clone(),
            inner: Mutex::new(RoomState {
                battle,
                pending: [None, None],
                concluded: false,
            }),
        })
    }

    pub fn id(&self) -> BattleId {
        self.id
    }

    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }

    pub fn player(&self, side: Side) -> PlayerId {
        self.players[side.index()]
    }

    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|side| self.players[side.index()] == player)
    }

    /// Number of buffered actions.
    pub async fn pending_count(&self) -> usize {
        let room = self.inner.lock().await;
        room.pending.iter().filter(|action| action.is_some()).count()
    }

    pub async fn snapshot(&self) -> BattleState {
        self.inner.lock().await.battle.clone()
    }

    pub async fn is_finished(&self) -> bool {
        self.inner.lock().await.battle.is_finished()
    }

    /// Buffers `side`'s action, resolving the round once both are in.
    ///
    /// During a forced switch only the fainted side may submit, and its
    /// switch applies immediately. Flee resolves at once as a forfeit.
    pub async fn submit(&self, side: Side, action: BattleAction) -> Result<Submission> {
        let mut guard = self.inner.lock().await;
        let room = &mut *guard;
        if room.battle.is_finished() {
            return Err(CommandError::BattleFinished.into());
        }
        let resolver = self.services.resolver();

        if matches!(room.battle.phase(), BattlePhase::AwaitingSwitch { .. }) {
            if !room.battle.phase().awaits_switch(side) {
                return Err(CommandError::OpponentSwitching.into());
            }
            let BattleAction::Switch(target) = action else {
                return Err(CommandError::AwaitingSwitch.into());
            };
            let notices = resolver.replace_fainted(&mut room.battle, side, target)?;
            self.services
                .events()
                .publish_all(notice_events(self.id, &notices));
            let mut report = TurnReport::new(room.battle.turn());
            report.notices = notices;
            report.phase = room.battle.phase();
            return Ok(Submission::Resolved(report));
        }

        if room.pending[side.index()].is_some() {
            return Err(CommandError::AlreadySubmitted.into());
        }
        resolver.validate_action(&room.battle, side, &action)?;

        if action == BattleAction::Flee {
            room.pending = [None, None];
            let report = resolver.flee(&mut room.battle, side);
            info!(target: "battle::room", battle = %self.id, %side, "side forfeited");
            self.publish_round(room, &report);
            return Ok(Submission::Resolved(report));
        }

        if let BattleAction::UseItem(item) = action
            && !self
                .services
                .party()
                .consume_item(self.player(side), item)?
        {
            return Err(CommandError::ItemUnavailable(item).into());
        }

        room.pending[side.index()] = Some(action);
        if room.pending.iter().any(Option::is_none) {
            debug!(target: "battle::room", battle = %self.id, %side, "action buffered");
            return Ok(Submission::Pending);
        }

        let actions = std::mem::take(&mut room.pending);
        let report = resolver.resolve_round(&mut room.battle, actions)?;
        debug!(
            target: "battle::room",
            battle = %self.id,
            turn = report.turn,
            "round resolved"
        );
        self.publish_round(room, &report);
        Ok(Submission::Resolved(report))
    }

    /// `side` left the room: the other side wins and buffered actions are
    /// discarded. Returns false if the battle was already over.
    pub async fn forfeit(&self, side: Side) -> bool {
        let mut guard = self.inner.lock().await;
        let room = &mut *guard;
        room.pending = [None, None];
        if !room.battle.finish(BattleOutcome::Winner(side.opponent())) {
            return false;
        }
        info!(target: "battle::room", battle = %self.id, %side, "player disconnected");
        self.services
            .events()
            .publish(Event::Battle(BattleEvent::RoundEnded {
                battle: self.id,
                turn: room.battle.turn(),
                phase: room.battle.phase(),
                winner: Some(side.opponent()),
            }));
        self.conclude(room);
        true
    }

    fn publish_round(&self, room: &mut RoomState, report: &TurnReport) {
        self.services
            .events()
            .publish_all(extract_events(self.id, report));
        if room.battle.is_finished() {
            self.conclude(room);
        }
    }

    fn conclude(&self, room: &mut RoomState) {
        if room.concluded {
            return;
        }
        let Some(outcome) = room.battle.outcome() else {
            return;
        };
        room.concluded = true;
        for side in Side::BOTH {
            persist_side(&self.services, room.battle.side(side));
        }
        info!(target: "battle::room", battle = %self.id, ?outcome, "room closed");
        self.services
            .events()
            .publish(Event::Outcome(OutcomeEvent::BattleEnded {
                battle: self.id,
                outcome,
                rounds: room.battle.turn(),
                rewards: RewardPayload::default(),
            }));
    }
}
