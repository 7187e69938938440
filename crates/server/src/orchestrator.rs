//! Public surface for inbound battle commands.
//!
//! The orchestrator maps each player to at most one active battle. Starting
//! a new battle tears the old one down first; tearing down a PvP room
//! forfeits it for the leaving player.
use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{
    BattleAction, BattleId, BattleState, BossId, CommandError, PlayerId, Side,
};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::api::{PlayerConnection, PlayerHandle, Result};
use crate::context::BattleServices;
use crate::events::{Event, LobbyEvent};
use crate::pvp::{InviteBook, InviteError, PvpRoom, Submission};
use crate::session::BattleSession;
use crate::workers::SessionWorker;

#[derive(Clone)]
enum ActiveBattle {
    Pve {
        id: BattleId,
        session: Arc<Mutex<BattleSession>>,
    },
    Pvp {
        room: Arc<PvpRoom>,
        side: Side,
    },
}

impl ActiveBattle {
    fn id(&self) -> BattleId {
        match self {
            ActiveBattle::Pve { id, .. } => *id,
            ActiveBattle::Pvp { room, .. } => room.id(),
        }
    }
}

pub struct BattleOrchestrator {
    services: BattleServices,
    battles: Mutex<HashMap<PlayerId, ActiveBattle>>,
    invites: Mutex<InviteBook>,
}

impl BattleOrchestrator {
    pub fn new(services: BattleServices) -> Self {
        Self {
            services,
            battles: Mutex::new(HashMap::new()),
            invites: Mutex::new(InviteBook::new()),
        }
    }

    pub fn services(&self) -> &BattleServices {
        &self.services
    }

    /// Spawns a session worker for `player` and returns its handle.
    pub fn connect(self: &Arc<Self>, player: PlayerId) -> PlayerConnection {
        let (command_tx, command_rx) = mpsc::channel(self.services.config().command_buffer);
        let worker = SessionWorker::new(player, Arc::clone(self), command_rx);
        let task = tokio::spawn(worker.run());
        info!(target: "battle::orchestrator", %player, "player connected");

        let handle = PlayerHandle::new(player, command_tx, self.services.events().clone());
        PlayerConnection::new(handle, task)
    }

    // ========================================================================
    // PvE
    // ========================================================================

    pub async fn challenge_npc(&self, player: PlayerId, slot: u32) -> Result<BattleId> {
        self.services
            .env()
            .encounter(slot)
            .map_err(|_| CommandError::UnknownEncounter(slot))?;
        self.teardown(player).await;
        let session = BattleSession::challenge_npc(&self.services, player, slot)?;
        Ok(self.install(session).await)
    }

    pub async fn challenge_boss(&self, player: PlayerId, boss: BossId) -> Result<BattleId> {
        self.services
            .env()
            .boss(boss)
            .map_err(|_| CommandError::UnknownBoss(boss))?;
        self.teardown(player).await;
        let session = BattleSession::challenge_boss(&self.services, player, boss)?;
        Ok(self.install(session).await)
    }

    /// Registers an already created session, tearing down the player's
    /// previous battle.
    pub async fn install(&self, session: BattleSession) -> BattleId {
        let player = session.player();
        let id = session.id();
        self.teardown(player).await;
        let displaced = self.battles.lock().await.insert(
            player,
            ActiveBattle::Pve {
                id,
                session: Arc::new(Mutex::new(session)),
            },
        );
        // another command for this player landed between teardown and insert
        if let Some(previous) = displaced {
            self.end(player, previous).await;
        }
        id
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Routes `action` to the player's battle.
    pub async fn submit(&self, player: PlayerId, action: BattleAction) -> Result<Submission> {
        let battle = self
            .battles
            .lock()
            .await
            .get(&player)
            .cloned()
            .ok_or(CommandError::NoActiveBattle)?;

        match battle {
            ActiveBattle::Pve { id, session } => {
                let mut session = session.lock().await;
                let report = session.submit(action).await?;
                let finished = session.is_finished();
                drop(session);
                if finished {
                    self.release(player, id).await;
                }
                Ok(Submission::Resolved(report))
            }
            ActiveBattle::Pvp { room, side } => {
                let submission = room.submit(side, action).await?;
                let decided = submission
                    .report()
                    .is_some_and(|report| report.outcome().is_some());
                if decided {
                    for participant in room.players() {
                        self.release(participant, room.id()).await;
                    }
                }
                Ok(submission)
            }
        }
    }

    /// The player left: any battle is lost and their invites are dropped.
    pub async fn disconnect(&self, player: PlayerId) {
        let dropped = self.invites.lock().await.clear(player);
        let battle = self.teardown(player).await;
        info!(target: "battle::orchestrator", %player, ?battle, dropped, "player disconnected");
    }

    /// Read-only copy of the player's current battle.
    pub async fn battle_state(&self, player: PlayerId) -> Result<BattleState> {
        let battle = self
            .battles
            .lock()
            .await
            .get(&player)
            .cloned()
            .ok_or(CommandError::NoActiveBattle)?;
        Ok(match battle {
            ActiveBattle::Pve { session, .. } => session.lock().await.state().clone(),
            ActiveBattle::Pvp { room, .. } => room.snapshot().await,
        })
    }

    pub async fn active_battle(&self, player: PlayerId) -> Option<BattleId> {
        self.battles.lock().await.get(&player).map(ActiveBattle::id)
    }

    pub async fn in_battle(&self, player: PlayerId) -> bool {
        self.battles.lock().await.contains_key(&player)
    }

    /// The PvP room the player is in, if any.
    pub async fn room(&self, player: PlayerId) -> Option<Arc<PvpRoom>> {
        match self.battles.lock().await.get(&player) {
            Some(ActiveBattle::Pvp { room, .. }) => Some(Arc::clone(room)),
            _ => None,
        }
    }

    // ========================================================================
    // Invites
    // ========================================================================

    pub async fn invite(&self, from: PlayerId, to: PlayerId) -> Result<()> {
        if from != to && self.in_battle(to).await {
            return Err(InviteError::TargetInBattle(to).into());
        }
        self.invites.lock().await.invite(from, to)?;
        debug!(target: "battle::orchestrator", %from, %to, "invite sent");
        self.publish(LobbyEvent::InviteSent { from, to });
        Ok(())
    }

    /// Accepts `from`'s invite and opens a room with `from` as home.
    ///
    /// The accepting player's current battle is torn down; an inviter who
    /// has since entered a battle cannot be joined. The inviter check and
    /// the room registration happen under one `battles` lock.
    pub async fn accept(&self, player: PlayerId, from: PlayerId) -> Result<BattleId> {
        {
            let mut invites = self.invites.lock().await;
            if !invites.contains(from, player) {
                return Err(InviteError::NotFound { from, to: player }.into());
            }
            if self.in_battle(from).await {
                return Err(InviteError::TargetInBattle(from).into());
            }
            invites.take(from, player)?;
        }
        self.teardown(player).await;

        let (room, displaced) = {
            let mut battles = self.battles.lock().await;
            if battles.contains_key(&from) {
                debug!(
                    target: "battle::orchestrator",
                    %from,
                    to = %player,
                    "inviter entered a battle before the room opened"
                );
                return Err(InviteError::TargetInBattle(from).into());
            }
            let room = Arc::new(PvpRoom::open(&self.services, from, player)?);
            battles.insert(
                from,
                ActiveBattle::Pvp {
                    room: Arc::clone(&room),
                    side: Side::Home,
                },
            );
            let displaced = battles.insert(
                player,
                ActiveBattle::Pvp {
                    room: Arc::clone(&room),
                    side: Side::Away,
                },
            );
            (room, displaced)
        };
        if let Some(previous) = displaced {
            self.end(player, previous).await;
        }

        let id = room.id();
        self.publish(LobbyEvent::InviteAccepted {
            from,
            to: player,
            battle: id,
        });
        Ok(id)
    }

    pub async fn decline(&self, player: PlayerId, from: PlayerId) -> Result<()> {
        self.invites.lock().await.take(from, player)?;
        self.publish(LobbyEvent::InviteDeclined { from, to: player });
        Ok(())
    }

    pub async fn cancel(&self, player: PlayerId, to: PlayerId) -> Result<()> {
        self.invites.lock().await.take(player, to)?;
        self.publish(LobbyEvent::InviteCancelled { from: player, to });
        Ok(())
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Ends the player's current battle as a loss. PvP rooms are forfeited
    /// and released for both players.
    async fn teardown(&self, player: PlayerId) -> Option<BattleId> {
        let battle = self.battles.lock().await.remove(&player)?;
        Some(self.end(player, battle).await)
    }

    /// Concludes a battle already removed from the player's entry.
    async fn end(&self, player: PlayerId, battle: ActiveBattle) -> BattleId {
        let id = battle.id();
        match battle {
            ActiveBattle::Pve { session, .. } => {
                session.lock().await.on_owner_disconnect();
            }
            ActiveBattle::Pvp { room, side } => {
                room.forfeit(side).await;
                self.release(room.player(side.opponent()), id).await;
            }
        }
        debug!(target: "battle::orchestrator", %player, battle = %id, "battle torn down");
        id
    }

    /// Drops the player's entry if it still points at `battle`.
    async fn release(&self, player: PlayerId, battle: BattleId) {
        let mut battles = self.battles.lock().await;
        if battles.get(&player).is_some_and(|active| active.id() == battle) {
            battles.remove(&player);
        }
    }

    fn publish(&self, event: LobbyEvent) {
        self.services.events().publish(Event::Lobby(event));
    }
}
