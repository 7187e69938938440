//! Cloneable façade for issuing one player's commands.
//!
//! [`PlayerHandle`] hides channel plumbing and offers async helpers for every
//! inbound command, plus event subscriptions by topic.
use battle_core::{
    BattleAction, BattleId, BattleState, BossId, CatchTime, ItemId, PlayerId, SkillId,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use super::errors::{Result, ServiceError};
use crate::events::{Event, EventBus, Topic};
use crate::pvp::Submission;
use crate::workers::Command;

/// Client-facing handle for one connected player
#[derive(Clone)]
pub struct PlayerHandle {
    player: PlayerId,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl PlayerHandle {
    pub(crate) fn new(
        player: PlayerId,
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            player,
            command_tx,
            event_bus,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| ServiceError::CommandChannelClosed)?;

        reply_rx.await.map_err(ServiceError::ReplyChannelClosed)
    }

    pub async fn challenge_npc(&self, slot: u32) -> Result<BattleId> {
        self.request(|reply| Command::ChallengeNpc { slot, reply }).await?
    }

    pub async fn challenge_boss(&self, boss: BossId) -> Result<BattleId> {
        self.request(|reply| Command::ChallengeBoss { boss, reply }).await?
    }

    pub async fn submit(&self, action: BattleAction) -> Result<Submission> {
        self.request(|reply| Command::Submit { action, reply }).await?
    }

    pub async fn use_skill(&self, skill: SkillId) -> Result<Submission> {
        self.submit(BattleAction::Skill(skill)).await
    }

    pub async fn switch_to(&self, target: CatchTime) -> Result<Submission> {
        self.submit(BattleAction::Switch(target)).await
    }

    pub async fn use_item(&self, item: ItemId) -> Result<Submission> {
        self.submit(BattleAction::UseItem(item)).await
    }

    pub async fn attempt_capture(&self, item: ItemId) -> Result<Submission> {
        self.submit(BattleAction::Capture(item)).await
    }

    pub async fn flee(&self) -> Result<Submission> {
        self.submit(BattleAction::Flee).await
    }

    pub async fn invite(&self, target: PlayerId) -> Result<()> {
        self.request(|reply| Command::Invite { target, reply }).await?
    }

    pub async fn accept(&self, from: PlayerId) -> Result<BattleId> {
        self.request(|reply| Command::Accept { from, reply }).await?
    }

    pub async fn decline(&self, from: PlayerId) -> Result<()> {
        self.request(|reply| Command::Decline { from, reply }).await?
    }

    pub async fn cancel(&self, target: PlayerId) -> Result<()> {
        self.request(|reply| Command::Cancel { target, reply }).await?
    }

    /// Query the current battle (read-only snapshot)
    pub async fn query_state(&self) -> Result<BattleState> {
        self.request(|reply| Command::QueryState { reply }).await?
    }

    /// Tears down the player's battle and stops the worker.
    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Battle` - round-level battle events
    /// - `Topic::Outcome` - battle start and end with rewards
    /// - `Topic::Lobby` - invites
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }
}

/// A player's handle together with the worker task behind it.
pub struct PlayerConnection {
    handle: PlayerHandle,
    worker: JoinHandle<()>,
}

impl PlayerConnection {
    pub(crate) fn new(handle: PlayerHandle, worker: JoinHandle<()>) -> Self {
        Self { handle, worker }
    }

    pub fn handle(&self) -> &PlayerHandle {
        &self.handle
    }

    /// Disconnects the player and waits for the worker to stop.
    pub async fn close(self) -> Result<()> {
        self.handle.disconnect().await?;
        self.worker.await.map_err(ServiceError::WorkerJoin)
    }
}

impl std::ops::Deref for PlayerConnection {
    type Target = PlayerHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
