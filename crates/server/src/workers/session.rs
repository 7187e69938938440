//! Per-player worker that serializes a player's commands.
//!
//! Receives commands from [`PlayerHandle`](crate::api::PlayerHandle), runs
//! them against the orchestrator, and replies on a oneshot channel. When the
//! command channel closes without an explicit disconnect, the player is torn
//! down as if they had disconnected.

use std::sync::Arc;

use battle_core::{BattleAction, BattleId, BattleState, BossId, PlayerId};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::api::Result;
use crate::orchestrator::BattleOrchestrator;
use crate::pvp::Submission;

/// Commands that can be sent to a session worker
pub enum Command {
    ChallengeNpc {
        slot: u32,
        reply: oneshot::Sender<Result<BattleId>>,
    },
    ChallengeBoss {
        boss: BossId,
        reply: oneshot::Sender<Result<BattleId>>,
    },
    Submit {
        action: BattleAction,
        reply: oneshot::Sender<Result<Submission>>,
    },
    Invite {
        target: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    Accept {
        from: PlayerId,
        reply: oneshot::Sender<Result<BattleId>>,
    },
    Decline {
        from: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    Cancel {
        target: PlayerId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Query the current battle (read-only).
    QueryState {
        reply: oneshot::Sender<Result<BattleState>>,
    },
    /// Tear down and stop the worker.
    Disconnect { reply: oneshot::Sender<()> },
}

fn send<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "battle::worker", command, "reply channel closed (caller dropped)");
    }
}

pub struct SessionWorker {
    player: PlayerId,
    orchestrator: Arc<BattleOrchestrator>,
    command_rx: mpsc::Receiver<Command>,
}

impl SessionWorker {
    pub fn new(
        player: PlayerId,
        orchestrator: Arc<BattleOrchestrator>,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            player,
            orchestrator,
            command_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if !self.handle_command(cmd).await {
                        break;
                    }
                }
                else => {
                    self.orchestrator.disconnect(self.player).await;
                    break;
                }
            }
        }
        debug!(target: "battle::worker", player = %self.player, "session worker stopped");
    }

    /// Returns false once the worker should stop.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        let player = self.player;
        let orchestrator = &self.orchestrator;
        match cmd {
            Command::ChallengeNpc { slot, reply } => {
                let result = orchestrator.challenge_npc(player, slot).await;
                send(reply, result, "ChallengeNpc");
            }
            Command::ChallengeBoss { boss, reply } => {
                let result = orchestrator.challenge_boss(player, boss).await;
                send(reply, result, "ChallengeBoss");
            }
            Command::Submit { action, reply } => {
                let result = orchestrator.submit(player, action).await;
                send(reply, result, "Submit");
            }
            Command::Invite { target, reply } => {
                let result = orchestrator.invite(player, target).await;
                send(reply, result, "Invite");
            }
            Command::Accept { from, reply } => {
                let result = orchestrator.accept(player, from).await;
                send(reply, result, "Accept");
            }
            Command::Decline { from, reply } => {
                let result = orchestrator.decline(player, from).await;
                send(reply, result, "Decline");
            }
            Command::Cancel { target, reply } => {
                let result = orchestrator.cancel(player, target).await;
                send(reply, result, "Cancel");
            }
            Command::QueryState { reply } => {
                let result = orchestrator.battle_state(player).await;
                send(reply, result, "QueryState");
            }
            Command::Disconnect { reply } => {
                orchestrator.disconnect(player).await;
                send(reply, (), "Disconnect");
                return false;
            }
        }
        true
    }
}
