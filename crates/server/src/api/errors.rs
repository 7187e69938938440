//! Unified error type surfaced by the server API.
//!
//! Wraps command validation, invite, and party-store failures together with
//! worker coordination errors so clients can bubble them up with one type.
use battle_core::{CommandError, ErrorSeverity, GameError, OracleError};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::party::PartyError;
use crate::pvp::InviteError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Invite(#[from] InviteError),

    #[error(transparent)]
    Party(#[from] PartyError),

    #[error("content lookup failed")]
    Content(#[source] OracleError),

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("action provider failed: {0}")]
    Provider(String),
}

impl ServiceError {
    /// The command error behind this failure, if it is one.
    pub fn as_command(&self) -> Option<&CommandError> {
        match self {
            ServiceError::Command(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OracleError> for ServiceError {
    fn from(err: OracleError) -> Self {
        ServiceError::Content(err)
    }
}

impl GameError for ServiceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ServiceError::Command(err) => err.severity(),
            ServiceError::Invite(err) => err.severity(),
            ServiceError::Party(err) => err.severity(),
            ServiceError::Content(err) => err.severity(),
            ServiceError::CommandChannelClosed
            | ServiceError::ReplyChannelClosed(_)
            | ServiceError::WorkerJoin(_)
            | ServiceError::Provider(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Command(err) => err.error_code(),
            ServiceError::Invite(err) => err.error_code(),
            ServiceError::Party(err) => err.error_code(),
            ServiceError::Content(err) => err.error_code(),
            ServiceError::CommandChannelClosed => "SERVER_COMMAND_CHANNEL_CLOSED",
            ServiceError::ReplyChannelClosed(_) => "SERVER_REPLY_CHANNEL_CLOSED",
            ServiceError::WorkerJoin(_) => "SERVER_WORKER_JOIN",
            ServiceError::Provider(_) => "SERVER_PROVIDER_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::SkillId;

    #[test]
    fn command_errors_keep_their_code() {
        let err = ServiceError::from(CommandError::SkillUnavailable(SkillId(4)));
        assert_eq!(err.error_code(), "BATTLE_SKILL_UNAVAILABLE");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.to_string(), "skill SkillId#4 unavailable");
    }
}
