//! Outstanding PvP invites.
use std::collections::HashSet;

use battle_core::{ErrorSeverity, GameError, PlayerId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InviteError {
    #[error("cannot invite yourself")]
    SelfInvite,

    #[error("{0} is already in battle")]
    TargetInBattle(PlayerId),

    #[error("{from} has already invited {to}")]
    AlreadyInvited { from: PlayerId, to: PlayerId },

    #[error("no invite from {from} to {to}")]
    NotFound { from: PlayerId, to: PlayerId },
}

impl GameError for InviteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            InviteError::SelfInvite => ErrorSeverity::Validation,
            InviteError::TargetInBattle(_)
            | InviteError::AlreadyInvited { .. }
            | InviteError::NotFound { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            InviteError::SelfInvite => "INVITE_SELF",
            InviteError::TargetInBattle(_) => "INVITE_TARGET_IN_BATTLE",
            InviteError::AlreadyInvited { .. } => "INVITE_ALREADY_SENT",
            InviteError::NotFound { .. } => "INVITE_NOT_FOUND",
        }
    }
}

/// Pending invites as `(from, to)` pairs. Every invite is consumed by exactly
/// one accept, decline, or cancel.
#[derive(Debug, Default)]
pub struct InviteBook {
    invites: HashSet<(PlayerId, PlayerId)>,
}

impl InviteBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an invite. The caller checks that the target is free.
    pub fn invite(&mut self, from: PlayerId, to: PlayerId) -> Result<(), InviteError> {
        if from == to {
            return Err(InviteError::SelfInvite);
        }
        if !self.invites.insert((from, to)) {
            return Err(InviteError::AlreadyInvited { from, to });
        }
        Ok(())
    }

    /// Consumes the invite from `from` to `to`.
    pub fn take(&mut self, from: PlayerId, to: PlayerId) -> Result<(), InviteError> {
        if self.invites.remove(&(from, to)) {
            Ok(())
        } else {
            Err(InviteError::NotFound { from, to })
        }
    }

    pub fn contains(&self, from: PlayerId, to: PlayerId) -> bool {
        self.invites.contains(&(from, to))
    }

    /// Drops every invite sent by or to `player`. Returns how many were dropped.
    pub fn clear(&mut self, player: PlayerId) -> usize {
        let before = self.invites.len();
        self.invites
            .retain(|(from, to)| *from != player && *to != player);
        before - self.invites.len()
    }

    pub fn len(&self) -> usize {
        self.invites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: PlayerId = PlayerId(1);
    const GUEST: PlayerId = PlayerId(2);
    const OTHER: PlayerId = PlayerId(3);

    #[test]
    fn self_invite_is_rejected() {
        let mut book = InviteBook::new();
        assert_eq!(book.invite(HOST, HOST), Err(InviteError::SelfInvite));
        assert!(book.is_empty());
    }

    #[test]
    fn invite_is_consumed_once() {
        let mut book = InviteBook::new();
        book.invite(HOST, GUEST).unwrap();
        assert_eq!(
            book.invite(HOST, GUEST),
            Err(InviteError::AlreadyInvited { from: HOST, to: GUEST })
        );

        book.take(HOST, GUEST).unwrap();
        assert_eq!(
            book.take(HOST, GUEST),
            Err(InviteError::NotFound { from: HOST, to: GUEST })
        );
    }

    #[test]
    fn clearing_a_player_drops_both_directions() {
        let mut book = InviteBook::new();
        book.invite(HOST, GUEST).unwrap();
        book.invite(OTHER, HOST).unwrap();
        book.invite(OTHER, GUEST).unwrap();

        assert_eq!(book.clear(HOST), 2);
        assert!(book.contains(OTHER, GUEST));
        assert_eq!(book.len(), 1);
    }
}
