//! Common error infrastructure for battle-core.
//!
//! Domain errors (`CommandError`, `EffectBuildError`, `OracleError`) live next
//! to the code that raises them; this module provides the classification they
//! share so the server can map them to user-facing codes and log levels.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The caller may retry with a different command.
    ///
    /// Examples: skill out of uses, switch target fainted.
    Recoverable,

    /// Invalid input; retrying the same command will fail again.
    ///
    /// Examples: no active battle, capture attempted in PvP.
    Validation,

    /// Content data is missing or malformed.
    ///
    /// Examples: boss id absent from the catalog, bad effect arguments.
    Configuration,

    /// Unexpected state inconsistency; indicates a bug.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }

    /// Returns true if the caller can reasonably retry with another command.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all battle errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - `error_code` must be stable: clients switch on it
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a stable identifier for this error variant.
    fn error_code(&self) -> &'static str;
}
