//! Rule-engine error taxonomy.
//!
//! The three recoverable kinds (`IllegalMove`, `WrongTurn`, `MalformedMove`)
//! leave the submitted-against state untouched and are reported to the
//! submitting side only. `StateCorruption` means a state invariant no longer
//! holds; the match must be aborted and flagged, never patched up.

use serde::{Deserialize, Serialize};

use super::side::Side;

/// Why a move submission was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum RulesError {
    /// The move fails a geometric, phase, or ownership check.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The move was submitted by a side that is not to move.
    #[error("{0} moved out of turn")]
    WrongTurn(Side),

    /// The move envelope is missing or misusing a required field.
    #[error("malformed move: {0}")]
    MalformedMove(String),

    /// A state invariant is violated. Fatal to the match.
    #[error("state corruption: {0}")]
    StateCorruption(String),
}

impl RulesError {
    /// Shorthand for an [`RulesError::IllegalMove`].
    pub fn illegal(reason: impl Into<String>) -> Self {
        RulesError::IllegalMove(reason.into())
    }

    /// Shorthand for a [`RulesError::MalformedMove`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        RulesError::MalformedMove(reason.into())
    }

    /// Shorthand for a [`RulesError::StateCorruption`].
    pub fn corrupt(reason: impl Into<String>) -> Self {
        RulesError::StateCorruption(reason.into())
    }

    /// Whether the match can continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RulesError::StateCorruption(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RulesError::illegal("cell 4 is occupied");
        assert_eq!(err.to_string(), "illegal move: cell 4 is occupied");

        let err = RulesError::WrongTurn(Side::Second);
        assert_eq!(err.to_string(), "second side moved out of turn");
    }

    #[test]
    fn test_recoverable() {
        assert!(RulesError::illegal("x").is_recoverable());
        assert!(RulesError::WrongTurn(Side::First).is_recoverable());
        assert!(RulesError::malformed("x").is_recoverable());
        assert!(!RulesError::corrupt("piece count mismatch").is_recoverable());
    }
}
