//! Match outcome signal.

use serde::{Deserialize, Serialize};

use super::side::Side;

/// Result of a completed match, emitted exactly once when the terminal
/// check first fires (or when a forfeit is injected).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// The winning side, or `None` for a draw.
    pub winner: Option<Side>,
    /// Whether the match ended without a winner.
    pub is_draw: bool,
}

impl MatchOutcome {
    /// A win for the given side.
    #[must_use]
    pub const fn winner(side: Side) -> Self {
        Self {
            winner: Some(side),
            is_draw: false,
        }
    }

    /// A draw.
    #[must_use]
    pub const fn draw() -> Self {
        Self {
            winner: None,
            is_draw: true,
        }
    }

    /// Check if a side won.
    #[must_use]
    pub fn is_winner(&self, side: Side) -> bool {
        self.winner == Some(side)
    }

    /// The losing side, if there was a winner.
    #[must_use]
    pub fn loser(&self) -> Option<Side> {
        self.winner.map(Side::opponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner() {
        let outcome = MatchOutcome::winner(Side::First);
        assert!(outcome.is_winner(Side::First));
        assert!(!outcome.is_winner(Side::Second));
        assert_eq!(outcome.loser(), Some(Side::Second));
        assert!(!outcome.is_draw);
    }

    #[test]
    fn test_draw() {
        let outcome = MatchOutcome::draw();
        assert!(outcome.is_draw);
        assert!(!outcome.is_winner(Side::First));
        assert!(!outcome.is_winner(Side::Second));
        assert_eq!(outcome.loser(), None);
    }
}
