//! Rules trait implemented by every game module.
//!
//! Each game implements `GameRules` to define:
//! - Which moves are legal for a side
//! - How a move transforms the canonical state
//! - When the match is over
//!
//! States are immutable-by-convention: `apply_move` consumes the current
//! state by reference and returns a fresh one, so a failed application can
//! never leave a partially-mutated state visible to the caller.

use crate::core::{MatchOutcome, RulesError, Side};

/// Which side(s) may act on the current state.
///
/// Most games hand priority to a single side. Bingo's marking window is
/// simultaneous: both sides hold priority until each has responded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Priority {
    /// A single side is to move.
    Side(Side),
    /// Both sides may act.
    Both,
}

impl Priority {
    /// Whether the given side may act.
    #[must_use]
    pub fn allows(self, side: Side) -> bool {
        match self {
            Priority::Side(s) => s == side,
            Priority::Both => true,
        }
    }
}

/// Rules trait.
///
/// ## Implementation Notes
///
/// - `legal_moves`: return an empty vec if the side cannot act
/// - `apply_move`: must validate independently of `legal_moves` — any move
///   not in the legal set is rejected with [`RulesError::IllegalMove`]
///   (or `WrongTurn`/`MalformedMove` where those fit better)
/// - `is_terminal`: return `None` while the game continues
pub trait GameRules {
    /// Canonical, serializable game state.
    type State;
    /// Move envelope for this game type.
    type Move;

    /// Which side(s) may act on this state.
    fn priority(&self, state: &Self::State) -> Priority;

    /// Enumerate the legal moves for a side.
    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move>;

    /// Validate and apply a move, producing the successor state.
    fn apply_move(
        &self,
        state: &Self::State,
        side: Side,
        mv: &Self::Move,
    ) -> Result<Self::State, RulesError>;

    /// Check whether the game is over.
    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_allows() {
        assert!(Priority::Side(Side::First).allows(Side::First));
        assert!(!Priority::Side(Side::First).allows(Side::Second));
        assert!(Priority::Both.allows(Side::First));
        assert!(Priority::Both.allows(Side::Second));
    }
}
