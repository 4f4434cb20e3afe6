//! Turn/phase controller.
//!
//! Wraps a canonical state with the concerns every game shares: priority
//! (whose turn it is), delegation to the rule module, move history, the
//! terminal check, and forfeit resolution. The controller owns the only
//! mutable reference to the match state; submissions must be serialized by
//! the hosting process so two near-simultaneous moves cannot both apply
//! against a stale state.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{MatchOutcome, RulesError, Side};
use crate::rules::{AnyMove, AnyState};

/// A move applied to the match, with ordering metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub side: Side,
    pub mv: AnyMove,
    /// Position in the match's move sequence, starting at 0.
    pub sequence: u32,
}

/// Per-match turn controller.
#[derive(Clone, Debug)]
pub struct MatchController {
    state: AnyState,
    /// Applied moves, oldest first. Persistent so snapshots are O(1).
    history: Vector<MoveRecord>,
    outcome: Option<MatchOutcome>,
    /// Set when a state-corruption error aborted the match.
    aborted: bool,
}

impl MatchController {
    /// Wrap an initial state.
    #[must_use]
    pub fn new(state: AnyState) -> Self {
        Self {
            state,
            history: Vector::new(),
            outcome: None,
            aborted: false,
        }
    }

    /// The current canonical state.
    #[must_use]
    pub fn state(&self) -> &AnyState {
        &self.state
    }

    /// Applied moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<MoveRecord> {
        &self.history
    }

    /// The match outcome, once terminal.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Whether the match was aborted on a corrupted state.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Legal moves for a side in the current state.
    #[must_use]
    pub fn legal_moves(&self, side: Side) -> Vec<AnyMove> {
        if self.outcome.is_some() || self.aborted {
            return vec![];
        }
        self.state.legal_moves(side)
    }

    /// Validate and apply a move for a side.
    ///
    /// On success, returns the outcome if this move ended the match. On
    /// error the state is untouched; a [`RulesError::StateCorruption`]
    /// additionally aborts the match for good.
    pub fn submit(&mut self, side: Side, mv: &AnyMove) -> Result<Option<MatchOutcome>, RulesError> {
        if self.aborted {
            return Err(RulesError::illegal("the match was aborted"));
        }
        if self.outcome.is_some() {
            return Err(RulesError::illegal("the match is already decided"));
        }
        if !self.state.priority().allows(side) {
            return Err(RulesError::WrongTurn(side));
        }

        let next = match self.state.apply_move(side, mv) {
            Ok(next) => next,
            Err(err) => {
                if let RulesError::StateCorruption(reason) = &err {
                    warn!(side = %side, reason = %reason, "match aborted on corrupted state");
                    self.aborted = true;
                }
                return Err(err);
            }
        };

        let sequence = self.history.len() as u32;
        self.history.push_back(MoveRecord {
            side,
            mv: mv.clone(),
            sequence,
        });
        self.state = next;
        debug!(side = %side, sequence, "move applied");

        self.outcome = self.state.is_terminal();
        if let Some(outcome) = self.outcome {
            info!(winner = ?outcome.winner, draw = outcome.is_draw, "match over");
        }
        Ok(self.outcome)
    }

    /// Resolve a forfeit (or disconnect timeout) against a side.
    ///
    /// Idempotent: once the match is decided the existing outcome stands.
    pub fn forfeit(&mut self, side: Side) -> MatchOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = MatchOutcome::winner(side.opponent());
        info!(forfeiting = %side, "forfeit");
        self.outcome = Some(outcome);
        outcome
    }
}
