//! Match session: binds two players to a state and controller.
//!
//! The session translates external player identities into sides, feeds
//! moves through the controller, and guarantees the outcome signal is
//! surfaced exactly once. Everything around it — join/reconnect events,
//! disconnect grace periods, wallet settlement — belongs to the hosting
//! process, which injects a forfeit when it decides a player is gone.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{MatchOutcome, RulesError, Side, SideMap};
use crate::rules::{AnyMove, AnyState, GameKind};
use crate::session::controller::MatchController;

/// Opaque external player identity (account id, session token, …).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef(pub u64);

impl std::fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// What a successful submission hands back to the transport layer.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitReport {
    /// Fresh full snapshot, shape-identical to the match-start snapshot.
    pub state: AnyState,
    /// The outcome signal, present on exactly one report per match.
    pub outcome: Option<MatchOutcome>,
}

/// A two-player match bound to external identities.
#[derive(Clone, Debug)]
pub struct MatchSession {
    players: SideMap<PlayerRef>,
    controller: MatchController,
    outcome_emitted: bool,
}

impl MatchSession {
    /// Start a match of the given game type.
    ///
    /// Panics if both seats are bound to the same player.
    #[must_use]
    pub fn new(kind: GameKind, seed: u64, players: SideMap<PlayerRef>) -> Self {
        assert!(
            players[Side::First] != players[Side::Second],
            "a match needs two distinct players"
        );
        debug!(game = %kind, first = %players[Side::First], second = %players[Side::Second], "session start");
        Self {
            players,
            controller: MatchController::new(AnyState::initial(kind, seed)),
            outcome_emitted: false,
        }
    }

    /// The side a player occupies.
    #[must_use]
    pub fn side_of(&self, player: PlayerRef) -> Option<Side> {
        Side::both()
            .into_iter()
            .find(|&side| self.players[side] == player)
    }

    /// The current canonical state.
    #[must_use]
    pub fn state(&self) -> &AnyState {
        self.controller.state()
    }

    /// The outcome, once the match is decided.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.controller.outcome()
    }

    /// Legal moves for a player, empty for finished matches.
    #[must_use]
    pub fn legal_moves(&self, player: PlayerRef) -> Vec<AnyMove> {
        match self.side_of(player) {
            Some(side) => self.controller.legal_moves(side),
            None => vec![],
        }
    }

    /// Submit a move on behalf of a player.
    ///
    /// Errors are for the submitting player only; the opponent's view is
    /// unaffected because a failed application never changes state.
    pub fn submit_move(
        &mut self,
        player: PlayerRef,
        mv: &AnyMove,
    ) -> Result<SubmitReport, RulesError> {
        let Some(side) = self.side_of(player) else {
            return Err(RulesError::illegal(format!(
                "{player} is not part of this match"
            )));
        };
        let outcome = self.controller.submit(side, mv)?;
        Ok(SubmitReport {
            state: self.controller.state().clone(),
            outcome: self.take_outcome_signal(outcome),
        })
    }

    /// Resolve a forfeit against a player.
    ///
    /// Returns the outcome signal if this forfeit decided the match and the
    /// signal has not been emitted yet.
    pub fn forfeit(&mut self, player: PlayerRef) -> Result<Option<MatchOutcome>, RulesError> {
        let Some(side) = self.side_of(player) else {
            return Err(RulesError::illegal(format!(
                "{player} is not part of this match"
            )));
        };
        let outcome = self.controller.forfeit(side);
        Ok(self.take_outcome_signal(Some(outcome)))
    }

    /// Pass the outcome through once, swallowing repeats.
    fn take_outcome_signal(&mut self, outcome: Option<MatchOutcome>) -> Option<MatchOutcome> {
        match outcome {
            Some(outcome) if !self.outcome_emitted => {
                self.outcome_emitted = true;
                Some(outcome)
            }
            _ => None,
        }
    }
}
