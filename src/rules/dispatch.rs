//! Game-type dispatch.
//!
//! `AnyState` and `AnyMove` are tagged unions over the eight rule modules.
//! They give the session layer a single uniform surface: moves and states
//! of different game types can never be combined — a mismatched pair is
//! rejected as malformed, not coerced.

use serde::{Deserialize, Serialize};

use crate::core::{MatchOutcome, RulesError, Side};
use crate::games::backgammon::{BackgammonMove, BackgammonRules, BackgammonState};
use crate::games::bingo::{BingoMove, BingoRules, BingoState};
use crate::games::checkers::{CheckersMove, CheckersRules, CheckersState};
use crate::games::chess::{ChessMove, ChessRules, ChessState};
use crate::games::dice::{DiceMove, DiceRules, DiceState};
use crate::games::domino::{DominoMove, DominoRules, DominoState};
use crate::games::durak::{DurakMove, DurakRules, DurakState};
use crate::games::tictactoe::{TicTacToeMove, TicTacToeRules, TicTacToeState};
use crate::rules::engine::{GameRules, Priority};

/// The supported game types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameKind {
    TicTacToe,
    Checkers,
    Chess,
    Backgammon,
    Durak,
    Domino,
    Dice,
    Bingo,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameKind::TicTacToe => "tic-tac-toe",
            GameKind::Checkers => "checkers",
            GameKind::Chess => "chess",
            GameKind::Backgammon => "backgammon",
            GameKind::Durak => "durak",
            GameKind::Domino => "domino",
            GameKind::Dice => "dice",
            GameKind::Bingo => "bingo",
        };
        f.write_str(name)
    }
}

/// Canonical state of any supported game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyState {
    TicTacToe(TicTacToeState),
    Checkers(CheckersState),
    Chess(ChessState),
    Backgammon(BackgammonState),
    Durak(DurakState),
    Domino(DominoState),
    Dice(DiceState),
    Bingo(BingoState),
}

/// Move envelope of any supported game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game", content = "move", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnyMove {
    TicTacToe(TicTacToeMove),
    Checkers(CheckersMove),
    Chess(ChessMove),
    Backgammon(BackgammonMove),
    Durak(DurakMove),
    Domino(DominoMove),
    Dice(DiceMove),
    Bingo(BingoMove),
}

impl AnyMove {
    /// The game type this move belongs to.
    #[must_use]
    pub fn kind(&self) -> GameKind {
        match self {
            AnyMove::TicTacToe(_) => GameKind::TicTacToe,
            AnyMove::Checkers(_) => GameKind::Checkers,
            AnyMove::Chess(_) => GameKind::Chess,
            AnyMove::Backgammon(_) => GameKind::Backgammon,
            AnyMove::Durak(_) => GameKind::Durak,
            AnyMove::Domino(_) => GameKind::Domino,
            AnyMove::Dice(_) => GameKind::Dice,
            AnyMove::Bingo(_) => GameKind::Bingo,
        }
    }
}

impl AnyState {
    /// Initial state for a game type. Deterministic games ignore the seed.
    #[must_use]
    pub fn initial(kind: GameKind, seed: u64) -> AnyState {
        match kind {
            GameKind::TicTacToe => AnyState::TicTacToe(TicTacToeState::new()),
            GameKind::Checkers => AnyState::Checkers(CheckersState::new()),
            GameKind::Chess => AnyState::Chess(ChessState::new()),
            GameKind::Backgammon => AnyState::Backgammon(BackgammonState::new(seed)),
            GameKind::Durak => AnyState::Durak(DurakState::new(seed)),
            GameKind::Domino => AnyState::Domino(DominoState::new(seed)),
            GameKind::Dice => AnyState::Dice(DiceState::new(seed)),
            GameKind::Bingo => AnyState::Bingo(BingoState::new(seed)),
        }
    }

    /// The game type of this state.
    #[must_use]
    pub fn kind(&self) -> GameKind {
        match self {
            AnyState::TicTacToe(_) => GameKind::TicTacToe,
            AnyState::Checkers(_) => GameKind::Checkers,
            AnyState::Chess(_) => GameKind::Chess,
            AnyState::Backgammon(_) => GameKind::Backgammon,
            AnyState::Durak(_) => GameKind::Durak,
            AnyState::Domino(_) => GameKind::Domino,
            AnyState::Dice(_) => GameKind::Dice,
            AnyState::Bingo(_) => GameKind::Bingo,
        }
    }

    /// Which side(s) may act.
    #[must_use]
    pub fn priority(&self) -> Priority {
        match self {
            AnyState::TicTacToe(s) => TicTacToeRules.priority(s),
            AnyState::Checkers(s) => CheckersRules.priority(s),
            AnyState::Chess(s) => ChessRules.priority(s),
            AnyState::Backgammon(s) => BackgammonRules.priority(s),
            AnyState::Durak(s) => DurakRules.priority(s),
            AnyState::Domino(s) => DominoRules.priority(s),
            AnyState::Dice(s) => DiceRules.priority(s),
            AnyState::Bingo(s) => BingoRules.priority(s),
        }
    }

    /// Enumerate the legal moves for a side.
    #[must_use]
    pub fn legal_moves(&self, side: Side) -> Vec<AnyMove> {
        match self {
            AnyState::TicTacToe(s) => TicTacToeRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::TicTacToe)
                .collect(),
            AnyState::Checkers(s) => CheckersRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Checkers)
                .collect(),
            AnyState::Chess(s) => ChessRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Chess)
                .collect(),
            AnyState::Backgammon(s) => BackgammonRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Backgammon)
                .collect(),
            AnyState::Durak(s) => DurakRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Durak)
                .collect(),
            AnyState::Domino(s) => DominoRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Domino)
                .collect(),
            AnyState::Dice(s) => DiceRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Dice)
                .collect(),
            AnyState::Bingo(s) => BingoRules
                .legal_moves(s, side)
                .into_iter()
                .map(AnyMove::Bingo)
                .collect(),
        }
    }

    /// Validate and apply a move, producing the successor state.
    pub fn apply_move(&self, side: Side, mv: &AnyMove) -> Result<AnyState, RulesError> {
        match (self, mv) {
            (AnyState::TicTacToe(s), AnyMove::TicTacToe(m)) => {
                TicTacToeRules.apply_move(s, side, m).map(AnyState::TicTacToe)
            }
            (AnyState::Checkers(s), AnyMove::Checkers(m)) => {
                CheckersRules.apply_move(s, side, m).map(AnyState::Checkers)
            }
            (AnyState::Chess(s), AnyMove::Chess(m)) => {
                ChessRules.apply_move(s, side, m).map(AnyState::Chess)
            }
            (AnyState::Backgammon(s), AnyMove::Backgammon(m)) => {
                BackgammonRules.apply_move(s, side, m).map(AnyState::Backgammon)
            }
            (AnyState::Durak(s), AnyMove::Durak(m)) => {
                DurakRules.apply_move(s, side, m).map(AnyState::Durak)
            }
            (AnyState::Domino(s), AnyMove::Domino(m)) => {
                DominoRules.apply_move(s, side, m).map(AnyState::Domino)
            }
            (AnyState::Dice(s), AnyMove::Dice(m)) => {
                DiceRules.apply_move(s, side, m).map(AnyState::Dice)
            }
            (AnyState::Bingo(s), AnyMove::Bingo(m)) => {
                BingoRules.apply_move(s, side, m).map(AnyState::Bingo)
            }
            (state, mv) => Err(RulesError::malformed(format!(
                "a {} move cannot apply to a {} match",
                mv.kind(),
                state.kind()
            ))),
        }
    }

    /// Check whether the game is over.
    #[must_use]
    pub fn is_terminal(&self) -> Option<MatchOutcome> {
        match self {
            AnyState::TicTacToe(s) => TicTacToeRules.is_terminal(s),
            AnyState::Checkers(s) => CheckersRules.is_terminal(s),
            AnyState::Chess(s) => ChessRules.is_terminal(s),
            AnyState::Backgammon(s) => BackgammonRules.is_terminal(s),
            AnyState::Durak(s) => DurakRules.is_terminal(s),
            AnyState::Domino(s) => DominoRules.is_terminal(s),
            AnyState::Dice(s) => DiceRules.is_terminal(s),
            AnyState::Bingo(s) => BingoRules.is_terminal(s),
        }
    }
}

/// All game kinds, for enumeration in tests and registries.
pub const ALL_GAME_KINDS: [GameKind; 8] = [
    GameKind::TicTacToe,
    GameKind::Checkers,
    GameKind::Chess,
    GameKind::Backgammon,
    GameKind::Durak,
    GameKind::Domino,
    GameKind::Dice,
    GameKind::Bingo,
];
