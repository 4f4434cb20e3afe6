//! Tic-tac-toe rule module.

use serde::{Deserialize, Serialize};

use crate::core::{MatchOutcome, RulesError, Side};
use crate::rules::{GameRules, Priority};

/// Cell mark. The first side plays X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    fn for_side(side: Side) -> Mark {
        match side {
            Side::First => Mark::X,
            Side::Second => Mark::O,
        }
    }
}

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Canonical tic-tac-toe state: nine cells, X moves first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeState {
    cells: Vec<Option<Mark>>,
    to_move: Side,
}

impl TicTacToeState {
    /// Empty board, first side to move.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![None; 9],
            to_move: Side::First,
        }
    }

    /// The mark in a cell.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Mark> {
        self.cells[index]
    }

    /// The side to move.
    #[must_use]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    fn line_winner(&self) -> Option<Mark> {
        for line in LINES {
            if let Some(mark) = self.cells[line[0]] {
                if self.cells[line[1]] == Some(mark) && self.cells[line[2]] == Some(mark) {
                    return Some(mark);
                }
            }
        }
        None
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Move envelope: the target cell, 0..=8 row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicTacToeMove {
    pub cell_index: usize,
}

/// Tic-tac-toe rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct TicTacToeRules;

impl GameRules for TicTacToeRules {
    type State = TicTacToeState;
    type Move = TicTacToeMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move)
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move != side || self.is_terminal(state).is_some() {
            return vec![];
        }
        (0..9)
            .filter(|&i| state.cells[i].is_none())
            .map(|cell_index| TicTacToeMove { cell_index })
            .collect()
    }

    fn apply_move(
        &self,
        state: &Self::State,
        side: Side,
        mv: &Self::Move,
    ) -> Result<Self::State, RulesError> {
        if state.to_move != side {
            return Err(RulesError::WrongTurn(side));
        }
        if self.is_terminal(state).is_some() {
            return Err(RulesError::illegal("the game is already over"));
        }
        if mv.cell_index >= 9 {
            return Err(RulesError::malformed(format!(
                "cell index {} out of range",
                mv.cell_index
            )));
        }
        if state.cells[mv.cell_index].is_some() {
            return Err(RulesError::illegal(format!(
                "cell {} is already marked",
                mv.cell_index
            )));
        }

        let mut next = state.clone();
        next.cells[mv.cell_index] = Some(Mark::for_side(side));
        next.to_move = side.opponent();
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        if let Some(mark) = state.line_winner() {
            let winner = match mark {
                Mark::X => Side::First,
                Mark::O => Side::Second,
            };
            return Some(MatchOutcome::winner(winner));
        }
        if state.cells.iter().all(Option::is_some) {
            return Some(MatchOutcome::draw());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(state: TicTacToeState, cell_index: usize) -> TicTacToeState {
        let side = state.to_move();
        TicTacToeRules
            .apply_move(&state, side, &TicTacToeMove { cell_index })
            .unwrap()
    }

    #[test]
    fn test_initial_state_has_nine_legal_moves() {
        let state = TicTacToeState::new();
        assert_eq!(TicTacToeRules.legal_moves(&state, Side::First).len(), 9);
        assert!(TicTacToeRules.legal_moves(&state, Side::Second).is_empty());
    }

    #[test]
    fn test_occupied_cell_rejected() {
        let state = play(TicTacToeState::new(), 4);
        let err = TicTacToeRules
            .apply_move(&state, Side::Second, &TicTacToeMove { cell_index: 4 })
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let state = TicTacToeState::new();
        let err = TicTacToeRules
            .apply_move(&state, Side::Second, &TicTacToeMove { cell_index: 0 })
            .unwrap_err();
        assert_eq!(err, RulesError::WrongTurn(Side::Second));
    }

    #[test]
    fn test_out_of_range_cell_malformed() {
        let state = TicTacToeState::new();
        let err = TicTacToeRules
            .apply_move(&state, Side::First, &TicTacToeMove { cell_index: 9 })
            .unwrap_err();
        assert!(matches!(err, RulesError::MalformedMove(_)));
    }

    #[test]
    fn test_row_win() {
        // X: 0, 1, 2 while O wanders.
        let mut state = TicTacToeState::new();
        for cell in [0, 3, 1, 4, 2] {
            state = play(state, cell);
        }
        assert_eq!(
            TicTacToeRules.is_terminal(&state),
            Some(MatchOutcome::winner(Side::First))
        );
    }

    #[test]
    fn test_diagonal_win_for_second() {
        let mut state = TicTacToeState::new();
        for cell in [1, 0, 3, 4, 5, 8] {
            state = play(state, cell);
        }
        assert_eq!(
            TicTacToeRules.is_terminal(&state),
            Some(MatchOutcome::winner(Side::Second))
        );
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        // X X O / O O X / X O X — no three in a row.
        let mut state = TicTacToeState::new();
        for cell in [0, 2, 1, 4, 5, 3, 6, 7, 8] {
            assert_eq!(TicTacToeRules.is_terminal(&state), None);
            state = play(state, cell);
        }
        assert_eq!(TicTacToeRules.is_terminal(&state), Some(MatchOutcome::draw()));
    }

    #[test]
    fn test_no_moves_after_terminal() {
        let mut state = TicTacToeState::new();
        for cell in [0, 3, 1, 4, 2] {
            state = play(state, cell);
        }
        assert!(TicTacToeRules.legal_moves(&state, Side::Second).is_empty());
        let err = TicTacToeRules
            .apply_move(&state, Side::Second, &TicTacToeMove { cell_index: 8 })
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_move_envelope_shape() {
        let json = serde_json::to_string(&TicTacToeMove { cell_index: 4 }).unwrap();
        assert_eq!(json, r#"{"cellIndex":4}"#);
    }
}
