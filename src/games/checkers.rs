//! Checkers rule module.
//!
//! Men step one dark diagonal forward, or capture by jumping an adjacent
//! enemy into the empty square beyond. Kings slide any distance along a
//! diagonal and capture the first enemy met on a ray when the square
//! immediately beyond it is empty; the ray scan stops after one capturable
//! piece. A capture that leaves the capturing piece with another capture
//! keeps the turn with the mover, restricted to that piece.

use serde::{Deserialize, Serialize};

use crate::core::{Coord, MatchOutcome, RulesError, Side, BOARD_CELLS};
use crate::rules::{GameRules, Priority};

/// A checker on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerPiece {
    pub owner: Side,
    pub is_king: bool,
}

/// Canonical checkers state: a 64-cell flat array, dark squares playable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckersState {
    board: Vec<Option<CheckerPiece>>,
    to_move: Side,
    /// Set when the previous move was a capture and the same piece has a
    /// further capture: the mover keeps the turn and must continue from here.
    chain: Option<u8>,
}

/// Move envelope: flat cell indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckersMove {
    pub from: u8,
    pub to: u8,
}

/// Checkers rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckersRules;

/// Forward row direction for a side's men.
fn forward(side: Side) -> i8 {
    match side {
        Side::First => 1,
        Side::Second => -1,
    }
}

/// Crown row for a side.
fn crown_row(side: Side) -> u8 {
    match side {
        Side::First => 7,
        Side::Second => 0,
    }
}

impl CheckersState {
    /// Standard starting position: twelve men per side on dark squares,
    /// first side on rows 0–2.
    #[must_use]
    pub fn new() -> Self {
        let mut board = vec![None; BOARD_CELLS];
        for index in 0..BOARD_CELLS {
            let coord = Coord::from_index(index).expect("index in range");
            if !coord.is_dark() {
                continue;
            }
            if coord.row <= 2 {
                board[index] = Some(CheckerPiece {
                    owner: Side::First,
                    is_king: false,
                });
            } else if coord.row >= 5 {
                board[index] = Some(CheckerPiece {
                    owner: Side::Second,
                    is_king: false,
                });
            }
        }
        Self {
            board,
            to_move: Side::First,
            chain: None,
        }
    }

    /// The piece in a cell.
    #[must_use]
    pub fn piece(&self, index: usize) -> Option<CheckerPiece> {
        self.board[index]
    }

    /// The side to move.
    #[must_use]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Number of pieces a side has on the board.
    #[must_use]
    pub fn piece_count(&self, side: Side) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|p| p.owner == side)
            .count()
    }

    fn moves_from(&self, from: Coord, captures_only: bool) -> Vec<CheckersMove> {
        let Some(piece) = self.board[from.index()] else {
            return vec![];
        };
        let mut moves = Vec::new();
        if piece.is_king {
            self.king_moves(from, piece.owner, captures_only, &mut moves);
        } else {
            self.man_moves(from, piece.owner, captures_only, &mut moves);
        }
        moves
    }

    fn man_moves(&self, from: Coord, owner: Side, captures_only: bool, out: &mut Vec<CheckersMove>) {
        let fwd = forward(owner);
        for dc in [-1i8, 1] {
            if !captures_only {
                if let Some(to) = from.offset(fwd, dc) {
                    if self.board[to.index()].is_none() {
                        out.push(CheckersMove {
                            from: from.index() as u8,
                            to: to.index() as u8,
                        });
                    }
                }
            }
            // Jump: adjacent enemy, empty landing square beyond.
            if let (Some(mid), Some(land)) = (from.offset(fwd, dc), from.offset(2 * fwd, 2 * dc)) {
                let jumped = self.board[mid.index()];
                if jumped.is_some_and(|p| p.owner != owner) && self.board[land.index()].is_none() {
                    out.push(CheckersMove {
                        from: from.index() as u8,
                        to: land.index() as u8,
                    });
                }
            }
        }
    }

    fn king_moves(&self, from: Coord, owner: Side, captures_only: bool, out: &mut Vec<CheckersMove>) {
        for (dr, dc) in [(1i8, 1i8), (1, -1), (-1, 1), (-1, -1)] {
            let mut step = 1i8;
            while let Some(square) = from.offset(dr * step, dc * step) {
                match self.board[square.index()] {
                    None => {
                        if !captures_only {
                            out.push(CheckersMove {
                                from: from.index() as u8,
                                to: square.index() as u8,
                            });
                        }
                    }
                    Some(blocker) => {
                        // One capturable piece per ray sweep, then stop.
                        if blocker.owner != owner {
                            if let Some(land) = from.offset(dr * (step + 1), dc * (step + 1)) {
                                if self.board[land.index()].is_none() {
                                    out.push(CheckersMove {
                                        from: from.index() as u8,
                                        to: land.index() as u8,
                                    });
                                }
                            }
                        }
                        break;
                    }
                }
                step += 1;
            }
        }
    }

    fn side_moves(&self, side: Side) -> Vec<CheckersMove> {
        if let Some(cell) = self.chain {
            if self.to_move == side {
                let from = Coord::from_index(cell as usize).expect("chain cell in range");
                return self.moves_from(from, true);
            }
            return vec![];
        }
        let mut moves = Vec::new();
        for index in 0..BOARD_CELLS {
            if self.board[index].is_some_and(|p| p.owner == side) {
                let from = Coord::from_index(index).expect("index in range");
                moves.extend(self.moves_from(from, false));
            }
        }
        moves
    }

    fn check_invariants(&self) -> Result<(), RulesError> {
        if self.board.len() != BOARD_CELLS {
            return Err(RulesError::corrupt("checkers board is not 64 cells"));
        }
        for index in 0..BOARD_CELLS {
            let coord = Coord::from_index(index).expect("index in range");
            if self.board[index].is_some() && !coord.is_dark() {
                return Err(RulesError::corrupt(format!(
                    "piece on light square {coord}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CheckersState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for CheckersRules {
    type State = CheckersState;
    type Move = CheckersMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move)
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move != side || self.is_terminal(state).is_some() {
            return vec![];
        }
        state.side_moves(side)
    }

    fn apply_move(
        &self,
        state: &Self::State,
        side: Side,
        mv: &Self::Move,
    ) -> Result<Self::State, RulesError> {
        state.check_invariants()?;
        if state.to_move != side {
            return Err(RulesError::WrongTurn(side));
        }
        let (Some(from), Some(to)) = (
            Coord::from_index(mv.from as usize),
            Coord::from_index(mv.to as usize),
        ) else {
            return Err(RulesError::malformed("cell index out of range"));
        };
        if !from.is_dark() || !to.is_dark() {
            return Err(RulesError::illegal("checkers is played on dark squares"));
        }
        let piece = state.board[from.index()];
        if !piece.is_some_and(|p| p.owner == side) {
            return Err(RulesError::illegal(format!("no own piece on {from}")));
        }
        if let Some(cell) = state.chain {
            if cell != mv.from {
                return Err(RulesError::illegal(
                    "a capture chain must continue with the same piece",
                ));
            }
        }
        if !self.legal_moves(state, side).contains(mv) {
            return Err(RulesError::illegal(format!("{from} to {to} is not legal")));
        }

        let mut next = state.clone();
        let mut piece = piece.expect("presence checked above");

        // Any enemy piece strictly between the endpoints was jumped.
        let dr = (to.row as i8 - from.row as i8).signum();
        let dc = (to.col as i8 - from.col as i8).signum();
        let mut captured = false;
        let mut square = from.offset(dr, dc).expect("interior of a legal move");
        while square != to {
            if next.board[square.index()].is_some() {
                next.board[square.index()] = None;
                captured = true;
            }
            square = square.offset(dr, dc).expect("interior of a legal move");
        }

        let mut promoted = false;
        if !piece.is_king && to.row == crown_row(side) {
            piece.is_king = true;
            promoted = true;
        }
        next.board[from.index()] = None;
        next.board[to.index()] = Some(piece);

        // Promotion ends the move; otherwise a further capture from the
        // landing square keeps the turn.
        next.chain = None;
        if captured && !promoted && !next.moves_from(to, true).is_empty() {
            next.chain = Some(to.index() as u8);
        } else {
            next.to_move = side.opponent();
        }
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        for side in Side::both() {
            if state.piece_count(side) == 0 {
                return Some(MatchOutcome::winner(side.opponent()));
            }
        }
        if state.side_moves(state.to_move).is_empty() {
            return Some(MatchOutcome::winner(state.to_move.opponent()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state(to_move: Side) -> CheckersState {
        CheckersState {
            board: vec![None; BOARD_CELLS],
            to_move,
            chain: None,
        }
    }

    fn put(state: &mut CheckersState, row: u8, col: u8, owner: Side, is_king: bool) {
        state.board[Coord::new(row, col).index()] = Some(CheckerPiece { owner, is_king });
    }

    fn cell(row: u8, col: u8) -> u8 {
        Coord::new(row, col).index() as u8
    }

    #[test]
    fn test_initial_position() {
        let state = CheckersState::new();
        assert_eq!(state.piece_count(Side::First), 12);
        assert_eq!(state.piece_count(Side::Second), 12);
        // Each side opens with 7 forward moves.
        assert_eq!(CheckersRules.legal_moves(&state, Side::First).len(), 7);
        assert!(CheckersRules.legal_moves(&state, Side::Second).is_empty());
    }

    #[test]
    fn test_edge_man_has_single_forward_move() {
        let mut state = empty_state(Side::First);
        put(&mut state, 2, 7, Side::First, false);
        put(&mut state, 0, 1, Side::Second, false);
        let moves = CheckersRules.legal_moves(&state, Side::First);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, cell(3, 6));
    }

    #[test]
    fn test_man_jump_removes_enemy() {
        let mut state = empty_state(Side::First);
        put(&mut state, 2, 1, Side::First, false);
        put(&mut state, 3, 2, Side::Second, false);
        put(&mut state, 7, 0, Side::Second, false);

        let mv = CheckersMove {
            from: cell(2, 1),
            to: cell(4, 3),
        };
        let next = CheckersRules.apply_move(&state, Side::First, &mv).unwrap();
        assert!(next.piece(cell(3, 2) as usize).is_none());
        assert_eq!(next.piece_count(Side::Second), 1);
        assert_eq!(next.to_move(), Side::Second);
    }

    #[test]
    fn test_capture_chain_keeps_turn_and_restricts_piece() {
        let mut state = empty_state(Side::First);
        put(&mut state, 2, 1, Side::First, false);
        put(&mut state, 0, 5, Side::First, false);
        put(&mut state, 3, 2, Side::Second, false);
        put(&mut state, 5, 4, Side::Second, false);

        let first_jump = CheckersMove {
            from: cell(2, 1),
            to: cell(4, 3),
        };
        let next = CheckersRules
            .apply_move(&state, Side::First, &first_jump)
            .unwrap();
        // Still first side's turn, and only the chaining capture is legal.
        assert_eq!(next.to_move(), Side::First);
        let moves = CheckersRules.legal_moves(&next, Side::First);
        assert_eq!(
            moves,
            vec![CheckersMove {
                from: cell(4, 3),
                to: cell(6, 5),
            }]
        );

        // Moving the other piece mid-chain is rejected.
        let err = CheckersRules
            .apply_move(
                &next,
                Side::First,
                &CheckersMove {
                    from: cell(0, 5),
                    to: cell(1, 4),
                },
            )
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_king_slides_until_blocked() {
        let mut state = empty_state(Side::First);
        put(&mut state, 0, 1, Side::First, true);
        put(&mut state, 4, 5, Side::First, false);
        put(&mut state, 7, 0, Side::Second, false);

        let moves = CheckersRules.legal_moves(&state, Side::First);
        let king_moves: Vec<_> = moves.iter().filter(|m| m.from == cell(0, 1)).collect();
        // Down-right ray stops before the friendly man on (4,5); down-left
        // ray has the single square (1,0).
        assert_eq!(king_moves.len(), 4);
        assert!(king_moves.iter().all(|m| m.to != cell(4, 5)));
    }

    #[test]
    fn test_king_captures_first_enemy_on_ray_only() {
        let mut state = empty_state(Side::First);
        put(&mut state, 0, 1, Side::First, true);
        put(&mut state, 3, 4, Side::Second, false);
        put(&mut state, 5, 6, Side::Second, false);

        let moves = CheckersRules.legal_moves(&state, Side::First);
        // Landing square is the one immediately beyond the first enemy;
        // the second enemy further down the ray is out of reach.
        assert!(moves.contains(&CheckersMove {
            from: cell(0, 1),
            to: cell(4, 5),
        }));
        assert!(!moves.iter().any(|m| m.to == cell(6, 7)));
    }

    #[test]
    fn test_promotion_on_crown_row() {
        let mut state = empty_state(Side::First);
        put(&mut state, 6, 1, Side::First, false);
        put(&mut state, 0, 7, Side::Second, false);

        let mv = CheckersMove {
            from: cell(6, 1),
            to: cell(7, 2),
        };
        let next = CheckersRules.apply_move(&state, Side::First, &mv).unwrap();
        assert!(next.piece(cell(7, 2) as usize).unwrap().is_king);
    }

    #[test]
    fn test_light_square_move_rejected() {
        let state = CheckersState::new();
        let err = CheckersRules
            .apply_move(
                &state,
                Side::First,
                &CheckersMove {
                    from: cell(2, 2),
                    to: cell(3, 3),
                },
            )
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_no_pieces_loses() {
        let mut state = empty_state(Side::First);
        put(&mut state, 4, 3, Side::First, false);
        assert_eq!(
            CheckersRules.is_terminal(&state),
            Some(MatchOutcome::winner(Side::First))
        );
    }

    #[test]
    fn test_no_moves_loses() {
        // Second to move, its lone man is boxed in a corner.
        let mut state = empty_state(Side::Second);
        put(&mut state, 0, 1, Side::Second, false);
        put(&mut state, 1, 0, Side::First, false);
        put(&mut state, 1, 2, Side::First, false);
        put(&mut state, 2, 3, Side::First, false);
        // Forward for Second is toward row 0: no square to step or jump to.
        assert_eq!(
            CheckersRules.is_terminal(&state),
            Some(MatchOutcome::winner(Side::First))
        );
    }

    #[test]
    fn test_piece_on_light_square_is_corruption() {
        let mut state = empty_state(Side::First);
        put(&mut state, 2, 2, Side::First, false);
        put(&mut state, 5, 0, Side::Second, false);
        let err = CheckersRules
            .apply_move(
                &state,
                Side::First,
                &CheckersMove {
                    from: cell(2, 2),
                    to: cell(3, 3),
                },
            )
            .unwrap_err();
        assert!(matches!(err, RulesError::StateCorruption(_)));
    }
}
