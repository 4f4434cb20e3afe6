//! Chess rule module.
//!
//! Move generation is geometric per piece type (pawn pushes and diagonal
//! captures including en passant, knight/king offset tables, slider ray
//! casts that include an enemy blocker's square, castling), then filtered
//! for check safety: a move that leaves the mover's own king attacked is
//! not legal. Terminal detection reports checkmate and stalemate.

use serde::{Deserialize, Serialize};

use crate::core::{Coord, MatchOutcome, RulesError, Side, BOARD_CELLS};
use crate::rules::{GameRules, Priority};

/// Chess piece type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A piece on the chess board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessPiece {
    pub kind: PieceKind,
    pub color: Side,
    /// Tracks castling rights and the pawn double-push.
    pub has_moved: bool,
}

impl ChessPiece {
    fn new(kind: PieceKind, color: Side) -> Self {
        Self {
            kind,
            color,
            has_moved: false,
        }
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (-1, -1),
];

const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

fn forward(side: Side) -> i8 {
    match side {
        Side::First => 1,
        Side::Second => -1,
    }
}

fn pawn_start_row(side: Side) -> u8 {
    match side {
        Side::First => 1,
        Side::Second => 6,
    }
}

fn promotion_row(side: Side) -> u8 {
    match side {
        Side::First => 7,
        Side::Second => 0,
    }
}

/// Canonical chess state: an 8×8 grid, row 0 the first side's back rank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessState {
    board: Vec<Option<ChessPiece>>,
    to_move: Side,
    /// Square a pawn skipped with a double push last move, if any.
    en_passant: Option<u8>,
}

/// Move envelope. `promotion` is required exactly when a pawn reaches the
/// last rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMove {
    pub from: u8,
    pub to: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl ChessMove {
    fn new(from: Coord, to: Coord, promotion: Option<PieceKind>) -> Self {
        Self {
            from: from.index() as u8,
            to: to.index() as u8,
            promotion,
        }
    }
}

/// Chess rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChessRules;

impl ChessState {
    /// Standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut board = vec![None; BOARD_CELLS];
        for (col, &kind) in back_rank.iter().enumerate() {
            board[Coord::new(0, col as u8).index()] = Some(ChessPiece::new(kind, Side::First));
            board[Coord::new(7, col as u8).index()] = Some(ChessPiece::new(kind, Side::Second));
            board[Coord::new(1, col as u8).index()] =
                Some(ChessPiece::new(PieceKind::Pawn, Side::First));
            board[Coord::new(6, col as u8).index()] =
                Some(ChessPiece::new(PieceKind::Pawn, Side::Second));
        }
        Self {
            board,
            to_move: Side::First,
            en_passant: None,
        }
    }

    /// The piece on a square.
    #[must_use]
    pub fn piece(&self, square: Coord) -> Option<ChessPiece> {
        self.board[square.index()]
    }

    /// The side to move.
    #[must_use]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    fn king_square(&self, color: Side) -> Option<Coord> {
        (0..BOARD_CELLS)
            .find(|&i| {
                self.board[i].is_some_and(|p| p.kind == PieceKind::King && p.color == color)
            })
            .and_then(Coord::from_index)
    }

    /// Whether any piece of `by` attacks `target` by raw geometry.
    fn is_attacked(&self, target: Coord, by: Side) -> bool {
        // Pawns attack diagonally forward, so look one row back from the
        // target along both files.
        for dc in [-1i8, 1] {
            if let Some(sq) = target.offset(-forward(by), dc) {
                if self.board[sq.index()]
                    .is_some_and(|p| p.color == by && p.kind == PieceKind::Pawn)
                {
                    return true;
                }
            }
        }
        for (dr, dc) in KNIGHT_OFFSETS {
            if let Some(sq) = target.offset(dr, dc) {
                if self.board[sq.index()]
                    .is_some_and(|p| p.color == by && p.kind == PieceKind::Knight)
                {
                    return true;
                }
            }
        }
        for (dr, dc) in KING_OFFSETS {
            if let Some(sq) = target.offset(dr, dc) {
                if self.board[sq.index()]
                    .is_some_and(|p| p.color == by && p.kind == PieceKind::King)
                {
                    return true;
                }
            }
        }
        for (dirs, kinds) in [
            (BISHOP_DIRS, [PieceKind::Bishop, PieceKind::Queen]),
            (ROOK_DIRS, [PieceKind::Rook, PieceKind::Queen]),
        ] {
            for (dr, dc) in dirs {
                let mut step = 1i8;
                while let Some(sq) = target.offset(dr * step, dc * step) {
                    if let Some(piece) = self.board[sq.index()] {
                        if piece.color == by && kinds.contains(&piece.kind) {
                            return true;
                        }
                        break;
                    }
                    step += 1;
                }
            }
        }
        false
    }

    fn pawn_moves(&self, from: Coord, color: Side, out: &mut Vec<ChessMove>) {
        let fwd = forward(color);
        let promo_row = promotion_row(color);
        let push = |out: &mut Vec<ChessMove>, to: Coord| {
            if to.row == promo_row {
                for kind in PROMOTION_KINDS {
                    out.push(ChessMove::new(from, to, Some(kind)));
                }
            } else {
                out.push(ChessMove::new(from, to, None));
            }
        };

        if let Some(one) = from.offset(fwd, 0) {
            if self.board[one.index()].is_none() {
                push(out, one);
                if from.row == pawn_start_row(color) {
                    if let Some(two) = from.offset(2 * fwd, 0) {
                        if self.board[two.index()].is_none() {
                            out.push(ChessMove::new(from, two, None));
                        }
                    }
                }
            }
        }
        for dc in [-1i8, 1] {
            if let Some(diag) = from.offset(fwd, dc) {
                if self.board[diag.index()].is_some_and(|p| p.color != color) {
                    push(out, diag);
                } else if self.en_passant == Some(diag.index() as u8)
                    && self.board[diag.index()].is_none()
                {
                    out.push(ChessMove::new(from, diag, None));
                }
            }
        }
    }

    fn offset_moves(
        &self,
        from: Coord,
        color: Side,
        offsets: &[(i8, i8)],
        out: &mut Vec<ChessMove>,
    ) {
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                if !self.board[to.index()].is_some_and(|p| p.color == color) {
                    out.push(ChessMove::new(from, to, None));
                }
            }
        }
    }

    fn ray_moves(&self, from: Coord, color: Side, dirs: &[(i8, i8)], out: &mut Vec<ChessMove>) {
        for &(dr, dc) in dirs {
            let mut step = 1i8;
            while let Some(to) = from.offset(dr * step, dc * step) {
                match self.board[to.index()] {
                    None => out.push(ChessMove::new(from, to, None)),
                    Some(blocker) => {
                        if blocker.color != color {
                            out.push(ChessMove::new(from, to, None));
                        }
                        break;
                    }
                }
                step += 1;
            }
        }
    }

    /// Geometric moves for the piece on `from`, castling excluded.
    fn pseudo_moves_from(&self, from: Coord, out: &mut Vec<ChessMove>) {
        let Some(piece) = self.board[from.index()] else {
            return;
        };
        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(from, piece.color, out),
            PieceKind::Knight => self.offset_moves(from, piece.color, &KNIGHT_OFFSETS, out),
            PieceKind::King => self.offset_moves(from, piece.color, &KING_OFFSETS, out),
            PieceKind::Bishop => self.ray_moves(from, piece.color, &BISHOP_DIRS, out),
            PieceKind::Rook => self.ray_moves(from, piece.color, &ROOK_DIRS, out),
            PieceKind::Queen => {
                self.ray_moves(from, piece.color, &BISHOP_DIRS, out);
                self.ray_moves(from, piece.color, &ROOK_DIRS, out);
            }
        }
    }

    fn castling_moves(&self, color: Side, out: &mut Vec<ChessMove>) {
        let Some(king_sq) = self.king_square(color) else {
            return;
        };
        let king = self.board[king_sq.index()].expect("king square holds the king");
        if king.has_moved || self.is_attacked(king_sq, color.opponent()) {
            return;
        }
        let row = king_sq.row;
        let enemy = color.opponent();

        // Kingside: rook on file h, files f and g empty and safe.
        let rook_sq = Coord::new(row, 7);
        if self.board[rook_sq.index()]
            .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color && !p.has_moved)
        {
            let path = [Coord::new(row, 5), Coord::new(row, 6)];
            if path.iter().all(|sq| self.board[sq.index()].is_none())
                && path.iter().all(|sq| !self.is_attacked(*sq, enemy))
            {
                out.push(ChessMove::new(king_sq, Coord::new(row, 6), None));
            }
        }

        // Queenside: rook on file a, files b–d empty, c and d safe.
        let rook_sq = Coord::new(row, 0);
        if self.board[rook_sq.index()]
            .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color && !p.has_moved)
        {
            let empty = [Coord::new(row, 1), Coord::new(row, 2), Coord::new(row, 3)];
            let safe = [Coord::new(row, 2), Coord::new(row, 3)];
            if empty.iter().all(|sq| self.board[sq.index()].is_none())
                && safe.iter().all(|sq| !self.is_attacked(*sq, enemy))
            {
                out.push(ChessMove::new(king_sq, Coord::new(row, 2), None));
            }
        }
    }

    /// Apply move mechanics without validation.
    fn apply_unchecked(&self, side: Side, mv: &ChessMove) -> ChessState {
        let mut next = self.clone();
        let from = Coord::from_index(mv.from as usize).expect("validated");
        let to = Coord::from_index(mv.to as usize).expect("validated");
        let mut piece = next.board[from.index()].expect("validated");

        // En passant: a pawn landing on the skipped square captures the
        // pawn that skipped it.
        if piece.kind == PieceKind::Pawn
            && self.en_passant == Some(to.index() as u8)
            && next.board[to.index()].is_none()
            && from.col != to.col
        {
            next.board[Coord::new(from.row, to.col).index()] = None;
        }

        // Castling: the king moves two files; bring the rook across.
        if piece.kind == PieceKind::King && from.col.abs_diff(to.col) == 2 {
            let (rook_from, rook_to) = if to.col == 6 {
                (Coord::new(from.row, 7), Coord::new(from.row, 5))
            } else {
                (Coord::new(from.row, 0), Coord::new(from.row, 3))
            };
            if let Some(mut rook) = next.board[rook_from.index()].take() {
                rook.has_moved = true;
                next.board[rook_to.index()] = Some(rook);
            }
        }

        piece.has_moved = true;
        if let Some(kind) = mv.promotion {
            piece.kind = kind;
        }
        next.board[from.index()] = None;
        next.board[to.index()] = Some(piece);

        next.en_passant = if piece.kind == PieceKind::Pawn && from.row.abs_diff(to.row) == 2 {
            Some(Coord::new((from.row + to.row) / 2, from.col).index() as u8)
        } else {
            None
        };
        next.to_move = side.opponent();
        next
    }

    fn count_kings(&self, color: Side) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|p| p.kind == PieceKind::King && p.color == color)
            .count()
    }
}

impl Default for ChessState {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the given color's king is attacked.
#[must_use]
pub fn is_king_in_check(state: &ChessState, color: Side) -> bool {
    state
        .king_square(color)
        .is_some_and(|sq| state.is_attacked(sq, color.opponent()))
}

impl GameRules for ChessRules {
    type State = ChessState;
    type Move = ChessMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move)
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move != side {
            return vec![];
        }
        let mut moves = Vec::new();
        for index in 0..BOARD_CELLS {
            if state.board[index].is_some_and(|p| p.color == side) {
                let from = Coord::from_index(index).expect("index in range");
                state.pseudo_moves_from(from, &mut moves);
            }
        }
        state.castling_moves(side, &mut moves);
        moves.retain(|mv| !is_king_in_check(&state.apply_unchecked(side, mv), side));
        moves
    }

    fn apply_move(
        &self,
        state: &Self::State,
        side: Side,
        mv: &Self::Move,
    ) -> Result<Self::State, RulesError> {
        for color in Side::both() {
            if state.count_kings(color) != 1 {
                return Err(RulesError::corrupt(format!(
                    "expected exactly one {color} king"
                )));
            }
        }
        if state.to_move != side {
            return Err(RulesError::WrongTurn(side));
        }
        let (Some(from), Some(to)) = (
            Coord::from_index(mv.from as usize),
            Coord::from_index(mv.to as usize),
        ) else {
            return Err(RulesError::malformed("square index out of range"));
        };
        let piece = state.board[from.index()];
        if !piece.is_some_and(|p| p.color == side) {
            return Err(RulesError::illegal(format!("no own piece on {from}")));
        }
        let piece = piece.expect("presence checked above");

        let promoting = piece.kind == PieceKind::Pawn && to.row == promotion_row(side);
        match (promoting, mv.promotion) {
            (true, None) => {
                return Err(RulesError::malformed(
                    "promotion piece required for a pawn reaching the last rank",
                ))
            }
            (false, Some(_)) => {
                return Err(RulesError::malformed("promotion piece not applicable"))
            }
            (true, Some(PieceKind::Pawn | PieceKind::King)) => {
                return Err(RulesError::malformed("cannot promote to pawn or king"))
            }
            _ => {}
        }

        if !self.legal_moves(state, side).contains(mv) {
            return Err(RulesError::illegal(format!("{from} to {to} is not legal")));
        }
        Ok(state.apply_unchecked(side, mv))
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        if self.legal_moves(state, state.to_move).is_empty() {
            if is_king_in_check(state, state.to_move) {
                return Some(MatchOutcome::winner(state.to_move.opponent()));
            }
            return Some(MatchOutcome::draw());
        }
        None
    }
}
