//! Per-game rule modules.
//!
//! Each module owns its canonical state model, move envelope, and
//! `GameRules` implementation. Nothing here renders, waits, or performs
//! I/O; randomness comes only from the `MatchRng` embedded in (or used to
//! construct) the state.

pub mod backgammon;
pub mod bingo;
pub mod checkers;
pub mod chess;
pub mod dice;
pub mod domino;
pub mod durak;
pub mod tictactoe;

pub use backgammon::{BackgammonMove, BackgammonPhase, BackgammonRules, BackgammonState};
pub use bingo::{BingoCard, BingoMove, BingoPhase, BingoRules, BingoState};
pub use checkers::{CheckerPiece, CheckersMove, CheckersRules, CheckersState};
pub use chess::{is_king_in_check, ChessMove, ChessPiece, ChessRules, ChessState, PieceKind};
pub use dice::{score_selection, DiceMove, DicePhase, DiceRules, DiceState};
pub use domino::{ChainEnd, DominoMove, DominoRules, DominoState};
pub use durak::{DurakMove, DurakPhase, DurakRules, DurakState, TablePair};
pub use tictactoe::{Mark, TicTacToeMove, TicTacToeRules, TicTacToeState};
