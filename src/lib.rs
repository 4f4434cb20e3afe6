//! # parlor
//!
//! A unified rules engine for two-player wagered tabletop matches.
//!
//! ## Design Principles
//!
//! 1. **One seam for every game**: each game type implements the same
//!    `legal_moves` / `apply_move` / `is_terminal` surface; callers dispatch
//!    on a tagged `AnyState`/`AnyMove` pair and can never cross game types.
//!
//! 2. **Immutable-by-convention state**: `apply_move` returns a fresh
//!    state; a rejected move leaves nothing half-applied.
//!
//! 3. **Authoritative randomness**: every roll, shuffle, and draw comes
//!    from a seeded `MatchRng` held by the state — never from a client
//!    value. A seed reproduces a match exactly.
//!
//! ## Modules
//!
//! - `core`: sides, coordinates, cards, dominoes, RNG, errors, outcomes
//! - `rules`: the `GameRules` trait and game-type dispatch
//! - `games`: the eight rule modules (tic-tac-toe, checkers, chess,
//!   backgammon, durak, domino, dice, bingo)
//! - `session`: turn controller, match session, wire snapshots

pub mod core;
pub mod games;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Card, Coord, DominoTile, MatchOutcome, MatchRng, MatchRngState, Rank, RulesError, Side,
    SideMap, Suit,
};

pub use crate::rules::{AnyMove, AnyState, GameKind, GameRules, Priority, ALL_GAME_KINDS};

pub use crate::games::{
    BackgammonMove, BackgammonState, BingoMove, BingoState, CheckersMove, CheckersState,
    ChessMove, ChessState, DiceMove, DiceState, DominoMove, DominoState, DurakMove, DurakState,
    TicTacToeMove, TicTacToeState,
};

pub use crate::session::{
    MatchController, MatchSession, MoveRecord, PlayerRef, SnapshotError, SubmitReport,
};
