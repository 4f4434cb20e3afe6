//! Core value types shared by multiple rule modules: sides, board
//! coordinates, cards, dominoes, the authoritative RNG, the error taxonomy,
//! and the outcome signal.

pub mod card;
pub mod coord;
pub mod domino;
pub mod error;
pub mod outcome;
pub mod rng;
pub mod side;

pub use card::{Card, Rank, Suit};
pub use coord::{Coord, BOARD_CELLS, BOARD_DIM};
pub use domino::DominoTile;
pub use error::RulesError;
pub use outcome::MatchOutcome;
pub use rng::{MatchRng, MatchRngState};
pub use side::{Side, SideMap};
