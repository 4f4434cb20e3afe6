//! Coordinates on an 8×8 board.
//!
//! Chess and checkers share the same board geometry: squares are addressed
//! either as a `Coord` (row, column) or as a flat cell index `row * 8 + col`.
//! Row 0 is the first side's back rank.

use serde::{Deserialize, Serialize};

/// Number of rows/columns on an 8×8 board.
pub const BOARD_DIM: u8 = 8;

/// Number of cells on an 8×8 board.
pub const BOARD_CELLS: usize = 64;

/// A square on an 8×8 board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    /// Create a coordinate. Panics if out of range.
    #[must_use]
    pub fn new(row: u8, col: u8) -> Self {
        assert!(row < BOARD_DIM && col < BOARD_DIM, "coordinate out of range");
        Self { row, col }
    }

    /// Convert to a flat cell index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.row as usize * BOARD_DIM as usize + self.col as usize
    }

    /// Build from a flat cell index, if in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_CELLS {
            Some(Self {
                row: (index / BOARD_DIM as usize) as u8,
                col: (index % BOARD_DIM as usize) as u8,
            })
        } else {
            None
        }
    }

    /// Offset by a (row, col) delta, returning `None` off the board edge.
    #[must_use]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..BOARD_DIM as i8).contains(&row) && (0..BOARD_DIM as i8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Whether this is a dark square (the playable half in checkers).
    #[must_use]
    pub const fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Algebraic style: file letter then 1-based rank.
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for index in 0..BOARD_CELLS {
            let c = Coord::from_index(index).unwrap();
            assert_eq!(c.index(), index);
        }
        assert!(Coord::from_index(64).is_none());
    }

    #[test]
    fn test_offset_bounds() {
        let corner = Coord::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, -1), None);
        assert_eq!(corner.offset(1, 1), Some(Coord::new(1, 1)));

        let far = Coord::new(7, 7);
        assert_eq!(far.offset(1, 0), None);
        assert_eq!(far.offset(-1, -1), Some(Coord::new(6, 6)));
    }

    #[test]
    fn test_dark_squares_checker_pattern() {
        assert!(!Coord::new(0, 0).is_dark());
        assert!(Coord::new(0, 1).is_dark());
        assert!(Coord::new(1, 0).is_dark());
        let dark = (0..BOARD_CELLS)
            .filter(|&i| Coord::from_index(i).unwrap().is_dark())
            .count();
        assert_eq!(dark, 32);
    }

    #[test]
    fn test_display_algebraic() {
        assert_eq!(Coord::new(0, 0).to_string(), "a1");
        assert_eq!(Coord::new(7, 7).to_string(), "h8");
        assert_eq!(Coord::new(3, 4).to_string(), "e4");
    }
}
