//! Domino tile primitive.

use serde::{Deserialize, Serialize};

/// Highest pip value in a double-six set.
pub const MAX_PIP: u8 = 6;

/// A domino tile: an unordered pair of pip values.
///
/// Tiles are normalized on construction so that `(2,5)` and `(5,2)` compare
/// equal; orientation on the board chain is a rule-module concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DominoTile {
    high: u8,
    low: u8,
}

impl DominoTile {
    /// Create a tile. Panics if a pip value exceeds the double-six range.
    #[must_use]
    pub fn new(a: u8, b: u8) -> Self {
        assert!(a <= MAX_PIP && b <= MAX_PIP, "pip value out of range");
        Self {
            high: a.max(b),
            low: a.min(b),
        }
    }

    /// The larger pip value.
    #[must_use]
    pub const fn high(self) -> u8 {
        self.high
    }

    /// The smaller pip value.
    #[must_use]
    pub const fn low(self) -> u8 {
        self.low
    }

    /// Whether either half shows the given pip value.
    #[must_use]
    pub const fn has_end(self, pips: u8) -> bool {
        self.high == pips || self.low == pips
    }

    /// The half opposite a matching half, or `None` if no half matches.
    #[must_use]
    pub fn other_end(self, pips: u8) -> Option<u8> {
        if self.high == pips {
            Some(self.low)
        } else if self.low == pips {
            Some(self.high)
        } else {
            None
        }
    }

    /// Whether both halves match.
    #[must_use]
    pub const fn is_double(self) -> bool {
        self.high == self.low
    }

    /// Total pips on the tile.
    #[must_use]
    pub const fn pip_sum(self) -> u8 {
        self.high + self.low
    }

    /// The full double-six set of 28 tiles.
    #[must_use]
    pub fn double_six_set() -> Vec<DominoTile> {
        let mut set = Vec::with_capacity(28);
        for a in 0..=MAX_PIP {
            for b in a..=MAX_PIP {
                set.push(DominoTile::new(a, b));
            }
        }
        set
    }
}

impl std::fmt::Display for DominoTile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}|{}]", self.high, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_normalized() {
        assert_eq!(DominoTile::new(2, 5), DominoTile::new(5, 2));
        assert_eq!(DominoTile::new(2, 5).high(), 5);
        assert_eq!(DominoTile::new(2, 5).low(), 2);
    }

    #[test]
    fn test_ends() {
        let tile = DominoTile::new(3, 6);
        assert!(tile.has_end(3));
        assert!(tile.has_end(6));
        assert!(!tile.has_end(4));
        assert_eq!(tile.other_end(3), Some(6));
        assert_eq!(tile.other_end(6), Some(3));
        assert_eq!(tile.other_end(0), None);
    }

    #[test]
    fn test_double_six_set() {
        let set = DominoTile::double_six_set();
        assert_eq!(set.len(), 28);
        assert_eq!(set.iter().filter(|t| t.is_double()).count(), 7);
        // Total pips of a double-six set is 168.
        let total: u32 = set.iter().map(|t| t.pip_sum() as u32).sum();
        assert_eq!(total, 168);
    }
}
