//! Side identification and per-side data storage.
//!
//! ## Side
//!
//! Every match binds exactly two players. `Side` names the two seats
//! independently of any game-specific color (chess white/black, checkers
//! red/black, Durak attacker/defender all map onto it).
//!
//! ## SideMap
//!
//! Per-side data storage backed by a two-element array for O(1) access.
//! Supports iteration and indexing by `Side`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two seats in a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    /// Get the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    /// Both sides, first seat first.
    #[must_use]
    pub const fn both() -> [Side; 2] {
        [Side::First, Side::Second]
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::First => write!(f, "first side"),
            Side::Second => write!(f, "second side"),
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// Backed by a two-element array, one entry per seat.
///
/// ## Example
///
/// ```
/// use parlor::core::{Side, SideMap};
///
/// let mut score: SideMap<u32> = SideMap::with_value(0);
/// score[Side::First] += 50;
/// assert_eq!(score[Side::First], 50);
/// assert_eq!(score[Side::Second], 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::First), factory(Side::Second)],
        }
    }

    /// Create a new SideMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a new SideMap with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Create a SideMap from explicit per-seat values.
    #[must_use]
    pub fn from_pair(first: T, second: T) -> Self {
        Self {
            data: [first, second],
        }
    }

    /// Get a reference to a side's data.
    #[must_use]
    pub fn get(&self, side: Side) -> &T {
        &self.data[side.index()]
    }

    /// Get a mutable reference to a side's data.
    pub fn get_mut(&mut self, side: Side) -> &mut T {
        &mut self.data[side.index()]
    }

    /// Iterate over (Side, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::both().into_iter().zip(self.data.iter())
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        self.get(side)
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        self.get_mut(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involutive() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::Second.opponent(), Side::First);
        assert_eq!(Side::First.opponent().opponent(), Side::First);
    }

    #[test]
    fn test_side_map_factory() {
        let map = SideMap::new(|s| s.index() * 10);
        assert_eq!(map[Side::First], 0);
        assert_eq!(map[Side::Second], 10);
    }

    #[test]
    fn test_side_map_mutation() {
        let mut map: SideMap<i32> = SideMap::with_value(0);
        map[Side::Second] = 7;
        assert_eq!(map[Side::First], 0);
        assert_eq!(map[Side::Second], 7);
    }

    #[test]
    fn test_side_map_iter() {
        let map = SideMap::from_pair("a", "b");
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(Side::First, &"a"), (Side::Second, &"b")]);
    }

    #[test]
    fn test_side_map_serialization() {
        let map: SideMap<u32> = SideMap::from_pair(3, 9);
        let json = serde_json::to_string(&map).unwrap();
        let back: SideMap<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
