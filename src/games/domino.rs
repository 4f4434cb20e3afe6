//! Domino rule module (double-six block/draw game).
//!
//! Tiles join the chain at either open end; a tile whose matching half
//! faces the wrong way is implicitly flipped. With no playable tile the
//! player draws from the boneyard while it lasts, then passes. Two
//! consecutive passes block the game and the lower pip total wins.

use serde::{Deserialize, Serialize};

use crate::core::{DominoTile, MatchOutcome, MatchRng, RulesError, Side, SideMap};
use crate::rules::{GameRules, Priority};

/// Tiles dealt to each hand.
pub const HAND_SIZE: usize = 7;

/// Which open end of the chain a tile is played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainEnd {
    Left,
    Right,
}

/// Canonical domino state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominoState {
    hands: SideMap<Vec<DominoTile>>,
    boneyard: Vec<DominoTile>,
    /// Tiles in chain order, leftmost first.
    chain: Vec<DominoTile>,
    /// Open pip values, `None` until the first tile is placed.
    ends: Option<(u8, u8)>,
    to_move: Side,
    consecutive_passes: u8,
}

/// Move envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DominoMove {
    Play {
        domino: DominoTile,
        #[serde(rename = "side")]
        end: ChainEnd,
    },
    Draw,
    Pass,
}

/// Domino rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct DominoRules;

impl DominoState {
    /// Shuffle the double-six set and deal seven tiles each.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = MatchRng::new(seed);
        let mut tiles = DominoTile::double_six_set();
        rng.shuffle(&mut tiles);

        let mut hands: SideMap<Vec<DominoTile>> = SideMap::with_default();
        for _ in 0..HAND_SIZE {
            for side in Side::both() {
                hands[side].push(tiles.pop().expect("28 tiles cover the deal"));
            }
        }
        Self {
            hands,
            boneyard: tiles,
            chain: Vec::new(),
            ends: None,
            to_move: Side::First,
            consecutive_passes: 0,
        }
    }

    /// A side's hand.
    #[must_use]
    pub fn hand(&self, side: Side) -> &[DominoTile] {
        &self.hands[side]
    }

    /// Tiles left in the boneyard.
    #[must_use]
    pub fn boneyard_size(&self) -> usize {
        self.boneyard.len()
    }

    /// The board chain, leftmost tile first.
    #[must_use]
    pub fn chain(&self) -> &[DominoTile] {
        &self.chain
    }

    /// The open pip values, `None` before the first play.
    #[must_use]
    pub fn open_ends(&self) -> Option<(u8, u8)> {
        self.ends
    }

    /// The side to move.
    #[must_use]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    fn is_playable(&self, tile: DominoTile) -> bool {
        match self.ends {
            None => true,
            Some((left, right)) => tile.has_end(left) || tile.has_end(right),
        }
    }

    fn has_playable_tile(&self, side: Side) -> bool {
        self.hands[side].iter().any(|&t| self.is_playable(t))
    }

    /// Remaining pip total of a hand, for scoring a blocked game.
    fn pip_total(&self, side: Side) -> u32 {
        self.hands[side].iter().map(|t| t.pip_sum() as u32).sum()
    }

    fn check_invariants(&self) -> Result<(), RulesError> {
        let mut all: Vec<DominoTile> = self.boneyard.clone();
        all.extend(self.hands[Side::First].iter());
        all.extend(self.hands[Side::Second].iter());
        all.extend(self.chain.iter());
        for (i, tile) in all.iter().enumerate() {
            if all[i + 1..].contains(tile) {
                return Err(RulesError::corrupt(format!("duplicate tile {tile}")));
            }
        }
        // The chain must connect end to end.
        if let Some((left, right)) = self.ends {
            let mut current = left;
            for tile in &self.chain {
                current = tile.other_end(current).ok_or_else(|| {
                    RulesError::corrupt(format!("{tile} breaks the chain"))
                })?;
            }
            if current != right {
                return Err(RulesError::corrupt("chain ends do not match"));
            }
        } else if !self.chain.is_empty() {
            return Err(RulesError::corrupt("chain has tiles but no open ends"));
        }
        Ok(())
    }
}

impl GameRules for DominoRules {
    type State = DominoState;
    type Move = DominoMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move)
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move != side || self.is_terminal(state).is_some() {
            return vec![];
        }
        let mut moves = Vec::new();
        for &domino in &state.hands[side] {
            match state.ends {
                None => moves.push(DominoMove::Play {
                    domino,
                    end: ChainEnd::Left,
                }),
                Some((left, right)) => {
                    if domino.has_end(left) {
                        moves.push(DominoMove::Play {
                            domino,
                            end: ChainEnd::Left,
                        });
                    }
                    if domino.has_end(right) {
                        moves.push(DominoMove::Play {
                            domino,
                            end: ChainEnd::Right,
                        });
                    }
                }
            }
        }
        if moves.is_empty() {
            if state.boneyard.is_empty() {
                moves.push(DominoMove::Pass);
            } else {
                moves.push(DominoMove::Draw);
            }
        }
        moves
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
        if self.is_terminal(state).is_some() {
            return Err(RulesError::illegal("the game is already over"));
        }

        let mut next = state.clone();
        match *mv {
            DominoMove::Play { domino, end } => {
                let Some(pos) = state.hands[side].iter().position(|&t| t == domino) else {
                    return Err(RulesError::illegal(format!("{domino} is not in hand")));
                };
                match state.ends {
                    None => {
                        next.ends = Some((domino.high(), domino.low()));
                        next.chain.push(domino);
                    }
                    Some((left, right)) => {
                        let connect = match end {
                            ChainEnd::Left => left,
                            ChainEnd::Right => right,
                        };
                        let Some(exposed) = domino.other_end(connect) else {
                            return Err(RulesError::illegal(format!(
                                "{domino} does not match the open end {connect}"
                            )));
                        };
                        match end {
                            ChainEnd::Left => {
                                next.chain.insert(0, domino);
                                next.ends = Some((exposed, right));
                            }
                            ChainEnd::Right => {
                                next.chain.push(domino);
                                next.ends = Some((left, exposed));
                            }
                        }
                    }
                }
                next.hands[side].remove(pos);
                next.consecutive_passes = 0;
                next.to_move = side.opponent();
            }
            DominoMove::Draw => {
                if state.has_playable_tile(side) {
                    return Err(RulesError::illegal(
                        "cannot draw while holding a playable domino",
                    ));
                }
                let Some(tile) = next.boneyard.pop() else {
                    return Err(RulesError::illegal("the boneyard is empty"));
                };
                next.hands[side].push(tile);
                // Drawing does not end the turn; play or draw again.
            }
            DominoMove::Pass => {
                if state.has_playable_tile(side) {
                    return Err(RulesError::illegal(
                        "cannot pass while holding a playable domino",
                    ));
                }
                if !state.boneyard.is_empty() {
                    return Err(RulesError::illegal(
                        "must draw from the boneyard before passing",
                    ));
                }
                next.consecutive_passes += 1;
                next.to_move = side.opponent();
            }
        }
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        for side in Side::both() {
            if state.hands[side].is_empty() && !state.chain.is_empty() {
                return Some(MatchOutcome::winner(side));
            }
        }
        if state.consecutive_passes >= 2 {
            // Blocked game: lower remaining pip total wins.
            let first = state.pip_total(Side::First);
            let second = state.pip_total(Side::Second);
            return Some(match first.cmp(&second) {
                std::cmp::Ordering::Less => MatchOutcome::winner(Side::First),
                std::cmp::Ordering::Greater => MatchOutcome::winner(Side::Second),
                std::cmp::Ordering::Equal => MatchOutcome::draw(),
            });
        }
        None
    }
}
