//! Farkle-style dice rule module.
//!
//! A turn alternates rolling and selecting: every selected die must take
//! part in a scoring pattern, selected dice lock, and a roll that leaves
//! the unlocked dice with no scoring selection is a farkle — the turn
//! score evaporates and the turn passes. Locking all six frees them all
//! again ("hot dice"). Banking moves the turn score to the side's total;
//! the first side to bank the target wins.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::{MatchOutcome, MatchRng, RulesError, Side, SideMap};
use crate::rules::{GameRules, Priority};

/// Banked total that ends the match.
pub const TARGET_SCORE: u32 = 10_000;

/// Number of dice in play.
pub const DICE_COUNT: usize = 6;

/// Turn phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DicePhase {
    /// Awaiting a roll of the unlocked dice.
    Rolling,
    /// Awaiting a scoring selection from the last roll.
    Selecting,
}

/// Canonical dice-game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceState {
    dice: [u8; DICE_COUNT],
    locked: [bool; DICE_COUNT],
    turn_score: u32,
    banked: SideMap<u32>,
    to_move: Side,
    phase: DicePhase,
    rng: MatchRng,
}

/// Move envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiceMove {
    /// Re-randomize all unlocked dice.
    Roll,
    /// Lock a scoring subset of the unlocked dice.
    #[serde(rename_all = "camelCase")]
    SelectDice {
        dice_indices: SmallVec<[u8; DICE_COUNT]>,
    },
    /// Bank the turn score and pass the turn.
    BankPoints,
}

/// Dice rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiceRules;

/// Score a selected set of die faces, or `None` if any selected die fails
/// to participate in a scoring pattern.
///
/// Singles: 1 = 100, 5 = 50. Triples: `face × 100` (triple ones = 1000).
/// Four/five/six of a kind: 1000/2000/3000. A full straight or three
/// distinct pairs: 1500.
#[must_use]
pub fn score_selection(faces: &[u8]) -> Option<u32> {
    if faces.is_empty() || faces.len() > DICE_COUNT {
        return None;
    }
    if faces.iter().any(|&f| !(1..=6).contains(&f)) {
        return None;
    }
    let mut counts = [0u8; 7];
    for &face in faces {
        counts[face as usize] += 1;
    }

    if faces.len() == 6 {
        if (1..=6).all(|f| counts[f] == 1) {
            return Some(1500);
        }
        if counts.iter().filter(|&&c| c == 2).count() == 3 {
            return Some(1500);
        }
    }

    let mut total = 0u32;
    for face in 1..=6usize {
        match counts[face] {
            0 => {}
            3 => total += if face == 1 { 1000 } else { face as u32 * 100 },
            4 => total += 1000,
            5 => total += 2000,
            6 => total += 3000,
            count @ (1 | 2) => match face {
                1 => total += 100 * count as u32,
                5 => total += 50 * count as u32,
                _ => return None,
            },
            _ => return None,
        }
    }
    Some(total)
}

impl DiceState {
    /// Fresh match, first side to roll.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            dice: [1; DICE_COUNT],
            locked: [false; DICE_COUNT],
            turn_score: 0,
            banked: SideMap::with_value(0),
            to_move: Side::First,
            phase: DicePhase::Rolling,
            rng: MatchRng::new(seed),
        }
    }

    /// Current die faces.
    #[must_use]
    pub fn dice(&self) -> &[u8; DICE_COUNT] {
        &self.dice
    }

    /// Which dice are locked.
    #[must_use]
    pub fn locked(&self) -> &[bool; DICE_COUNT] {
        &self.locked
    }

    /// Score accumulated this turn but not yet banked.
    #[must_use]
    pub fn turn_score(&self) -> u32 {
        self.turn_score
    }

    /// A side's banked total.
    #[must_use]
    pub fn banked(&self, side: Side) -> u32 {
        self.banked[side]
    }

    /// The side to move.
    #[must_use]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Current turn phase.
    #[must_use]
    pub fn phase(&self) -> DicePhase {
        self.phase
    }

    fn unlocked_indices(&self) -> Vec<u8> {
        (0..DICE_COUNT)
            .filter(|&i| !self.locked[i])
            .map(|i| i as u8)
            .collect()
    }

    /// Whether the unlocked dice admit any scoring selection.
    fn has_scoring_selection(&self) -> bool {
        let faces: Vec<u8> = self
            .unlocked_indices()
            .iter()
            .map(|&i| self.dice[i as usize])
            .collect();
        let mut counts = [0u8; 7];
        for &face in &faces {
            counts[face as usize] += 1;
        }
        if counts[1] > 0 || counts[5] > 0 || counts.iter().any(|&c| c >= 3) {
            return true;
        }
        faces.len() == 6 && score_selection(&faces).is_some()
    }

    fn reset_turn(&mut self) {
        self.turn_score = 0;
        self.locked = [false; DICE_COUNT];
        self.to_move = self.to_move.opponent();
        self.phase = DicePhase::Rolling;
    }

    fn check_invariants(&self) -> Result<(), RulesError> {
        if self.dice.iter().any(|&f| !(1..=6).contains(&f)) {
            return Err(RulesError::corrupt("die face outside 1..=6"));
        }
        Ok(())
    }
}

impl GameRules for DiceRules {
    type State = DiceState;
    type Move = DiceMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move)
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move != side || self.is_terminal(state).is_some() {
            return vec![];
        }
        let mut moves = Vec::new();
        match state.phase {
            DicePhase::Rolling => {
                moves.push(DiceMove::Roll);
                if state.turn_score > 0 {
                    moves.push(DiceMove::BankPoints);
                }
            }
            DicePhase::Selecting => {
                let unlocked = state.unlocked_indices();
                for mask in 1u32..(1 << unlocked.len()) {
                    let indices: SmallVec<[u8; DICE_COUNT]> = unlocked
                        .iter()
                        .enumerate()
                        .filter(|(bit, _)| mask & (1 << bit) != 0)
                        .map(|(_, &i)| i)
                        .collect();
                    let faces: Vec<u8> =
                        indices.iter().map(|&i| state.dice[i as usize]).collect();
                    if score_selection(&faces).is_some() {
                        moves.push(DiceMove::SelectDice {
                            dice_indices: indices,
                        });
                    }
                }
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
        match mv {
            DiceMove::Roll => {
                if state.phase != DicePhase::Rolling {
                    return Err(RulesError::illegal(
                        "a scoring selection is pending before the next roll",
                    ));
                }
                for i in 0..DICE_COUNT {
                    if !next.locked[i] {
                        next.dice[i] = next.rng.roll_die();
                    }
                }
                if next.has_scoring_selection() {
                    next.phase = DicePhase::Selecting;
                } else {
                    debug!(side = %side, dice = ?next.dice, "farkle");
                    next.reset_turn();
                }
            }
            DiceMove::SelectDice { dice_indices } => {
                if state.phase != DicePhase::Selecting {
                    return Err(RulesError::illegal("there is no fresh roll to select from"));
                }
                if dice_indices.is_empty() {
                    return Err(RulesError::malformed("empty dice selection"));
                }
                let mut seen = [false; DICE_COUNT];
                for &index in dice_indices {
                    let index = index as usize;
                    if index >= DICE_COUNT {
                        return Err(RulesError::malformed(format!(
                            "die index {index} out of range"
                        )));
                    }
                    if seen[index] {
                        return Err(RulesError::malformed(format!(
                            "die index {index} selected twice"
                        )));
                    }
                    seen[index] = true;
                    if state.locked[index] {
                        return Err(RulesError::illegal(format!(
                            "die {index} is already locked"
                        )));
                    }
                }
                let faces: Vec<u8> = dice_indices
                    .iter()
                    .map(|&i| state.dice[i as usize])
                    .collect();
                let Some(score) = score_selection(&faces) else {
                    return Err(RulesError::illegal(
                        "every selected die must be part of a scoring pattern",
                    ));
                };
                next.turn_score += score;
                for &index in dice_indices {
                    next.locked[index as usize] = true;
                }
                // Hot dice: locking the sixth frees all of them.
                if next.locked.iter().all(|&l| l) {
                    next.locked = [false; DICE_COUNT];
                }
                next.phase = DicePhase::Rolling;
            }
            DiceMove::BankPoints => {
                if state.phase != DicePhase::Rolling || state.turn_score == 0 {
                    return Err(RulesError::illegal("there is nothing to bank"));
                }
                next.banked[side] += state.turn_score;
                debug!(side = %side, banked = next.banked[side], "banked");
                next.reset_turn();
            }
        }
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        for side in Side::both() {
            if state.banked[side] >= TARGET_SCORE {
                return Some(MatchOutcome::winner(side));
            }
        }
        None
    }
}
