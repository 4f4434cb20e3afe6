//! Bingo rule module (75-ball, 5×5 cards, free center).
//!
//! Calling alternates between the sides; each call opens a marking window
//! in which both sides hold priority to mark called numbers on their own
//! card or signal they are done. A bingo claim is validated against the
//! authoritative marked set at claim time — a client-side line counts for
//! nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{MatchOutcome, MatchRng, RulesError, Side, SideMap};
use crate::rules::{GameRules, Priority};

/// Card dimension.
pub const CARD_DIM: usize = 5;

/// Highest callable number.
pub const MAX_NUMBER: u8 = 75;

/// A 5×5 bingo card. Column `c` holds numbers from `15c+1..=15(c+1)`;
/// the center cell is the free space, stored as 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoCard {
    numbers: [[u8; CARD_DIM]; CARD_DIM],
}

impl BingoCard {
    /// Draw a random card.
    fn generate(rng: &mut MatchRng) -> Self {
        let mut numbers = [[0u8; CARD_DIM]; CARD_DIM];
        for col in 0..CARD_DIM {
            let mut pool: Vec<u8> =
                (col as u8 * 15 + 1..=(col as u8 + 1) * 15).collect();
            rng.shuffle(&mut pool);
            for row in 0..CARD_DIM {
                numbers[row][col] = pool[row];
            }
        }
        numbers[2][2] = 0;
        Self { numbers }
    }

    /// The number at a cell; 0 marks the free center.
    #[must_use]
    pub fn number(&self, row: usize, col: usize) -> u8 {
        self.numbers[row][col]
    }

    /// Whether the card carries a number.
    #[must_use]
    pub fn contains(&self, number: u8) -> bool {
        self.numbers.iter().any(|row| row.contains(&number))
    }
}

/// Round phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BingoPhase {
    /// The caller side draws the next number.
    Calling,
    /// Both sides mark (or decline to mark) the called numbers.
    Marking,
}

/// Canonical bingo state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BingoState {
    cards: SideMap<BingoCard>,
    /// Numbers each side has marked on its card.
    marked: SideMap<im::HashSet<u8>>,
    /// Call history, in call order; a number is never reissued.
    called: Vec<u8>,
    /// Numbers not yet called.
    pool: Vec<u8>,
    caller: Side,
    /// Which sides have finished the current marking window.
    responded: SideMap<bool>,
    phase: BingoPhase,
    winner: Option<Side>,
    rng: MatchRng,
}

/// Move envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BingoMove {
    /// Draw the next number from the authoritative pool.
    CallNumber,
    /// Mark a called number on the mover's own card.
    MarkNumber { number: u8 },
    /// Claim a completed row, column, or diagonal.
    ClaimBingo,
    /// Finish marking for this round.
    ContinueGame,
}

/// Bingo rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct BingoRules;

impl BingoState {
    /// Deal both cards and seed the call pool.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = MatchRng::new(seed);
        let cards = SideMap::from_pair(BingoCard::generate(&mut rng), BingoCard::generate(&mut rng));
        Self {
            cards,
            marked: SideMap::with_default(),
            called: Vec::new(),
            pool: (1..=MAX_NUMBER).collect(),
            caller: Side::First,
            responded: SideMap::with_value(false),
            phase: BingoPhase::Calling,
            winner: None,
            rng,
        }
    }

    /// A side's card.
    #[must_use]
    pub fn card(&self, side: Side) -> &BingoCard {
        &self.cards[side]
    }

    /// Call history, oldest first.
    #[must_use]
    pub fn called(&self) -> &[u8] {
        &self.called
    }

    /// The side whose turn it is to call.
    #[must_use]
    pub fn caller(&self) -> Side {
        self.caller
    }

    /// Current round phase.
    #[must_use]
    pub fn phase(&self) -> BingoPhase {
        self.phase
    }

    /// Whether a side has marked a number.
    #[must_use]
    pub fn is_marked(&self, side: Side, number: u8) -> bool {
        self.marked[side].contains(&number)
    }

    fn covered(&self, side: Side, row: usize, col: usize) -> bool {
        let number = self.cards[side].numbers[row][col];
        number == 0 || self.marked[side].contains(&number)
    }

    /// Whether a full row, column, or diagonal is covered.
    fn has_line(&self, side: Side) -> bool {
        for i in 0..CARD_DIM {
            if (0..CARD_DIM).all(|j| self.covered(side, i, j)) {
                return true;
            }
            if (0..CARD_DIM).all(|j| self.covered(side, j, i)) {
                return true;
            }
        }
        (0..CARD_DIM).all(|i| self.covered(side, i, i))
            || (0..CARD_DIM).all(|i| self.covered(side, i, CARD_DIM - 1 - i))
    }

    fn check_invariants(&self) -> Result<(), RulesError> {
        for (i, number) in self.called.iter().enumerate() {
            if self.called[i + 1..].contains(number) {
                return Err(RulesError::corrupt(format!("number {number} called twice")));
            }
            if self.pool.contains(number) {
                return Err(RulesError::corrupt(format!(
                    "called number {number} still in the pool"
                )));
            }
        }
        for side in Side::both() {
            for number in &self.marked[side] {
                if !self.called.contains(number) {
                    return Err(RulesError::corrupt(format!(
                        "{side} marked {number} before it was called"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GameRules for BingoRules {
    type State = BingoState;
    type Move = BingoMove;

    fn priority(&self, _state: &Self::State) -> Priority {
        // Marking and claiming are simultaneous; caller alternation is
        // enforced per move.
        Priority::Both
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if self.is_terminal(state).is_some() {
            return vec![];
        }
        let mut moves = Vec::new();
        match state.phase {
            BingoPhase::Calling => {
                if side == state.caller && !state.pool.is_empty() {
                    moves.push(BingoMove::CallNumber);
                }
            }
            BingoPhase::Marking => {
                if !state.responded[side] {
                    for &number in &state.called {
                        if state.cards[side].contains(number)
                            && !state.marked[side].contains(&number)
                        {
                            moves.push(BingoMove::MarkNumber { number });
                        }
                    }
                    moves.push(BingoMove::ContinueGame);
                }
            }
        }
        if state.has_line(side) {
            moves.push(BingoMove::ClaimBingo);
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
        if self.is_terminal(state).is_some() {
            return Err(RulesError::illegal("the game is already over"));
        }

        let mut next = state.clone();
        match *mv {
            BingoMove::CallNumber => {
                if state.phase != BingoPhase::Calling {
                    return Err(RulesError::illegal("marking is still in progress"));
                }
                if side != state.caller {
                    return Err(RulesError::WrongTurn(side));
                }
                if state.pool.is_empty() {
                    return Err(RulesError::illegal("every number has been called"));
                }
                let index = next.rng.gen_range_usize(0..next.pool.len());
                let number = next.pool.remove(index);
                next.called.push(number);
                next.phase = BingoPhase::Marking;
                next.responded = SideMap::with_value(false);
                debug!(side = %side, number, "called");
            }
            BingoMove::MarkNumber { number } => {
                if state.phase != BingoPhase::Marking {
                    return Err(RulesError::illegal("no marking window is open"));
                }
                if state.responded[side] {
                    return Err(RulesError::illegal("already done marking this round"));
                }
                if number == 0 {
                    return Err(RulesError::illegal("the free center is pre-marked"));
                }
                if !state.cards[side].contains(number) {
                    return Err(RulesError::illegal(format!(
                        "number {number} is not on the card"
                    )));
                }
                if !state.called.contains(&number) {
                    return Err(RulesError::illegal(format!(
                        "number {number} has not been called"
                    )));
                }
                if state.marked[side].contains(&number) {
                    return Err(RulesError::illegal(format!(
                        "number {number} is already marked"
                    )));
                }
                next.marked[side].insert(number);
            }
            BingoMove::ClaimBingo => {
                if !state.has_line(side) {
                    return Err(RulesError::illegal("no completed line on the card"));
                }
                next.winner = Some(side);
                debug!(side = %side, "bingo");
            }
            BingoMove::ContinueGame => {
                if state.phase != BingoPhase::Marking {
                    return Err(RulesError::illegal("no marking window is open"));
                }
                if state.responded[side] {
                    return Err(RulesError::illegal("already done marking this round"));
                }
                next.responded[side] = true;
                if Side::both().iter().all(|&s| next.responded[s]) {
                    next.phase = BingoPhase::Calling;
                    next.caller = state.caller.opponent();
                    next.responded = SideMap::with_value(false);
                }
            }
        }
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        if let Some(side) = state.winner {
            return Some(MatchOutcome::winner(side));
        }
        // Pool exhausted and the final marking window closed with no claim.
        if state.pool.is_empty() && state.phase == BingoPhase::Calling {
            return Some(MatchOutcome::draw());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A deterministic card: column ranges laid out in order.
    fn plain_card() -> BingoCard {
        let mut numbers = [[0u8; CARD_DIM]; CARD_DIM];
        for row in 0..CARD_DIM {
            for col in 0..CARD_DIM {
                numbers[row][col] = (col * 15 + row + 1) as u8;
            }
        }
        numbers[2][2] = 0;
        BingoCard { numbers }
    }

    fn fixture(called: Vec<u8>, phase: BingoPhase) -> BingoState {
        let pool = (1..=MAX_NUMBER).filter(|n| !called.contains(n)).collect();
        BingoState {
            cards: SideMap::from_pair(plain_card(), plain_card()),
            marked: SideMap::with_default(),
            called,
            pool,
            caller: Side::First,
            responded: SideMap::with_value(false),
            phase,
            winner: None,
            rng: MatchRng::new(0),
        }
    }

    #[test]
    fn test_generated_card_shape() {
        let state = BingoState::new(42);
        for side in Side::both() {
            let card = state.card(side);
            assert_eq!(card.number(2, 2), 0);
            for row in 0..CARD_DIM {
                for col in 0..CARD_DIM {
                    let number = card.number(row, col);
                    if (row, col) == (2, 2) {
                        continue;
                    }
                    let low = col as u8 * 15 + 1;
                    assert!((low..low + 15).contains(&number));
                }
            }
        }
    }

    #[test]
    fn test_call_opens_marking_window() {
        let state = BingoState::new(42);
        let next = BingoRules
            .apply_move(&state, Side::First, &BingoMove::CallNumber)
            .unwrap();
        assert_eq!(next.called().len(), 1);
        assert_eq!(next.phase(), BingoPhase::Marking);
        assert!(!next.pool.contains(&next.called()[0]));
    }

    #[test]
    fn test_call_out_of_turn_rejected() {
        let state = BingoState::new(42);
        let err = BingoRules
            .apply_move(&state, Side::Second, &BingoMove::CallNumber)
            .unwrap_err();
        assert!(matches!(err, RulesError::WrongTurn(_)));
    }

    #[test]
    fn test_mark_requires_called_number() {
        let state = fixture(vec![1], BingoPhase::Marking);
        // 2 is on the card but was never called.
        let err = BingoRules
            .apply_move(&state, Side::First, &BingoMove::MarkNumber { number: 2 })
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));

        let next = BingoRules
            .apply_move(&state, Side::First, &BingoMove::MarkNumber { number: 1 })
            .unwrap();
        assert!(next.is_marked(Side::First, 1));
    }

    #[test]
    fn test_mark_free_center_rejected() {
        let state = fixture(vec![1], BingoPhase::Marking);
        let err = BingoRules
            .apply_move(&state, Side::First, &BingoMove::MarkNumber { number: 0 })
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_mark_number_not_on_card_rejected() {
        // The plain card's first column holds 1..=5, so 15 is absent.
        let state = fixture(vec![15], BingoPhase::Marking);
        let err = BingoRules
            .apply_move(&state, Side::First, &BingoMove::MarkNumber { number: 15 })
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_claim_without_line_rejected() {
        let state = fixture(vec![1, 16], BingoPhase::Marking);
        let err = BingoRules
            .apply_move(&state, Side::First, &BingoMove::ClaimBingo)
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_claim_with_completed_row_wins() {
        // Row 0 of the plain card: 1, 16, 31, 46, 61.
        let row = vec![1u8, 16, 31, 46, 61];
        let mut state = fixture(row.clone(), BingoPhase::Marking);
        for &number in &row {
            state = BingoRules
                .apply_move(&state, Side::Second, &BingoMove::MarkNumber { number })
                .unwrap();
        }
        let next = BingoRules
            .apply_move(&state, Side::Second, &BingoMove::ClaimBingo)
            .unwrap();
        assert_eq!(
            BingoRules.is_terminal(&next),
            Some(MatchOutcome::winner(Side::Second))
        );
    }

    #[test]
    fn test_center_row_needs_only_four_marks() {
        // Row 2 of the plain card: 3, 18, 0 (free), 48, 63.
        let row = vec![3u8, 18, 48, 63];
        let mut state = fixture(row.clone(), BingoPhase::Marking);
        for &number in &row {
            state = BingoRules
                .apply_move(&state, Side::First, &BingoMove::MarkNumber { number })
                .unwrap();
        }
        assert!(state.has_line(Side::First));
    }

    #[test]
    fn test_continue_from_both_alternates_caller() {
        let state = fixture(vec![1], BingoPhase::Marking);
        let state = BingoRules
            .apply_move(&state, Side::First, &BingoMove::ContinueGame)
            .unwrap();
        assert_eq!(state.phase(), BingoPhase::Marking);
        let state = BingoRules
            .apply_move(&state, Side::Second, &BingoMove::ContinueGame)
            .unwrap();
        assert_eq!(state.phase(), BingoPhase::Calling);
        assert_eq!(state.caller(), Side::Second);
    }

    #[test]
    fn test_double_continue_rejected() {
        let state = fixture(vec![1], BingoPhase::Marking);
        let state = BingoRules
            .apply_move(&state, Side::First, &BingoMove::ContinueGame)
            .unwrap();
        let err = BingoRules
            .apply_move(&state, Side::First, &BingoMove::ContinueGame)
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_exhausted_pool_is_draw() {
        let mut state = fixture((1..=MAX_NUMBER).collect(), BingoPhase::Calling);
        assert!(state.pool.is_empty());
        assert_eq!(BingoRules.is_terminal(&state), Some(MatchOutcome::draw()));

        // Mid-marking the game is still open for claims.
        state.phase = BingoPhase::Marking;
        assert_eq!(BingoRules.is_terminal(&state), None);
    }

    #[test]
    fn test_mark_before_call_is_corruption() {
        let mut state = fixture(vec![1], BingoPhase::Marking);
        state.marked[Side::First].insert(2);
        let err = BingoRules
            .apply_move(&state, Side::First, &BingoMove::MarkNumber { number: 1 })
            .unwrap_err();
        assert!(matches!(err, RulesError::StateCorruption(_)));
    }
}
