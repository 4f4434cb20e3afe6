//! Backgammon rule module.
//!
//! Each turn runs a small state machine: `Rolling` (awaiting the
//! authoritative dice roll) then `Moving` (consuming the available-die
//! pool, four entries for a double) and back to `Rolling` for the opponent.
//! Checkers on the bar must enter before anything else may move; a turn
//! with no legal consuming move empties the pool without an explicit pass.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::{MatchOutcome, MatchRng, RulesError, Side, SideMap};
use crate::rules::{GameRules, Priority};

/// Number of points on the board.
pub const POINT_COUNT: usize = 24;

/// Checkers per side.
pub const CHECKERS_PER_SIDE: u8 = 15;

/// A single point: stack owner and height. `owner` is `None` iff empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub owner: Option<Side>,
    pub count: u8,
}

impl Point {
    const EMPTY: Point = Point {
        owner: None,
        count: 0,
    };
}

/// Turn phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgammonPhase {
    Rolling,
    Moving,
}

/// Canonical backgammon state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgammonState {
    points: Vec<Point>,
    bar: SideMap<u8>,
    borne_off: SideMap<u8>,
    /// Remaining die values this turn; a double contributes four uses.
    dice: SmallVec<[u8; 4]>,
    phase: BackgammonPhase,
    to_move: Side,
    rng: MatchRng,
}

/// Move envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgammonMove {
    /// Roll the dice (only valid in the `Rolling` phase).
    Roll,
    /// Enter a checker from the bar with one die.
    #[serde(rename_all = "camelCase")]
    Enter { die_value: u8 },
    /// Move a checker `dieValue` pips forward.
    #[serde(rename_all = "camelCase")]
    Step { from: u8, to: u8, die_value: u8 },
    /// Bear a checker off past the board edge.
    #[serde(rename_all = "camelCase")]
    BearOff { from: u8, die_value: u8 },
}

/// Backgammon rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct BackgammonRules;

/// The point a die enters on from the bar.
fn entry_point(side: Side, die: u8) -> usize {
    match side {
        Side::First => die as usize - 1,
        Side::Second => POINT_COUNT - die as usize,
    }
}

/// Destination of a step; out of 0..24 means past the edge.
fn destination(side: Side, from: usize, die: u8) -> i32 {
    match side {
        Side::First => from as i32 + die as i32,
        Side::Second => from as i32 - die as i32,
    }
}

fn home_range(side: Side) -> std::ops::Range<usize> {
    match side {
        Side::First => 18..24,
        Side::Second => 0..6,
    }
}

impl BackgammonState {
    /// Standard starting layout, first side to roll.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut points = vec![Point::EMPTY; POINT_COUNT];
        for (index, count) in [(0usize, 2u8), (11, 5), (16, 3), (18, 5)] {
            points[index] = Point {
                owner: Some(Side::First),
                count,
            };
            points[POINT_COUNT - 1 - index] = Point {
                owner: Some(Side::Second),
                count,
            };
        }
        Self {
            points,
            bar: SideMap::with_value(0),
            borne_off: SideMap::with_value(0),
            dice: SmallVec::new(),
            phase: BackgammonPhase::Rolling,
            to_move: Side::First,
            rng: MatchRng::new(seed),
        }
    }

    /// The point at an index.
    #[must_use]
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Checkers a side has on the bar.
    #[must_use]
    pub fn bar(&self, side: Side) -> u8 {
        self.bar[side]
    }

    /// Checkers a side has borne off.
    #[must_use]
    pub fn borne_off(&self, side: Side) -> u8 {
        self.borne_off[side]
    }

    /// Remaining die values this turn.
    #[must_use]
    pub fn dice(&self) -> &[u8] {
        &self.dice
    }

    /// The side to move.
    #[must_use]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Current turn phase.
    #[must_use]
    pub fn phase(&self) -> BackgammonPhase {
        self.phase
    }

    /// A point is open to a side unless ≥2 enemy checkers hold it.
    fn is_open(&self, index: usize, side: Side) -> bool {
        let point = self.points[index];
        point.count < 2 || point.owner == Some(side)
    }

    /// All 15 checkers in the home quadrant or borne off.
    fn all_home(&self, side: Side) -> bool {
        if self.bar[side] > 0 {
            return false;
        }
        let home = home_range(side);
        self.points
            .iter()
            .enumerate()
            .all(|(i, p)| p.owner != Some(side) || home.contains(&i))
    }

    fn remove_checker(&mut self, index: usize, side: Side) {
        let point = &mut self.points[index];
        debug_assert_eq!(point.owner, Some(side));
        point.count -= 1;
        if point.count == 0 {
            point.owner = None;
        }
    }

    /// Place a checker, hitting a lone enemy blot to the bar.
    fn add_checker(&mut self, index: usize, side: Side) {
        let point = &mut self.points[index];
        if point.owner == Some(side.opponent()) {
            debug_assert_eq!(point.count, 1);
            self.bar[side.opponent()] += 1;
            *point = Point {
                owner: Some(side),
                count: 1,
            };
        } else {
            point.owner = Some(side);
            point.count += 1;
        }
    }

    /// Moves that consume a die from the current pool.
    fn consuming_moves(&self, side: Side) -> Vec<BackgammonMove> {
        let mut out = Vec::new();
        let mut seen: SmallVec<[u8; 4]> = SmallVec::new();
        for &die in &self.dice {
            if seen.contains(&die) {
                continue;
            }
            seen.push(die);

            if self.bar[side] > 0 {
                // Bar entry takes priority over every board move.
                let entry = entry_point(side, die);
                if self.is_open(entry, side) {
                    out.push(BackgammonMove::Enter { die_value: die });
                }
                continue;
            }
            for from in 0..POINT_COUNT {
                if self.points[from].owner != Some(side) {
                    continue;
                }
                let dest = destination(side, from, die);
                if (0..POINT_COUNT as i32).contains(&dest) {
                    if self.is_open(dest as usize, side) {
                        out.push(BackgammonMove::Step {
                            from: from as u8,
                            to: dest as u8,
                            die_value: die,
                        });
                    }
                } else if self.all_home(side) {
                    out.push(BackgammonMove::BearOff {
                        from: from as u8,
                        die_value: die,
                    });
                }
            }
        }
        out
    }

    /// Consume one instance of a die value from the pool.
    fn consume_die(&mut self, die: u8) {
        let pos = self
            .dice
            .iter()
            .position(|&d| d == die)
            .expect("die presence checked before consumption");
        self.dice.remove(pos);
    }

    /// End the turn early when no remaining die can be played.
    fn settle_turn(&mut self, side: Side) {
        if self.dice.is_empty() || self.consuming_moves(side).is_empty() {
            if !self.dice.is_empty() {
                debug!(side = %side, "no playable die remains, forfeiting rest of turn");
            }
            self.dice.clear();
            self.phase = BackgammonPhase::Rolling;
            self.to_move = side.opponent();
        }
    }

    fn check_invariants(&self) -> Result<(), RulesError> {
        for side in Side::both() {
            let on_board: u8 = self
                .points
                .iter()
                .filter(|p| p.owner == Some(side))
                .map(|p| p.count)
                .sum();
            let total = on_board + self.bar[side] + self.borne_off[side];
            if total != CHECKERS_PER_SIDE {
                return Err(RulesError::corrupt(format!(
                    "{side} has {total} checkers, expected {CHECKERS_PER_SIDE}"
                )));
            }
        }
        Ok(())
    }
}

impl GameRules for BackgammonRules {
    type State = BackgammonState;
    type Move = BackgammonMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move)
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move != side || self.is_terminal(state).is_some() {
            return vec![];
        }
        match state.phase {
            BackgammonPhase::Rolling => vec![BackgammonMove::Roll],
            BackgammonPhase::Moving => state.consuming_moves(side),
        }
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
            BackgammonMove::Roll => {
                if state.phase != BackgammonPhase::Rolling {
                    return Err(RulesError::illegal("dice already rolled this turn"));
                }
                let (d1, d2) = (next.rng.roll_die(), next.rng.roll_die());
                next.dice = if d1 == d2 {
                    SmallVec::from_slice(&[d1; 4])
                } else {
                    SmallVec::from_slice(&[d1, d2])
                };
                next.phase = BackgammonPhase::Moving;
                debug!(side = %side, d1, d2, "rolled");
                next.settle_turn(side);
            }
            BackgammonMove::Enter { die_value } => {
                self.validate_board_move(state, side, mv, die_value)?;
                let entry = entry_point(side, die_value);
                next.bar[side] -= 1;
                next.add_checker(entry, side);
                next.consume_die(die_value);
                next.settle_turn(side);
            }
            BackgammonMove::Step {
                from,
                to,
                die_value,
            } => {
                let dest = destination(side, from as usize, die_value);
                if (from as usize) < POINT_COUNT && dest != to as i32 {
                    return Err(RulesError::malformed(format!(
                        "die {die_value} from point {from} lands on {dest}, not {to}"
                    )));
                }
                self.validate_board_move(state, side, mv, die_value)?;
                next.remove_checker(from as usize, side);
                next.add_checker(to as usize, side);
                next.consume_die(die_value);
                next.settle_turn(side);
            }
            BackgammonMove::BearOff { from, die_value } => {
                self.validate_board_move(state, side, mv, die_value)?;
                next.remove_checker(from as usize, side);
                next.borne_off[side] += 1;
                next.consume_die(die_value);
                next.settle_turn(side);
            }
        }
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        for side in Side::both() {
            if state.borne_off[side] == CHECKERS_PER_SIDE {
                return Some(MatchOutcome::winner(side));
            }
        }
        None
    }
}

impl BackgammonRules {
    /// Shared validation for pool-consuming moves.
    fn validate_board_move(
        &self,
        state: &BackgammonState,
        side: Side,
        mv: &BackgammonMove,
        die_value: u8,
    ) -> Result<(), RulesError> {
        if state.phase != BackgammonPhase::Moving {
            return Err(RulesError::illegal("dice have not been rolled yet"));
        }
        if !(1..=6).contains(&die_value) {
            return Err(RulesError::malformed(format!(
                "die value {die_value} out of range"
            )));
        }
        if !state.dice.contains(&die_value) {
            return Err(RulesError::illegal(format!(
                "die value {die_value} is not available"
            )));
        }
        if let BackgammonMove::Step { from, .. } | BackgammonMove::BearOff { from, .. } = *mv {
            if from as usize >= POINT_COUNT {
                return Err(RulesError::malformed(format!(
                    "point index {from} out of range"
                )));
            }
        }
        // Everything else (bar priority, open points, bear-off rights) is
        // the legal-move set itself.
        if !state.consuming_moves(side).contains(mv) {
            return Err(RulesError::illegal("no such move with the rolled dice"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A bare state with no checkers placed; tests fill the board and are
    /// responsible for keeping the 15-checker invariant.
    fn bare(to_move: Side, dice: &[u8]) -> BackgammonState {
        BackgammonState {
            points: vec![Point::EMPTY; POINT_COUNT],
            bar: SideMap::with_value(0),
            borne_off: SideMap::with_value(0),
            dice: SmallVec::from_slice(dice),
            phase: if dice.is_empty() {
                BackgammonPhase::Rolling
            } else {
                BackgammonPhase::Moving
            },
            to_move,
            rng: MatchRng::new(0),
        }
    }

    fn stack(state: &mut BackgammonState, index: usize, side: Side, count: u8) {
        state.points[index] = Point {
            owner: Some(side),
            count,
        };
    }

    #[test]
    fn test_initial_layout() {
        let state = BackgammonState::new(42);
        state.check_invariants().unwrap();
        assert_eq!(state.point(0).count, 2);
        assert_eq!(state.point(23).owner, Some(Side::Second));
        assert_eq!(state.phase(), BackgammonPhase::Rolling);
        assert_eq!(
            BackgammonRules.legal_moves(&state, Side::First),
            vec![BackgammonMove::Roll]
        );
    }

    #[test]
    fn test_roll_fills_pool_and_doubles_give_four() {
        // Scan seeds for a double and a mixed roll to cover both branches.
        let mut saw_double = false;
        let mut saw_mixed = false;
        for seed in 0..50 {
            let state = BackgammonState::new(seed);
            let next = BackgammonRules
                .apply_move(&state, Side::First, &BackgammonMove::Roll)
                .unwrap();
            match next.dice().len() {
                4 => {
                    saw_double = true;
                    assert!(next.dice().iter().all(|&d| d == next.dice()[0]));
                }
                2 => saw_mixed = true,
                n => panic!("unexpected pool size {n}"),
            }
            assert_eq!(next.phase(), BackgammonPhase::Moving);
        }
        assert!(saw_double && saw_mixed);
    }

    #[test]
    fn test_bar_entry_takes_priority() {
        let mut state = bare(Side::First, &[3, 5]);
        state.bar[Side::First] = 1;
        stack(&mut state, 10, Side::First, 14);
        stack(&mut state, 20, Side::Second, 15);

        let moves = BackgammonRules.legal_moves(&state, Side::First);
        // No move originates from the main board while a checker waits on
        // the bar.
        assert!(moves
            .iter()
            .all(|m| matches!(m, BackgammonMove::Enter { .. })));
        assert_eq!(moves.len(), 2);

        let err = BackgammonRules
            .apply_move(
                &state,
                Side::First,
                &BackgammonMove::Step {
                    from: 10,
                    to: 13,
                    die_value: 3,
                },
            )
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_blocked_entry_point() {
        let mut state = bare(Side::First, &[3, 5]);
        state.bar[Side::First] = 1;
        stack(&mut state, 10, Side::First, 14);
        // Die 3 enters on point 2; hold it with two enemy checkers.
        stack(&mut state, 2, Side::Second, 2);
        stack(&mut state, 20, Side::Second, 13);

        let moves = BackgammonRules.legal_moves(&state, Side::First);
        assert_eq!(moves, vec![BackgammonMove::Enter { die_value: 5 }]);
    }

    #[test]
    fn test_entry_points_by_side() {
        assert_eq!(entry_point(Side::First, 1), 0);
        assert_eq!(entry_point(Side::First, 6), 5);
        assert_eq!(entry_point(Side::Second, 1), 23);
        assert_eq!(entry_point(Side::Second, 6), 18);
    }

    #[test]
    fn test_step_hits_lone_blot() {
        let mut state = bare(Side::First, &[4]);
        stack(&mut state, 0, Side::First, 15);
        stack(&mut state, 4, Side::Second, 1);
        stack(&mut state, 20, Side::Second, 14);

        let next = BackgammonRules
            .apply_move(
                &state,
                Side::First,
                &BackgammonMove::Step {
                    from: 0,
                    to: 4,
                    die_value: 4,
                },
            )
            .unwrap();
        assert_eq!(next.bar(Side::Second), 1);
        assert_eq!(next.point(4).owner, Some(Side::First));
        assert_eq!(next.point(4).count, 1);
        next.check_invariants().unwrap();
    }

    #[test]
    fn test_step_destination_must_match_die() {
        let mut state = bare(Side::First, &[4]);
        stack(&mut state, 0, Side::First, 15);
        stack(&mut state, 20, Side::Second, 15);

        let err = BackgammonRules
            .apply_move(
                &state,
                Side::First,
                &BackgammonMove::Step {
                    from: 0,
                    to: 5,
                    die_value: 4,
                },
            )
            .unwrap_err();
        assert!(matches!(err, RulesError::MalformedMove(_)));
    }

    #[test]
    fn test_bear_off_requires_all_home() {
        let mut state = bare(Side::First, &[6]);
        stack(&mut state, 19, Side::First, 14);
        stack(&mut state, 10, Side::First, 1);
        stack(&mut state, 0, Side::Second, 15);

        let moves = BackgammonRules.legal_moves(&state, Side::First);
        assert!(!moves
            .iter()
            .any(|m| matches!(m, BackgammonMove::BearOff { .. })));

        // Bring the straggler home and bearing off opens up.
        let mut state = bare(Side::First, &[6]);
        stack(&mut state, 19, Side::First, 15);
        stack(&mut state, 0, Side::Second, 15);
        let moves = BackgammonRules.legal_moves(&state, Side::First);
        assert!(moves.contains(&BackgammonMove::BearOff {
            from: 19,
            die_value: 6,
        }));
    }

    #[test]
    fn test_turn_passes_when_pool_exhausted() {
        let mut state = bare(Side::First, &[2]);
        stack(&mut state, 0, Side::First, 15);
        stack(&mut state, 20, Side::Second, 15);

        let next = BackgammonRules
            .apply_move(
                &state,
                Side::First,
                &BackgammonMove::Step {
                    from: 0,
                    to: 2,
                    die_value: 2,
                },
            )
            .unwrap();
        assert_eq!(next.to_move(), Side::Second);
        assert_eq!(next.phase(), BackgammonPhase::Rolling);
        assert!(next.dice().is_empty());
    }

    #[test]
    fn test_roll_with_no_entry_forfeits_turn() {
        // First is on the bar and every entry point is held.
        let mut state = bare(Side::First, &[]);
        state.bar[Side::First] = 1;
        stack(&mut state, 10, Side::First, 14);
        for index in 0..6 {
            stack(&mut state, index, Side::Second, 2);
        }
        stack(&mut state, 20, Side::Second, 3);

        let next = BackgammonRules
            .apply_move(&state, Side::First, &BackgammonMove::Roll)
            .unwrap();
        assert!(next.dice().is_empty());
        assert_eq!(next.to_move(), Side::Second);
        assert_eq!(next.phase(), BackgammonPhase::Rolling);
    }

    #[test]
    fn test_roll_during_moving_phase_rejected() {
        let mut state = bare(Side::First, &[3, 4]);
        stack(&mut state, 0, Side::First, 15);
        stack(&mut state, 20, Side::Second, 15);

        let err = BackgammonRules
            .apply_move(&state, Side::First, &BackgammonMove::Roll)
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalMove(_)));
    }

    #[test]
    fn test_bear_off_win() {
        let mut state = bare(Side::First, &[1]);
        stack(&mut state, 23, Side::First, 1);
        state.borne_off[Side::First] = 14;
        stack(&mut state, 0, Side::Second, 15);

        let next = BackgammonRules
            .apply_move(
                &state,
                Side::First,
                &BackgammonMove::BearOff {
                    from: 23,
                    die_value: 1,
                },
            )
            .unwrap();
        assert_eq!(
            BackgammonRules.is_terminal(&next),
            Some(MatchOutcome::winner(Side::First))
        );
    }

    #[test]
    fn test_checker_count_invariant() {
        let mut state = bare(Side::First, &[3, 4]);
        stack(&mut state, 0, Side::First, 14); // One checker short.
        stack(&mut state, 20, Side::Second, 15);

        let err = BackgammonRules
            .apply_move(
                &state,
                Side::First,
                &BackgammonMove::Step {
                    from: 0,
                    to: 3,
                    die_value: 3,
                },
            )
            .unwrap_err();
        assert!(matches!(err, RulesError::StateCorruption(_)));
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let a = BackgammonState::new(7);
        let b = BackgammonState::new(7);
        let ra = BackgammonRules
            .apply_move(&a, Side::First, &BackgammonMove::Roll)
            .unwrap();
        let rb = BackgammonRules
            .apply_move(&b, Side::First, &BackgammonMove::Roll)
            .unwrap();
        assert_eq!(ra, rb);
    }
}
