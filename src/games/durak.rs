//! Durak rule module.
//!
//! A bout alternates `Attacking` and `Defending`: the attacker lays a card,
//! the defender beats it or takes, and once every pair on the table is
//! covered the attacker may press on or pass. Passing discards the table
//! and swaps roles; taking hands the table to the defender and keeps the
//! roles. After each bout both players draw back up to six, attacker first,
//! with the face-up trump card at the bottom of the deck drawn last.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Card, MatchOutcome, MatchRng, Rank, RulesError, Side, SideMap, Suit};
use crate::rules::{GameRules, Priority};

/// Cards dealt to (and drawn back up to) each hand.
pub const HAND_SIZE: usize = 6;

/// An attack card and the card beating it, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePair {
    pub attack: Card,
    pub defend: Option<Card>,
}

/// Bout phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurakPhase {
    Attacking,
    Defending,
}

/// Canonical Durak state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurakState {
    /// Draw pile; index 0 is the face-up trump card, drawn last.
    deck: Vec<Card>,
    trump: Suit,
    hands: SideMap<Vec<Card>>,
    table: Vec<TablePair>,
    discard: Vec<Card>,
    attacker: Side,
    phase: DurakPhase,
}

/// Move envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurakMove {
    Attack {
        card: Card,
    },
    #[serde(rename_all = "camelCase")]
    Defend {
        card: Card,
        attack_index: usize,
    },
    /// Concede the bout and pick up the table.
    Take,
    /// Stop attacking; the bout is discarded and roles swap.
    Pass,
}

/// Durak rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct DurakRules;

/// Whether `card` beats `attack` under the given trump suit.
fn beats(card: Card, attack: Card, trump: Suit) -> bool {
    if card.suit == attack.suit {
        card.rank > attack.rank
    } else {
        card.suit == trump
    }
}

impl DurakState {
    /// Shuffle, deal six cards each, and flip the trump.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = MatchRng::new(seed);
        let mut deck = Card::durak_deck();
        rng.shuffle(&mut deck);

        let mut hands: SideMap<Vec<Card>> = SideMap::with_default();
        for _ in 0..HAND_SIZE {
            for side in Side::both() {
                hands[side].push(deck.pop().expect("36 cards cover the deal"));
            }
        }
        let trump = deck[0].suit;
        Self {
            deck,
            trump,
            hands,
            table: Vec::new(),
            discard: Vec::new(),
            attacker: Side::First,
            phase: DurakPhase::Attacking,
        }
    }

    /// The trump suit.
    #[must_use]
    pub fn trump(&self) -> Suit {
        self.trump
    }

    /// A side's hand.
    #[must_use]
    pub fn hand(&self, side: Side) -> &[Card] {
        &self.hands[side]
    }

    /// The table pairs of the current bout.
    #[must_use]
    pub fn table(&self) -> &[TablePair] {
        &self.table
    }

    /// Cards left in the draw pile.
    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    /// The attacking side.
    #[must_use]
    pub fn attacker(&self) -> Side {
        self.attacker
    }

    /// Current bout phase.
    #[must_use]
    pub fn phase(&self) -> DurakPhase {
        self.phase
    }

    fn defender(&self) -> Side {
        self.attacker.opponent()
    }

    fn to_move(&self) -> Side {
        match self.phase {
            DurakPhase::Attacking => self.attacker,
            DurakPhase::Defending => self.defender(),
        }
    }

    fn undefended_count(&self) -> usize {
        self.table.iter().filter(|p| p.defend.is_none()).count()
    }

    /// Ranks present on the table, both attack and defend sides.
    fn table_ranks(&self) -> FxHashSet<Rank> {
        self.table
            .iter()
            .flat_map(|p| {
                std::iter::once(p.attack.rank).chain(p.defend.map(|c| c.rank))
            })
            .collect()
    }

    fn attack_is_legal(&self, card: Card) -> bool {
        if !self.hands[self.attacker].contains(&card) {
            return false;
        }
        // The defender must be able to cover one more attack at all.
        if self.hands[self.defender()].len() <= self.undefended_count() {
            return false;
        }
        self.table.is_empty() || self.table_ranks().contains(&card.rank)
    }

    fn remove_from_hand(&mut self, side: Side, card: Card) {
        let pos = self.hands[side]
            .iter()
            .position(|&c| c == card)
            .expect("card presence checked before removal");
        self.hands[side].remove(pos);
    }

    /// Refill both hands to six, attacker first.
    fn draw_up(&mut self) {
        for side in [self.attacker, self.defender()] {
            while self.hands[side].len() < HAND_SIZE {
                match self.deck.pop() {
                    Some(card) => self.hands[side].push(card),
                    None => break,
                }
            }
        }
    }

    fn check_invariants(&self) -> Result<(), RulesError> {
        let table_cards = self
            .table
            .iter()
            .map(|p| 1 + usize::from(p.defend.is_some()))
            .sum::<usize>();
        let total = self.deck.len()
            + self.hands[Side::First].len()
            + self.hands[Side::Second].len()
            + table_cards
            + self.discard.len();
        if total != 36 {
            return Err(RulesError::corrupt(format!(
                "{total} cards in play, expected 36"
            )));
        }
        for pair in &self.table {
            if let Some(defend) = pair.defend {
                if !beats(defend, pair.attack, self.trump) {
                    return Err(RulesError::corrupt(format!(
                        "{defend} does not beat {} on the table",
                        pair.attack
                    )));
                }
            }
        }
        Ok(())
    }
}

impl GameRules for DurakRules {
    type State = DurakState;
    type Move = DurakMove;

    fn priority(&self, state: &Self::State) -> Priority {
        Priority::Side(state.to_move())
    }

    fn legal_moves(&self, state: &Self::State, side: Side) -> Vec<Self::Move> {
        if state.to_move() != side || self.is_terminal(state).is_some() {
            return vec![];
        }
        let mut moves = Vec::new();
        match state.phase {
            DurakPhase::Attacking => {
                for &card in &state.hands[state.attacker] {
                    if state.attack_is_legal(card) {
                        moves.push(DurakMove::Attack { card });
                    }
                }
                if !state.table.is_empty() {
                    moves.push(DurakMove::Pass);
                }
            }
            DurakPhase::Defending => {
                for (attack_index, pair) in state.table.iter().enumerate() {
                    if pair.defend.is_some() {
                        continue;
                    }
                    for &card in &state.hands[state.defender()] {
                        if beats(card, pair.attack, state.trump) {
                            moves.push(DurakMove::Defend { card, attack_index });
                        }
                    }
                }
                moves.push(DurakMove::Take);
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
        if state.to_move() != side {
            return Err(RulesError::WrongTurn(side));
        }
        if self.is_terminal(state).is_some() {
            return Err(RulesError::illegal("the game is already over"));
        }

        let mut next = state.clone();
        match *mv {
            DurakMove::Attack { card } => {
                if state.phase != DurakPhase::Attacking {
                    return Err(RulesError::illegal("an undefended attack is pending"));
                }
                if !state.hands[side].contains(&card) {
                    return Err(RulesError::illegal(format!("{card} is not in hand")));
                }
                if !state.attack_is_legal(card) {
                    return Err(RulesError::illegal(format!(
                        "{card} cannot join the current attack"
                    )));
                }
                next.remove_from_hand(side, card);
                next.table.push(TablePair {
                    attack: card,
                    defend: None,
                });
                next.phase = DurakPhase::Defending;
                debug!(side = %side, card = %card, "attack");
            }
            DurakMove::Defend { card, attack_index } => {
                if state.phase != DurakPhase::Defending {
                    return Err(RulesError::illegal("there is no attack to defend"));
                }
                let Some(pair) = state.table.get(attack_index) else {
                    return Err(RulesError::malformed(format!(
                        "attack index {attack_index} out of range"
                    )));
                };
                if pair.defend.is_some() {
                    return Err(RulesError::illegal("that attack is already beaten"));
                }
                if !state.hands[side].contains(&card) {
                    return Err(RulesError::illegal(format!("{card} is not in hand")));
                }
                if !beats(card, pair.attack, state.trump) {
                    return Err(RulesError::illegal(format!(
                        "{card} does not beat {}",
                        pair.attack
                    )));
                }
                next.remove_from_hand(side, card);
                next.table[attack_index].defend = Some(card);
                if next.undefended_count() == 0 {
                    next.phase = DurakPhase::Attacking;
                }
            }
            DurakMove::Take => {
                if state.phase != DurakPhase::Defending {
                    return Err(RulesError::illegal("there is nothing to take"));
                }
                let taken: Vec<Card> = next
                    .table
                    .drain(..)
                    .flat_map(|p| {
                        std::iter::once(p.attack).chain(p.defend)
                    })
                    .collect();
                next.hands[side].extend(taken);
                next.draw_up();
                next.phase = DurakPhase::Attacking;
                debug!(side = %side, "took the table");
            }
            DurakMove::Pass => {
                if state.phase != DurakPhase::Attacking || state.table.is_empty() {
                    return Err(RulesError::illegal(
                        "passing requires a fully beaten attack on the table",
                    ));
                }
                let beaten: Vec<Card> = next
                    .table
                    .drain(..)
                    .flat_map(|p| {
                        std::iter::once(p.attack).chain(p.defend)
                    })
                    .collect();
                next.discard.extend(beaten);
                next.draw_up();
                next.attacker = state.defender();
                next.phase = DurakPhase::Attacking;
            }
        }
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> Option<MatchOutcome> {
        if !state.deck.is_empty() || !state.table.is_empty() {
            return None;
        }
        let first_out = state.hands[Side::First].is_empty();
        let second_out = state.hands[Side::Second].is_empty();
        match (first_out, second_out) {
            (true, true) => Some(MatchOutcome::draw()),
            (true, false) => Some(MatchOutcome::winner(Side::First)),
            (false, true) => Some(MatchOutcome::winner(Side::Second)),
            (false, false) => None,
        }
    }
}
