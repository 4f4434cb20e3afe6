//! Deterministic random number generation for authoritative match state.
//!
//! Every roll, shuffle, and draw in a match comes from a single seeded
//! source held by the authoritative writer — never from a client-submitted
//! value. The same seed reproduces a match bit for bit, which makes replay
//! and dispute resolution possible.
//!
//! The RNG serializes as its seed plus stream position, so a restored
//! snapshot continues the exact sequence the live match would have produced.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Deterministic RNG embedded in randomized game states.
///
/// Uses ChaCha8 for speed while keeping a high-quality stream.
#[derive(Clone, Debug)]
pub struct MatchRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl MatchRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Roll a single six-sided die.
    pub fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Get the current position state.
    #[must_use]
    pub fn state(&self) -> MatchRngState {
        MatchRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved position state.
    #[must_use]
    pub fn from_state(state: &MatchRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG position.
///
/// Uses the ChaCha8 word position for O(1) capture regardless of how many
/// values have been generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRngState {
    pub seed: u64,
    pub word_pos: u128,
}

impl PartialEq for MatchRng {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl Eq for MatchRng {}

impl Serialize for MatchRng {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.state().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MatchRng {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = MatchRngState::deserialize(deserializer)?;
        Ok(MatchRng::from_state(&state))
    }
}
