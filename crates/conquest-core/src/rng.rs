//! Deterministic dice
//!
//! xorshift64, so the same seed rolls the same dice on every platform and
//! a saved state resumes the exact sequence.

use serde::{Deserialize, Serialize};

/// A deterministic random number generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRng {
    state: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift state must be non-zero
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Create an RNG from a saved state
    pub fn from_state(state: u64) -> Self {
        Self::new(state)
    }

    /// Get the current state (useful for saving/loading)
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Roll one die, returning a zero-based face in `0..sides`.
    ///
    /// A die with no sides always shows 0.
    pub fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(sides)) as u32
    }

    /// Roll `count` dice of `sides` sides.
    pub fn roll_dice(&mut self, count: usize, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll_die(sides)).collect()
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}
