use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The single deterministic pseudo-random stream of the simulation.
///
/// Every participant of a session seeds this identically; commands may only
/// draw from it during their commit phase, in an order derived from their
/// arguments and already-synchronized state, so the stream position itself
/// is part of the replicated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePrng(ChaCha8Rng);

impl GamePrng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    /// Uniform draw in `0..bound`; returns 0 for a zero bound.
    pub fn next_bound(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * bound as u64) >> 32) as u32
    }
}
