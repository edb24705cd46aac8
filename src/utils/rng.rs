//! Deterministic seeding for environment instances.
//!
//! Every environment owns its own [`RngStream`]; there is no process-wide
//! generator. [`SeedSequence`] expands one root seed into independent
//! per-worker seeds so that many environments can run side by side.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator owned by each environment instance.
pub type RngStream = ChaCha8Rng;

/// SplitMix64 expansion of a root seed into a sequence of sub-seeds.
#[derive(Clone, Debug)]
pub struct SeedSequence {
    state: u64,
}

impl SeedSequence {
    pub fn new(seed: u64) -> Self {
        Self { state: seed ^ 0x9E3779B97F4A7C15 }
    }

    /// Generate the next sub-seed deterministically.
    pub fn next_subseed(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Create an RNG stream seeded from the next subseed.
    pub fn next_rng(&mut self) -> RngStream {
        rng_from_seed(self.next_subseed())
    }

    pub fn split_n(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.next_subseed()).collect()
    }
}

/// Split a root seed into N sub-seeds, one per environment instance.
pub fn split_n(seed: u64, n: usize) -> Vec<u64> {
    SeedSequence::new(seed).split_n(n)
}

pub fn rng_from_seed(seed: u64) -> RngStream {
    RngStream::seed_from_u64(seed)
}
