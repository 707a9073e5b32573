//! Deterministic per-call random numbers
//!
//! A 48-bit linear congruential generator in the `java.util.Random` family.
//! Every draw site builds a fresh generator from a caller-supplied seed (frame
//! counter, drop seed, world seed), so reproducing a result needs only that
//! seed and never any long-lived generator state.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};

const MULTIPLIER: u64 = 0x5_DEEC_E66D;
const INCREMENT: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

/// Seeded 48-bit LCG: `state = state * 0x5DEECE66D + 0xB mod 2^48`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg48 {
    state: u64,
}

impl Lcg48 {
    /// Create a generator from an integer seed (scrambled like `java.util.Random`)
    pub fn new(seed: u64) -> Self {
        Self {
            state: (seed ^ MULTIPLIER) & MASK,
        }
    }

    /// Current 48-bit state
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance and return the raw 48-bit value
    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.state
    }

    /// Raw value reduced modulo `n` (discrete choice). Returns 0 for `n == 0`.
    #[inline]
    pub fn below(&mut self, n: u64) -> u64 {
        let raw = self.next_raw();
        if n == 0 { 0 } else { raw % n }
    }

    /// Uniform fraction in `[0, 1)` built from the top 24 bits
    #[inline]
    pub fn fraction(&mut self) -> f32 {
        (self.next_raw() >> 24) as f32 / (1u32 << 24) as f32
    }
}

impl RngCore for Lcg48 {
    fn next_u32(&mut self) -> u32 {
        (self.next_raw() >> 16) as u32
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for Lcg48 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}
