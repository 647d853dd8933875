//! Pinned seeded generators
//!
//! Two small 32-bit generators with fixed constants so a given seed produces
//! the same sequence in every process. Both implement [`rand::RngCore`] so
//! callers can use `rand`'s sampling helpers on top of them.

use rand::{Error, RngCore, SeedableRng};

/// LCG multiplier (Numerical Recipes)
pub const LCG_MULTIPLIER: u32 = 1_664_525;

/// LCG increment (Numerical Recipes)
pub const LCG_INCREMENT: u32 = 1_013_904_223;

/// Replacement state for a zero xorshift seed
const XORSHIFT_ZERO_STATE: u32 = 0x9e37_79b9;

/// Linear congruential generator: `state = state * a + c (mod 2^32)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Create generator with initial state
    #[inline]
    #[must_use]
    pub const fn new(state: u32) -> Self {
        Self { state }
    }

    /// Advance and return the new state
    #[inline]
    pub fn step(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }
}

/// Marsaglia xorshift32 (shifts 13, 17, 5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Create generator; a zero state is replaced since it is a fixed point
    #[inline]
    #[must_use]
    pub const fn new(state: u32) -> Self {
        Self {
            state: if state == 0 { XORSHIFT_ZERO_STATE } else { state },
        }
    }

    /// Advance and return the new state
    #[inline]
    pub fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Uniform-enough index in `[0, bound)` via modulo, `0` for empty bounds
#[inline]
pub fn below<R: RngCore>(rng: &mut R, bound: usize) -> usize {
    if bound == 0 {
        return 0;
    }
    // u32 always fits in usize on supported targets.
    rng.next_u32() as usize % bound
}

macro_rules! impl_rng_core {
    ($ty:ty) => {
        impl RngCore for $ty {
            #[inline]
            fn next_u32(&mut self) -> u32 {
                self.step()
            }

            #[inline]
            fn next_u64(&mut self) -> u64 {
                let hi = u64::from(self.step());
                let lo = u64::from(self.step());
                (hi << 32) | lo
            }

            fn fill_bytes(&mut self, dest: &mut [u8]) {
                for chunk in dest.chunks_mut(4) {
                    let bytes = self.step().to_le_bytes();
                    chunk.copy_from_slice(&bytes[..chunk.len()]);
                }
            }

            fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
                self.fill_bytes(dest);
                Ok(())
            }
        }

        impl SeedableRng for $ty {
            type Seed = [u8; 4];

            fn from_seed(seed: Self::Seed) -> Self {
                Self::new(u32::from_le_bytes(seed))
            }
        }
    };
}

impl_rng_core!(Lcg);
impl_rng_core!(Xorshift32);
