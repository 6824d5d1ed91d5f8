//! # Deterministic Chunk RNG
//!
//! Every chunk draws its randomness from a stream that is a pure function of
//! its coordinates, an optional time offset and the world seed.
//!
//! ## Determinism Guarantee
//!
//! Two streams built from the same `(seed, cx, cy, t)` produce exactly the
//! same sequence. All arithmetic wraps, so every `i32` input is valid.
//!
//! ## Stream
//!
//! The stream seed is a 2D integer hash of `(cx + t, cy - t)`, folded with
//! the world seed. Outputs come from a 32-bit xorshift (13, 17, 5) and are
//! scaled into `[0, 1)`.

use rand::RngCore;

use crate::chunk::ChunkCoord;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed. Seed zero reproduces
/// the canonical layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., fixture phases).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Folds the 64-bit seed into the 32-bit stream domain.
    #[inline]
    #[must_use]
    pub const fn fold(self) -> u32 {
        (self.0 ^ (self.0 >> 32)) as u32
    }

    /// Returns the stream for a chunk coordinate and time offset.
    #[inline]
    #[must_use]
    pub const fn stream_for(self, coord: ChunkCoord, t: i32) -> ChunkRng {
        let hash = hash2(coord.x.wrapping_add(t), coord.z.wrapping_sub(t));
        ChunkRng::from_seed(hash ^ self.fold())
    }
}

/// Stable 2D integer hash.
#[inline]
#[must_use]
pub const fn hash2(x: i32, y: i32) -> u32 {
    let mut s = (x as u32)
        .wrapping_mul(374_761_393)
        .wrapping_add((y as u32).wrapping_mul(668_265_263));
    s = (s ^ (s >> 13)).wrapping_mul(1_274_126_177);
    s ^ (s >> 16)
}

/// Returns the canonical-seed stream for `(cx, cy)` at time offset `t`.
#[inline]
#[must_use]
pub const fn stream_for(cx: i32, cy: i32, t: i32) -> ChunkRng {
    WorldSeed::new(0).stream_for(ChunkCoord::new(cx, cy), t)
}

/// Xorshift32 stream.
///
/// Produces `f64` values in `[0, 1)` through [`ChunkRng::next_f64`] and also
/// implements [`RngCore`] so it can drive `rand` distributions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRng {
    state: u32,
}

impl ChunkRng {
    /// Xorshift has a fixed point at zero; a zero seed is replaced by this.
    const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

    /// Scale from `u32` to `[0, 1)`.
    const SCALE: f64 = 4_294_967_296.0;

    /// Creates a stream from a raw 32-bit seed.
    #[inline]
    #[must_use]
    pub const fn from_seed(seed: u32) -> Self {
        let state = if seed == 0 {
            Self::ZERO_SEED_REPLACEMENT
        } else {
            seed
        };
        Self { state }
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Next value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.step()) / Self::SCALE
    }

    /// Bernoulli draw: consumes exactly one stream value.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

impl RngCore for ChunkRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.step());
        let hi = u64::from(self.step());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
