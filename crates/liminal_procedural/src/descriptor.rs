//! # Chunk Descriptors
//!
//! A descriptor is the set of boolean feature flags of one chunk. It is a
//! pure function of the coordinate and the world seed.
//!
//! ## Draw Order
//!
//! Each flag is an independent Bernoulli draw from the chunk's stream
//! (time offset 0), always taken in this order:
//!
//! 1. hazard room
//! 2. special exit
//! 3. unlit
//! 4. open zone
//!
//! All four draws are taken even when an earlier one succeeds, so changing
//! one probability never shifts the values seen by the others. The layout
//! (see [`crate::layout`]) keeps consuming the same stream after the fourth
//! draw.

use serde::{Deserialize, Serialize};

use crate::chunk::{AreaBounds, ChunkCoord};
use crate::layout::ChunkLayout;
use crate::rng::{ChunkRng, WorldSeed};

/// Probability table for descriptor flags.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorTable {
    /// Chance that a chunk is flagged as the hazard ("pitfalls") room.
    pub hazard_room: f64,
    /// Chance that a chunk is flagged as holding the special exit.
    pub special_exit: f64,
    /// Chance that a chunk has its fixtures dimmed.
    pub unlit: f64,
    /// Chance that a chunk is an open zone.
    pub open_zone: f64,
}

impl DescriptorTable {
    /// Returns the first probability outside `[0, 1]`, by field name.
    #[must_use]
    pub fn invalid_field(&self) -> Option<(&'static str, f64)> {
        [
            ("hazard_room", self.hazard_room),
            ("special_exit", self.special_exit),
            ("unlit", self.unlit),
            ("open_zone", self.open_zone),
        ]
        .into_iter()
        .find(|(_, p)| !(0.0..=1.0).contains(p))
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self {
            hazard_room: 0.04,
            special_exit: 0.02,
            unlit: 0.12,
            open_zone: 0.18,
        }
    }
}

/// Deterministic feature flags of one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkDescriptor {
    /// Flagged as the hazard room. Only honored if it wins the claim.
    pub has_hazard_room: bool,
    /// Flagged as holding the exit. Only honored if it wins the claim.
    pub has_special_exit: bool,
    /// Fixtures run dimmed.
    pub is_unlit: bool,
    /// Open floor plan.
    pub is_open_zone: bool,
}

/// Produces descriptors and layouts for chunk coordinates.
#[derive(Clone, Debug)]
pub struct DescriptorGenerator {
    seed: WorldSeed,
    table: DescriptorTable,
}

impl DescriptorGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new(seed: WorldSeed, table: DescriptorTable) -> Self {
        Self { seed, table }
    }

    /// Returns the world seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Returns the probability table.
    #[must_use]
    pub const fn table(&self) -> &DescriptorTable {
        &self.table
    }

    /// Generates the descriptor for a coordinate.
    #[must_use]
    pub fn describe(&self, coord: ChunkCoord) -> ChunkDescriptor {
        let mut rng = self.seed.stream_for(coord, 0);
        self.draw_flags(&mut rng)
    }

    /// Generates the descriptor and the layout for a coordinate.
    ///
    /// The layout continues the descriptor's stream, so the descriptor
    /// returned here is identical to [`Self::describe`].
    #[must_use]
    pub fn generate(&self, coord: ChunkCoord, bounds: AreaBounds) -> (ChunkDescriptor, ChunkLayout) {
        let mut rng = self.seed.stream_for(coord, 0);
        let descriptor = self.draw_flags(&mut rng);
        let layout = ChunkLayout::generate(&mut rng, &descriptor, bounds);
        (descriptor, layout)
    }

    fn draw_flags(&self, rng: &mut ChunkRng) -> ChunkDescriptor {
        let has_hazard_room = rng.chance(self.table.hazard_room);
        let has_special_exit = rng.chance(self.table.special_exit);
        let is_unlit = rng.chance(self.table.unlit);
        let is_open_zone = rng.chance(self.table.open_zone);

        ChunkDescriptor {
            has_hazard_room,
            has_special_exit,
            is_unlit,
            is_open_zone,
        }
    }
}

impl Default for DescriptorGenerator {
    fn default() -> Self {
        Self::new(WorldSeed::default(), DescriptorTable::default())
    }
}
