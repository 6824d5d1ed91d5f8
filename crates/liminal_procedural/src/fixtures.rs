//! # Fixture Flicker Table
//!
//! Fluorescent ceiling fixtures of every materialized chunk, keyed by a
//! stable [`FixtureId`]. Renderers read the current intensity of each
//! fixture instead of attaching flicker state to scene objects.
//!
//! Phase and speed are deterministic per chunk. The per-frame jitter, the
//! stress jitter near the exit and the random dips come from a session RNG
//! owned by the table. Fixtures advance in coordinate order, so two tables
//! with the same seed and the same chunks flicker identically.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use liminal_shared::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chunk::ChunkCoord;
use crate::layout::FixtureSlot;
use crate::rng::{hash2, WorldSeed};

/// Sub-seed purpose for fixture phases.
const FIXTURE_PURPOSE: u64 = 0xF1C4;
/// Sub-seed purpose for runtime jitter.
const JITTER_PURPOSE: u64 = 0x1177;

/// Amplitude of the two-sine flicker wave.
const WAVE_AMPLITUDE: f32 = 0.08;
/// Maximum jitter at stress 1.0.
const STRESS_JITTER: f32 = 0.2;
/// Per-advance chance of a brief brownout.
const DIP_CHANCE: f64 = 0.01;
/// Intensity drop during a brownout.
const DIP_DEPTH: f32 = 0.5;

/// Stable identifier of a fixture: its chunk and its slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixtureId {
    /// Owning chunk.
    pub coord: ChunkCoord,
    /// Slot index within the chunk's layout.
    pub index: u16,
}

/// Flicker parameters and current output of one fixture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fixture {
    /// World position.
    pub position: Vec3,
    /// Intensity the flicker oscillates around.
    pub base: f32,
    /// Wave phase in radians.
    pub phase: f32,
    /// Wave speed multiplier.
    pub speed: f32,
    /// Jitter strength (0 = calm, grows near the exit).
    pub stress: f32,
    timer: f32,
    intensity: f32,
}

impl Fixture {
    /// Current light intensity (never negative).
    #[inline]
    #[must_use]
    pub const fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Emissive brightness of the fixture housing, tracking the light.
    #[inline]
    #[must_use]
    pub fn emissive_pulse(&self) -> f32 {
        0.95 + (self.intensity - self.base) * 0.2
    }

    fn advance<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.timer += dt * self.speed;
        let wave = ((self.timer + self.phase).sin() + (self.timer * 0.7).sin()) * WAVE_AMPLITUDE;
        let jitter = if self.stress > 0.0 {
            (rng.gen::<f32>() - 0.5) * STRESS_JITTER * self.stress
        } else {
            0.0
        };
        let dip = if rng.gen_bool(DIP_CHANCE) { -DIP_DEPTH } else { 0.0 };

        self.intensity = (self.base + wave + jitter + dip).max(0.0);
    }
}

/// All fixtures of the materialized chunks.
pub struct FixtureTable {
    seed: WorldSeed,
    chunks: BTreeMap<ChunkCoord, Vec<Fixture>>,
    jitter: ChaCha8Rng,
}

impl FixtureTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            seed,
            chunks: BTreeMap::new(),
            jitter: ChaCha8Rng::seed_from_u64(seed.derive(JITTER_PURPOSE).value()),
        }
    }

    /// Registers the fixtures of a chunk. Replaces any previous entry.
    ///
    /// `stress` applies to every slot without a fixed stress of its own.
    /// Returns the number of fixtures registered.
    pub fn insert_chunk<'a>(
        &mut self,
        coord: ChunkCoord,
        slots: impl IntoIterator<Item = &'a FixtureSlot>,
        stress: f32,
    ) -> usize {
        let chunk_seed = self.seed.derive(FIXTURE_PURPOSE).value() ^ u64::from(hash2(coord.x, coord.z));
        let mut rng = ChaCha8Rng::seed_from_u64(chunk_seed);

        let fixtures: Vec<Fixture> = slots
            .into_iter()
            .map(|slot| Fixture {
                position: slot.position,
                base: slot.base_intensity,
                phase: rng.gen_range(0.0..TAU),
                speed: rng.gen_range(2.0..3.5),
                stress: slot.stress.unwrap_or(stress),
                timer: 0.0,
                intensity: slot.base_intensity,
            })
            .collect();

        let count = fixtures.len();
        self.chunks.insert(coord, fixtures);
        count
    }

    /// Drops the fixtures of a chunk. Returns how many were removed.
    pub fn remove_chunk(&mut self, coord: ChunkCoord) -> usize {
        self.chunks.remove(&coord).map_or(0, |fixtures| fixtures.len())
    }

    /// Advances every fixture's flicker by `dt` seconds.
    ///
    /// A non-finite or negative `dt` is ignored.
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            return;
        }
        let rng = &mut self.jitter;
        for fixture in self.chunks.values_mut().flatten() {
            fixture.advance(dt, rng);
        }
    }

    /// Looks up a fixture.
    #[must_use]
    pub fn get(&self, id: FixtureId) -> Option<&Fixture> {
        self.chunks.get(&id.coord)?.get(usize::from(id.index))
    }

    /// Fixtures of one chunk.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&[Fixture]> {
        self.chunks.get(&coord).map(Vec::as_slice)
    }

    /// Iterates over all fixtures with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (FixtureId, &Fixture)> + '_ {
        self.chunks.iter().flat_map(|(coord, fixtures)| {
            fixtures.iter().enumerate().map(move |(index, fixture)| {
                let id = FixtureId {
                    coord: *coord,
                    index: u16::try_from(index).unwrap_or(u16::MAX),
                };
                (id, fixture)
            })
        })
    }

    /// Total number of fixtures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    /// True if no fixtures are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(n: usize, base: f32) -> Vec<FixtureSlot> {
        (0..n)
            .map(|i| FixtureSlot {
                position: Vec3::new(i as f32 * 4.0, 2.8, 0.0),
                base_intensity: base,
                stress: None,
            })
            .collect()
    }

    #[test]
    fn test_phases_are_deterministic_per_chunk() {
        let mut a = FixtureTable::new(WorldSeed::new(9));
        let mut b = FixtureTable::new(WorldSeed::new(9));
        let coord = ChunkCoord::new(3, -2);
        a.insert_chunk(coord, &slots(10, 0.9), 0.0);
        b.insert_chunk(coord, &slots(10, 0.9), 0.0);

        for index in 0..10 {
            let id = FixtureId { coord, index };
            let fa = a.get(id).unwrap();
            let fb = b.get(id).unwrap();
            assert_eq!(fa.phase, fb.phase);
            assert_eq!(fa.speed, fb.speed);
            assert!((0.0..TAU).contains(&fa.phase));
            assert!((2.0..3.5).contains(&fa.speed));
        }
    }

    #[test]
    fn test_intensity_never_negative() {
        let mut table = FixtureTable::new(WorldSeed::default());
        table.insert_chunk(ChunkCoord::new(0, 0), &slots(20, 0.15), 0.8);

        for _ in 0..2000 {
            table.advance(1.0 / 60.0);
            for (_, fixture) in table.iter() {
                assert!(fixture.intensity() >= 0.0);
            }
        }
    }

    #[test]
    fn test_calm_fixture_stays_near_base_without_dips() {
        let mut fixture = Fixture {
            position: Vec3::ZERO,
            base: 0.9,
            phase: 0.0,
            speed: 2.5,
            stress: 0.0,
            timer: 0.0,
            intensity: 0.9,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..500 {
            fixture.advance(1.0 / 60.0, &mut rng);
            let deviation = fixture.intensity() - fixture.base;
            // Either the two-sine wave or a brownout.
            assert!(deviation.abs() <= 2.0 * WAVE_AMPLITUDE + 1e-5 || deviation < -DIP_DEPTH + 2.0 * WAVE_AMPLITUDE + 1e-5);
        }
    }

    #[test]
    fn test_flicker_is_reproducible() {
        let coords = [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 7), ChunkCoord::new(5, -1), ChunkCoord::new(2, 2)];
        let mut a = FixtureTable::new(WorldSeed::new(11));
        let mut b = FixtureTable::new(WorldSeed::new(11));
        for &coord in &coords {
            a.insert_chunk(coord, &slots(6, 0.9), 0.6);
        }
        for &coord in coords.iter().rev() {
            b.insert_chunk(coord, &slots(6, 0.9), 0.6);
        }

        for _ in 0..300 {
            a.advance(1.0 / 60.0);
            b.advance(1.0 / 60.0);
        }
        let ia: Vec<(FixtureId, f32)> = a.iter().map(|(id, f)| (id, f.intensity())).collect();
        let ib: Vec<(FixtureId, f32)> = b.iter().map(|(id, f)| (id, f.intensity())).collect();
        assert_eq!(ia, ib);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut table = FixtureTable::new(WorldSeed::default());
        let coord = ChunkCoord::new(0, 0);
        table.insert_chunk(coord, &slots(4, 0.9), 0.0);
        table.advance(f32::NAN);
        table.advance(f32::INFINITY);
        table.advance(-1.0);
        assert!(table.iter().all(|(_, f)| f.intensity() == 0.9));

        table.advance(1.0 / 60.0);
        assert!(table.iter().all(|(_, f)| f.intensity().is_finite()));
    }

    #[test]
    fn test_slot_stress_overrides_chunk_stress() {
        let mut table = FixtureTable::new(WorldSeed::default());
        let coord = ChunkCoord::new(1, 1);
        let mut own = slots(2, 0.8);
        own[1].stress = Some(0.3);
        table.insert_chunk(coord, &own, 0.6);

        assert_eq!(table.get(FixtureId { coord, index: 0 }).map(|f| f.stress), Some(0.6));
        assert_eq!(table.get(FixtureId { coord, index: 1 }).map(|f| f.stress), Some(0.3));
    }

    #[test]
    fn test_insert_and_remove_chunk() {
        let mut table = FixtureTable::new(WorldSeed::default());
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(1, 0);
        assert_eq!(table.insert_chunk(a, &slots(4, 0.9), 0.0), 4);
        assert_eq!(table.insert_chunk(b, &slots(3, 0.9), 0.6), 3);
        assert_eq!(table.len(), 7);

        assert_eq!(table.remove_chunk(a), 4);
        assert_eq!(table.remove_chunk(a), 0);
        assert_eq!(table.len(), 3);
        assert!(table.get(FixtureId { coord: a, index: 0 }).is_none());
        assert_eq!(table.chunk(b).map(<[Fixture]>::len), Some(3));
        assert!(table.iter().all(|(id, f)| id.coord == b && f.stress == 0.6));
    }
}
