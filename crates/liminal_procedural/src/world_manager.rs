//! # World Streaming Manager
//!
//! Keeps the chunks around the observer materialized and forgets the rest.
//!
//! ## Lifecycle
//!
//! Every coordinate is either unloaded or active. Activation generates the
//! descriptor and layout, claims flagged unique features, asks the
//! materializer for visuals, registers the fixtures and marks the
//! coordinate visited. Eviction releases every handle the chunk owns.
//!
//! ## Streaming
//!
//! Each tick recomputes the needed set from scratch: every coordinate
//! within Chebyshev distance `load_radius` of the observer chunk. Active
//! chunks stay until they are farther than `load_radius +
//! hysteresis_margin`, so walking back and forth over a chunk border does
//! not thrash the materializer.
//!
//! ## Session State
//!
//! The visited set and the unique-feature claims survive eviction. They
//! only reset with a new manager.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use liminal_shared::{Vec3, DEFAULT_CHUNK_SIZE, DEFAULT_HYSTERESIS_MARGIN, DEFAULT_LOAD_RADIUS};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::chunk::{AreaBounds, ChunkCoord};
use crate::descriptor::{ChunkDescriptor, DescriptorGenerator, DescriptorTable};
use crate::features::{FeatureKind, HonoredFeatures, UniqueFeatures};
use crate::fixtures::FixtureTable;
use crate::layout::{feature_fixtures, ChunkLayout};
use crate::materializer::{ChunkMaterializer, FeatureRequest, HeadlessMaterializer, VisualHandle};
use crate::rng::WorldSeed;

/// Fixture stress for chunks adjacent to the exit.
const STRESS_NEAR_EXIT: f32 = 0.8;
/// Fixture stress for chunks two steps from the exit.
const STRESS_APPROACHING_EXIT: f32 = 0.6;

/// Configuration for the world manager.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldManagerConfig {
    /// Chunk edge length in meters.
    pub chunk_size: f32,
    /// Chebyshev radius of chunks kept around the observer.
    pub load_radius: u32,
    /// Extra radius before an active chunk is evicted.
    pub hysteresis_margin: u32,
    /// World seed. Zero reproduces the canonical layout.
    pub seed: u64,
    /// Descriptor flag probabilities.
    pub descriptor: DescriptorTable,
}

impl Default for WorldManagerConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl WorldManagerConfig {
    /// Production defaults: 30 m chunks, radius 2.
    #[must_use]
    pub fn production() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            load_radius: DEFAULT_LOAD_RADIUS,
            hysteresis_margin: DEFAULT_HYSTERESIS_MARGIN,
            seed: 0,
            descriptor: DescriptorTable::default(),
        }
    }

    /// Small world for tests: 12 m chunks, radius 1, no hysteresis.
    #[must_use]
    pub fn test() -> Self {
        Self {
            chunk_size: 12.0,
            load_radius: 1,
            hysteresis_margin: 0,
            ..Self::production()
        }
    }
}

/// Coarse classification of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTag {
    /// Parking structure. Hostile by default.
    Parking,
    /// Hallway.
    Hallway,
}

impl ZoneTag {
    /// Zone of a chunk: parking if `x + z` is even.
    #[must_use]
    pub fn for_coord(coord: ChunkCoord) -> Self {
        if (i64::from(coord.x) + i64::from(coord.z)).rem_euclid(2) == 0 {
            Self::Parking
        } else {
            Self::Hallway
        }
    }
}

/// An active chunk.
#[derive(Clone, Debug)]
pub struct ChunkRecord {
    /// Grid coordinate.
    pub coord: ChunkCoord,
    /// World-space area.
    pub bounds: AreaBounds,
    /// Feature flags.
    pub descriptor: ChunkDescriptor,
    /// Walls, items and fixture slots.
    pub layout: ChunkLayout,
    /// Unique features this chunk actually holds.
    pub honored: HonoredFeatures,
    /// Main visual.
    pub visual: VisualHandle,
    /// Visuals of items and honored features.
    pub feature_handles: Vec<VisualHandle>,
    /// True if the main visual is the fallback stand-in.
    pub fallback: bool,
}

/// What one streaming tick did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingReport {
    /// Chunk containing the observer.
    pub observer_chunk: ChunkCoord,
    /// Newly activated coordinates, in activation order.
    pub activated: Vec<ChunkCoord>,
    /// Evicted coordinates, sorted.
    pub evicted: Vec<ChunkCoord>,
    /// Unique features claimed since the previous tick.
    pub claimed: Vec<(FeatureKind, ChunkCoord)>,
    /// Size of the visited set after the tick.
    pub visited_count: usize,
}

/// Session statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Chunks activated this session.
    pub activated_this_session: u64,
    /// Chunks evicted this session.
    pub evicted_this_session: u64,
    /// Fallback visuals built after materializer failures.
    pub fallbacks_this_session: u64,
    /// Unique features claimed.
    pub claims: u32,
    /// Largest number of chunks active at once.
    pub peak_active: usize,
}

/// Streams chunks around a moving observer.
pub struct WorldManager<M = HeadlessMaterializer> {
    config: WorldManagerConfig,
    generator: DescriptorGenerator,
    materializer: M,
    active: HashMap<ChunkCoord, ChunkRecord>,
    visited: HashSet<ChunkCoord>,
    features: UniqueFeatures,
    fixtures: FixtureTable,
    pending_claims: Vec<(FeatureKind, ChunkCoord)>,
    observer_chunk: Option<ChunkCoord>,
    stats: WorldStats,
}

impl WorldManager<HeadlessMaterializer> {
    /// Creates a manager with a [`HeadlessMaterializer`].
    #[must_use]
    pub fn new(config: WorldManagerConfig) -> Self {
        Self::with_materializer(config, HeadlessMaterializer::new())
    }
}

impl<M: ChunkMaterializer> WorldManager<M> {
    /// Creates a manager that builds visuals through `materializer`.
    #[must_use]
    pub fn with_materializer(config: WorldManagerConfig, materializer: M) -> Self {
        let seed = WorldSeed::new(config.seed);
        Self {
            generator: DescriptorGenerator::new(seed, config.descriptor),
            fixtures: FixtureTable::new(seed),
            config,
            materializer,
            active: HashMap::new(),
            visited: HashSet::new(),
            features: UniqueFeatures::new(),
            pending_claims: Vec::new(),
            observer_chunk: None,
            stats: WorldStats::default(),
        }
    }

    /// Streams with the configured load radius.
    pub fn update(&mut self, observer: Vec3) -> StreamingReport {
        self.tick(observer, self.config.load_radius)
    }

    /// Streams chunks around `observer` with an explicit load radius.
    ///
    /// Evicts first, then activates missing coordinates row by row.
    pub fn tick(&mut self, observer: Vec3, load_radius: u32) -> StreamingReport {
        let center = ChunkCoord::from_position(observer, self.config.chunk_size);
        self.observer_chunk = Some(center);

        let keep = u64::from(load_radius) + u64::from(self.config.hysteresis_margin);
        let mut evicted: Vec<ChunkCoord> = self
            .active
            .keys()
            .copied()
            .filter(|coord| coord.chebyshev_distance(center) > keep)
            .collect();
        evicted.sort_unstable();
        for &coord in &evicted {
            self.evict(coord);
        }

        let radius = i32::try_from(load_radius).unwrap_or(i32::MAX);
        let mut activated = Vec::new();
        for dx in -radius..=radius {
            let Some(x) = center.x.checked_add(dx) else {
                continue;
            };
            for dz in -radius..=radius {
                let Some(z) = center.z.checked_add(dz) else {
                    continue;
                };
                let coord = ChunkCoord::new(x, z);
                if !self.active.contains_key(&coord) {
                    self.activate(coord);
                    activated.push(coord);
                }
            }
        }

        self.stats.peak_active = self.stats.peak_active.max(self.active.len());
        trace!(
            "Streaming tick at {}: +{} -{} ({} active)",
            center,
            activated.len(),
            evicted.len(),
            self.active.len()
        );

        StreamingReport {
            observer_chunk: center,
            activated,
            evicted,
            claimed: std::mem::take(&mut self.pending_claims),
            visited_count: self.visited.len(),
        }
    }

    fn activate(&mut self, coord: ChunkCoord) {
        let bounds = AreaBounds::for_chunk(coord, self.config.chunk_size);
        let (descriptor, layout) = self.generator.generate(coord, bounds);

        let honored = HonoredFeatures {
            hazard_room: descriptor.has_hazard_room
                && self.claim_unique_feature(FeatureKind::HazardRoom, coord),
            special_exit: descriptor.has_special_exit
                && self.claim_unique_feature(FeatureKind::SpecialExit, coord),
        };

        let (visual, fallback) = match self.materializer.materialize_chunk(&descriptor, &layout, bounds) {
            Ok(handle) => (handle, false),
            Err(e) => {
                warn!("Chunk {} fell back to a stand-in: {}", coord, e);
                self.stats.fallbacks_this_session += 1;
                (self.materializer.materialize_fallback(bounds), true)
            }
        };

        let feature_handles = if layout.items.is_empty() && !honored.any() {
            Vec::new()
        } else {
            let request = FeatureRequest {
                coord,
                bounds,
                honored,
                items: &layout.items,
            };
            match self.materializer.materialize_features(&request) {
                Ok(handles) => handles,
                Err(e) => {
                    warn!("Features of chunk {} fell back to a stand-in: {}", coord, e);
                    self.stats.fallbacks_this_session += 1;
                    vec![self.materializer.materialize_fallback(bounds)]
                }
            }
        };

        let stress = self.stress_factor(coord);
        let feature_slots = feature_fixtures(bounds, honored);
        let fixture_count = self
            .fixtures
            .insert_chunk(coord, layout.fixtures.iter().chain(&feature_slots), stress);

        self.visited.insert(coord);
        self.stats.activated_this_session += 1;
        debug!(
            "Activated chunk {} ({} walls, {} items, {} fixtures)",
            coord,
            layout.walls.len(),
            layout.items.len(),
            fixture_count
        );

        self.active.insert(
            coord,
            ChunkRecord {
                coord,
                bounds,
                descriptor,
                layout,
                honored,
                visual,
                feature_handles,
                fallback,
            },
        );
    }

    fn evict(&mut self, coord: ChunkCoord) {
        let Some(record) = self.active.remove(&coord) else {
            return;
        };
        self.materializer.release(record.visual);
        for handle in record.feature_handles {
            self.materializer.release(handle);
        }
        self.fixtures.remove_chunk(coord);
        self.stats.evicted_this_session += 1;
        debug!("Evicted chunk {}", coord);
    }

    /// Evicts every active chunk. Visited set and claims are kept.
    pub fn clear(&mut self) {
        let mut coords: Vec<ChunkCoord> = self.active.keys().copied().collect();
        coords.sort_unstable();
        for coord in coords {
            self.evict(coord);
        }
    }

    /// Zone of the chunk containing `position`.
    #[must_use]
    pub fn classify_zone(&self, position: Vec3) -> ZoneTag {
        ZoneTag::for_coord(ChunkCoord::from_position(position, self.config.chunk_size))
    }

    /// Claims a unique feature for `coord`.
    ///
    /// First claim wins. Returns `true` if `coord` holds the feature after
    /// the call, `false` if another coordinate already does.
    pub fn claim_unique_feature(&mut self, kind: FeatureKind, coord: ChunkCoord) -> bool {
        let fresh = self.features.holder(kind).is_none();
        let held = self.features.claim(kind, coord);
        if fresh && held {
            info!("Claimed {} at chunk {}", kind.name(), coord);
            self.stats.claims += 1;
            self.pending_claims.push((kind, coord));
        }
        held
    }

    /// Holder of a unique feature.
    #[must_use]
    pub const fn claimed(&self, kind: FeatureKind) -> Option<ChunkCoord> {
        self.features.holder(kind)
    }

    /// Fixture stress from the Manhattan distance to the claimed exit.
    #[must_use]
    pub fn stress_factor(&self, coord: ChunkCoord) -> f32 {
        match self.features.holder(FeatureKind::SpecialExit) {
            Some(exit) => match coord.manhattan_distance(exit) {
                0 | 1 => STRESS_NEAR_EXIT,
                2 => STRESS_APPROACHING_EXIT,
                _ => 0.0,
            },
            None => 0.0,
        }
    }

    /// Number of distinct coordinates ever activated. Never decreases.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// True if `coord` was ever activated.
    #[must_use]
    pub fn has_visited(&self, coord: ChunkCoord) -> bool {
        self.visited.contains(&coord)
    }

    /// Record of an active chunk.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkRecord> {
        self.active.get(&coord)
    }

    /// True if `coord` is active.
    #[must_use]
    pub fn is_active(&self, coord: ChunkCoord) -> bool {
        self.active.contains_key(&coord)
    }

    /// Active coordinates, sorted.
    #[must_use]
    pub fn active_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.active.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Number of active chunks.
    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.active.len()
    }

    /// Chunk containing the observer at the last tick.
    #[must_use]
    pub const fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.observer_chunk
    }

    /// Descriptor of any coordinate, active or not.
    #[must_use]
    pub fn describe(&self, coord: ChunkCoord) -> ChunkDescriptor {
        self.generator.describe(coord)
    }

    /// Fixtures of the active chunks.
    #[must_use]
    pub const fn fixtures(&self) -> &FixtureTable {
        &self.fixtures
    }

    /// Advances fixture flicker by `dt` seconds.
    pub fn advance_fixtures(&mut self, dt: f32) {
        self.fixtures.advance(dt);
    }

    /// Session statistics.
    #[must_use]
    pub const fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &WorldManagerConfig {
        &self.config
    }

    /// The materializer.
    #[must_use]
    pub const fn materializer(&self) -> &M {
        &self.materializer
    }

    /// Mutable access to the materializer.
    pub fn materializer_mut(&mut self) -> &mut M {
        &mut self.materializer
    }
}

/// A world manager shared between threads.
///
/// One lock guards the whole manager, so a tick, a claim and a query never
/// interleave.
pub struct SharedWorld<M = HeadlessMaterializer> {
    inner: Arc<Mutex<WorldManager<M>>>,
}

impl<M> Clone for SharedWorld<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: ChunkMaterializer> SharedWorld<M> {
    /// Wraps a manager.
    #[must_use]
    pub fn new(manager: WorldManager<M>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Locks the manager for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, WorldManager<M>> {
        self.inner.lock()
    }

    /// Streams with the configured load radius.
    pub fn update(&self, observer: Vec3) -> StreamingReport {
        self.inner.lock().update(observer)
    }

    /// Claims a unique feature.
    pub fn claim_unique_feature(&self, kind: FeatureKind, coord: ChunkCoord) -> bool {
        self.inner.lock().claim_unique_feature(kind, coord)
    }

    /// Number of distinct coordinates ever activated.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.inner.lock().visited_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 1.7, z)
    }

    #[test]
    fn test_zone_parity() {
        assert_eq!(ZoneTag::for_coord(ChunkCoord::new(0, 0)), ZoneTag::Parking);
        assert_eq!(ZoneTag::for_coord(ChunkCoord::new(1, 0)), ZoneTag::Hallway);
        assert_eq!(ZoneTag::for_coord(ChunkCoord::new(-1, 0)), ZoneTag::Hallway);
        assert_eq!(ZoneTag::for_coord(ChunkCoord::new(-1, -1)), ZoneTag::Parking);
        assert_eq!(ZoneTag::for_coord(ChunkCoord::new(i32::MAX, i32::MAX)), ZoneTag::Parking);
    }

    #[test]
    fn test_classify_zone_uses_chunk_size() {
        let manager = WorldManager::new(WorldManagerConfig::production());
        assert_eq!(manager.classify_zone(at(15.0, 15.0)), ZoneTag::Parking);
        assert_eq!(manager.classify_zone(at(45.0, 15.0)), ZoneTag::Hallway);
        assert_eq!(manager.classify_zone(at(-15.0, 15.0)), ZoneTag::Hallway);
    }

    #[test]
    fn test_first_tick_activates_full_square() {
        let mut manager = WorldManager::new(WorldManagerConfig::production());
        let report = manager.update(at(15.0, 15.0));
        assert_eq!(report.observer_chunk, ChunkCoord::new(0, 0));
        assert_eq!(report.activated.len(), 25);
        assert!(report.evicted.is_empty());
        assert_eq!(report.visited_count, 25);
        assert!(manager.materializer().live_handles() >= 25);
    }

    #[test]
    fn test_hysteresis_keeps_recent_chunks() {
        let mut manager = WorldManager::new(WorldManagerConfig {
            load_radius: 1,
            hysteresis_margin: 1,
            ..WorldManagerConfig::production()
        });
        manager.update(at(15.0, 15.0));
        let report = manager.update(at(45.0, 15.0));
        assert!(report.evicted.is_empty(), "Column -1 is within the margin");
        assert_eq!(report.activated.len(), 3);
        assert!(manager.is_active(ChunkCoord::new(-1, 0)));

        let report = manager.update(at(75.0, 15.0));
        assert_eq!(report.evicted.len(), 3);
        assert!(!manager.is_active(ChunkCoord::new(-1, 0)));
    }

    #[test]
    fn test_stress_factor_around_exit() {
        let mut manager = WorldManager::new(WorldManagerConfig::test());
        assert_eq!(manager.stress_factor(ChunkCoord::new(0, 0)), 0.0);

        let exit = ChunkCoord::new(10, 10);
        assert!(manager.claim_unique_feature(FeatureKind::SpecialExit, exit));
        assert_eq!(manager.stress_factor(exit), STRESS_NEAR_EXIT);
        assert_eq!(manager.stress_factor(ChunkCoord::new(11, 10)), STRESS_NEAR_EXIT);
        assert_eq!(manager.stress_factor(ChunkCoord::new(11, 11)), STRESS_APPROACHING_EXIT);
        assert_eq!(manager.stress_factor(ChunkCoord::new(12, 11)), 0.0);
    }

    #[test]
    fn test_claim_reported_once() {
        let mut manager = WorldManager::new(WorldManagerConfig::test());
        let coord = ChunkCoord::new(4, 4);
        assert!(manager.claim_unique_feature(FeatureKind::HazardRoom, coord));
        assert!(manager.claim_unique_feature(FeatureKind::HazardRoom, coord));
        assert!(!manager.claim_unique_feature(FeatureKind::HazardRoom, ChunkCoord::new(5, 5)));

        let report = manager.update(at(0.0, 0.0));
        assert_eq!(report.claimed.first(), Some(&(FeatureKind::HazardRoom, coord)));
        assert_eq!(manager.stats().claims as usize, report.claimed.len());
        assert!(manager.update(at(0.0, 0.0)).claimed.is_empty());
    }

    #[test]
    fn test_clear_keeps_session_state() {
        let mut manager = WorldManager::new(WorldManagerConfig::test());
        manager.update(at(0.0, 0.0));
        let visited = manager.visited_count();
        manager.clear();
        assert_eq!(manager.loaded_chunk_count(), 0);
        assert_eq!(manager.visited_count(), visited);
        assert_eq!(manager.materializer().live_handles(), 0);
        assert!(manager.fixtures().is_empty());
    }
}
