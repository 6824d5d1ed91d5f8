//! # Materializer Interface
//!
//! The world manager never touches a scene graph. It hands descriptors and
//! layouts to a [`ChunkMaterializer`] provided by the host and keeps the
//! opaque [`VisualHandle`]s it gets back, releasing them on eviction.
//!
//! [`HeadlessMaterializer`] is the in-process implementation used by tests,
//! benches and the headless walkthrough.

use std::collections::HashSet;

use liminal_shared::Vec3;

use crate::chunk::{AreaBounds, ChunkCoord};
use crate::descriptor::ChunkDescriptor;
use crate::error::{MaterializeError, MaterializeResult};
use crate::features::HonoredFeatures;
use crate::layout::{exit_door_position, hazard_room_bounds, hazard_room_pits, ChunkLayout, ItemSpawn};

/// Opaque handle to host-side visuals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualHandle(pub u64);

/// Everything the host needs to build the extras of a chunk.
#[derive(Clone, Copy, Debug)]
pub struct FeatureRequest<'a> {
    /// Chunk being materialized.
    pub coord: ChunkCoord,
    /// World-space area of the chunk.
    pub bounds: AreaBounds,
    /// Unique features this chunk holds.
    pub honored: HonoredFeatures,
    /// Item spawns from the layout.
    pub items: &'a [ItemSpawn],
}

impl FeatureRequest<'_> {
    /// Hazard room area, if honored.
    #[must_use]
    pub fn hazard_room(&self) -> Option<AreaBounds> {
        self.honored.hazard_room.then(|| hazard_room_bounds(self.bounds))
    }

    /// Pit cells of the hazard room, empty unless honored.
    #[must_use]
    pub fn pits(&self) -> Vec<AreaBounds> {
        if self.honored.hazard_room {
            hazard_room_pits(self.bounds)
        } else {
            Vec::new()
        }
    }

    /// Exit door position, if honored.
    #[must_use]
    pub fn exit_door(&self) -> Option<Vec3> {
        self.honored.special_exit.then(|| exit_door_position(self.bounds))
    }
}

/// Host-side builder of chunk visuals.
pub trait ChunkMaterializer {
    /// Builds the floor, ceiling, walls and fixtures of a chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot acquire what the chunk needs.
    fn materialize_chunk(
        &mut self,
        descriptor: &ChunkDescriptor,
        layout: &ChunkLayout,
        bounds: AreaBounds,
    ) -> MaterializeResult<VisualHandle>;

    /// Builds items and honored unique features.
    ///
    /// # Errors
    ///
    /// Returns an error if a feature asset is unavailable.
    fn materialize_features(&mut self, request: &FeatureRequest<'_>) -> MaterializeResult<Vec<VisualHandle>>;

    /// Builds a plain stand-in for a chunk. Must not fail.
    fn materialize_fallback(&mut self, bounds: AreaBounds) -> VisualHandle;

    /// Releases a handle previously returned by this materializer.
    fn release(&mut self, handle: VisualHandle);
}

/// Which calls of a [`HeadlessMaterializer`] should fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailureMode {
    /// `materialize_chunk` returns an error.
    pub chunks: bool,
    /// `materialize_features` returns an error.
    pub features: bool,
}

/// Materializer that only allocates handles.
///
/// An optional capacity limits the live handles of regular visuals;
/// fallbacks are always granted.
#[derive(Debug, Default)]
pub struct HeadlessMaterializer {
    next: u64,
    live: HashSet<VisualHandle>,
    fallbacks: usize,
    failure: FailureMode,
    capacity: Option<usize>,
}

impl HeadlessMaterializer {
    /// Creates a materializer that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a materializer that fails as described by `failure`.
    #[must_use]
    pub fn failing(failure: FailureMode) -> Self {
        Self {
            failure,
            ..Self::default()
        }
    }

    /// Creates a materializer that refuses regular visuals once `capacity`
    /// handles are live.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Changes the failure mode.
    pub fn set_failure_mode(&mut self, failure: FailureMode) {
        self.failure = failure;
    }

    /// Handles allocated and not yet released.
    #[must_use]
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// True if `handle` is live.
    #[must_use]
    pub fn is_live(&self, handle: VisualHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Number of fallback visuals built so far.
    #[must_use]
    pub const fn fallbacks_built(&self) -> usize {
        self.fallbacks
    }

    fn reserve(&self, count: usize) -> MaterializeResult<()> {
        match self.capacity {
            Some(capacity) if self.live.len() + count > capacity => Err(MaterializeError::CapacityExhausted {
                live: self.live.len(),
            }),
            _ => Ok(()),
        }
    }

    fn allocate(&mut self) -> VisualHandle {
        self.next += 1;
        let handle = VisualHandle(self.next);
        self.live.insert(handle);
        handle
    }
}

impl ChunkMaterializer for HeadlessMaterializer {
    fn materialize_chunk(
        &mut self,
        _descriptor: &ChunkDescriptor,
        _layout: &ChunkLayout,
        _bounds: AreaBounds,
    ) -> MaterializeResult<VisualHandle> {
        if self.failure.chunks {
            return Err(MaterializeError::AssetUnavailable("wallpaper texture".to_owned()));
        }
        self.reserve(1)?;
        Ok(self.allocate())
    }

    fn materialize_features(&mut self, request: &FeatureRequest<'_>) -> MaterializeResult<Vec<VisualHandle>> {
        if self.failure.features {
            return Err(MaterializeError::Rejected {
                coord: request.coord,
                reason: "feature assets disabled".to_owned(),
            });
        }

        let count = request.items.len()
            + usize::from(request.honored.hazard_room)
            + usize::from(request.honored.special_exit);
        self.reserve(count)?;
        Ok((0..count).map(|_| self.allocate()).collect())
    }

    fn materialize_fallback(&mut self, _bounds: AreaBounds) -> VisualHandle {
        self.fallbacks += 1;
        self.allocate()
    }

    fn release(&mut self, handle: VisualHandle) {
        self.live.remove(&handle);
    }
}
