//! # LIMINAL Procedural Generation
//!
//! Deterministic chunk generation and streaming for an endless grid of
//! rooms.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same coordinate and seed always produce the same chunk
//! 2. **Chunked**: The world is generated in fixed-size square chunks
//! 3. **Streamable**: Chunks are materialized and evicted independently
//! 4. **Unique**: At most one hazard room and one exit per session
//!
//! ## Core Components
//!
//! - `ChunkRng`: Per-coordinate xorshift stream
//! - `DescriptorGenerator`: Feature flags and layout of a chunk
//! - `FixtureTable`: Flicker state of ceiling lights
//! - `WorldManager`: Load radius, hysteresis, claims, visited set
//! - `ChunkMaterializer`: Host interface for visuals
//!
//! ## Example
//!
//! ```rust,ignore
//! use liminal_procedural::{WorldManager, WorldManagerConfig};
//! use liminal_shared::Vec3;
//!
//! let mut manager = WorldManager::new(WorldManagerConfig::production());
//! let report = manager.update(Vec3::new(15.0, 1.7, 15.0));
//! assert_eq!(report.activated.len(), 25);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod descriptor;
pub mod error;
pub mod features;
pub mod fixtures;
pub mod layout;
pub mod materializer;
pub mod rng;
pub mod world_manager;

pub use chunk::{AreaBounds, ChunkCoord};
pub use descriptor::{ChunkDescriptor, DescriptorGenerator, DescriptorTable};
pub use error::{MaterializeError, MaterializeResult};
pub use features::{FeatureKind, HonoredFeatures, UniqueFeatures};
pub use fixtures::{Fixture, FixtureId, FixtureTable};
pub use layout::{ChunkLayout, FixtureSlot, ItemKind, ItemSpawn, WallSegment};
pub use materializer::{ChunkMaterializer, FailureMode, FeatureRequest, HeadlessMaterializer, VisualHandle};
pub use rng::{hash2, stream_for, ChunkRng, WorldSeed};
pub use world_manager::{
    ChunkRecord, SharedWorld, StreamingReport, WorldManager, WorldManagerConfig, WorldStats, ZoneTag,
};
