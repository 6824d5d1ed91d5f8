//! # World Constants
//!
//! Defaults baked into the library. Every one of these can be overridden
//! through `LiminalConfig` at startup.

/// Chunk edge length in meters.
pub const DEFAULT_CHUNK_SIZE: f32 = 30.0;

/// Chebyshev radius (in chunks) that is kept materialized around the observer.
pub const DEFAULT_LOAD_RADIUS: u32 = 2;

/// Extra chunks a materialized chunk may drift past the load radius before
/// it is evicted.
pub const DEFAULT_HYSTERESIS_MARGIN: u32 = 2;

/// Ceiling height in meters. Fixtures hang just below it.
pub const CEILING_HEIGHT: f32 = 3.0;

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 60;
