//! # LIMINAL Shared
//!
//! Common types used by the procedural world crate and the game crate.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on rendering, audio or windowing crates.
//! Renderers consume these types through the narrow collaborator
//! interfaces in `liminal_procedural::materializer`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    CEILING_HEIGHT, DEFAULT_CHUNK_SIZE, DEFAULT_HYSTERESIS_MARGIN, DEFAULT_LOAD_RADIUS, TICK_RATE,
};
pub use math::{Color3, Vec3};
