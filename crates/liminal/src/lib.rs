//! # LIMINAL
//!
//! The main game crate: an endless grid of rooms that slowly turns red as
//! it is explored, with hostile entities that close in on the observer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              SIMULATION                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │  WorldManager   │────>│  Progression    │────>│  Environment    │    │
//! │  │  (procedural)   │     │  State Machine  │     │  Coupling       │    │
//! │  │                 │     │                 │     │                 │    │
//! │  │  • Streaming    │     │  • Dormant      │     │  • Fog / clear  │    │
//! │  │  • Claims       │     │  • Ramping      │     │  • Audio        │    │
//! │  │  • Fixtures     │     │  • Triggered    │     │  • Flashlight   │    │
//! │  └────────┬────────┘     └────────┬────────┘     └─────────────────┘    │
//! │           │ zone                  │                                     │
//! │           v                       v                                     │
//! │  ┌─────────────────┐     ┌─────────────────┐                            │
//! │  │  Pursuit        │     │  Event Bus      │──> host                    │
//! │  │  Controller     │     │  (crossbeam)    │                            │
//! │  └─────────────────┘     └─────────────────┘                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `environment`: Progression → fog, clear color, audio, flashlight
//! - `events`: Simulation → host event channel
//! - `gameplay`: Pursuit AI, sanity
//! - `progression`: The progressive shift state machine
//! - `simulation`: Per-frame orchestration

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod gameplay;
pub mod progression;
pub mod simulation;

// Re-export the world crates
pub use liminal_procedural as procedural;
pub use liminal_shared as shared;

// Re-export commonly used types
pub use config::{EventsConfig, LiminalConfig};
pub use environment::{EnvironmentConfig, EnvironmentCoupling, EnvironmentOutputs};
pub use error::{ConfigError, ConfigResult};
pub use events::{EventBus, EventReceiver, EventSender, WorldEvent, DEFAULT_EVENT_CAPACITY};
pub use gameplay::{
    Appearance, Entity, EntityId, EntityInstance, EntityState, PursuitConfig, PursuitController, PursuitStats,
    SanityConfig, SanityMeter,
};
pub use progression::{Phase, ProgressionConfig, ProgressionSnapshot, ProgressionStateMachine, Transition};
pub use simulation::{Simulation, TickReport, MAX_TICK_DT, RAMP_EVENT_STEP};
