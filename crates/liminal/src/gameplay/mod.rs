//! # Gameplay Systems
//!
//! This module contains gameplay-specific systems:
//! - Hostile entities and pursuit AI
//! - The observer's sanity meter

pub mod pursuit;
pub mod sanity;

pub use pursuit::{
    generate_entity_instances, Appearance, Entity, EntityId, EntityInstance, EntityState, PursuitConfig,
    PursuitController, PursuitStats, ARRIVAL_EPSILON, DEFAULT_CHASE_SPEED, DEFAULT_ENGAGEMENT_RADIUS,
};
pub use sanity::{SanityConfig, SanityMeter, FULL_SANITY};
