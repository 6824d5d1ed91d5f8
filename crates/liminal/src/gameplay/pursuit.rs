//! # Pursuit AI
//!
//! Hostile entities that watch the observer and close in when the observer
//! stands in a hostile zone.
//!
//! - Every entity turns to face the observer every tick.
//! - Entities with AI disabled only turn; they never move or change state.
//! - Enabled entities chase when the observer's zone is hostile and the
//!   planar distance is below the engagement radius, otherwise idle.
//!
//! Movement is planar, capped at the remaining distance, and skipped once
//! the entity is within [`ARRIVAL_EPSILON`] of the observer.

use liminal_procedural::{MaterializeError, VisualHandle, ZoneTag};
use liminal_shared::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// PURSUIT CONSTANTS
// ============================================================================

/// Distance at which an entity counts as arrived (meters).
pub const ARRIVAL_EPSILON: f32 = 1e-3;

/// Default engagement radius (meters).
pub const DEFAULT_ENGAGEMENT_RADIUS: f32 = 20.0;

/// Default chase speed (meters per second).
pub const DEFAULT_CHASE_SPEED: f32 = 1.6;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the pursuit controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Chasing starts below this planar distance.
    pub engagement_radius: f32,
    /// Chase speed in meters per second.
    pub speed: f32,
    /// Zone in which entities engage.
    pub hostile_zone: ZoneTag,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            engagement_radius: DEFAULT_ENGAGEMENT_RADIUS,
            speed: DEFAULT_CHASE_SPEED,
            hostile_zone: ZoneTag::Parking,
        }
    }
}

// ============================================================================
// ENTITY
// ============================================================================

/// Identifier of a pursuit entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// AI state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Standing still.
    #[default]
    Idle,
    /// Closing in on the observer.
    Chasing,
}

impl EntityState {
    /// Numeric code for render instances.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Chasing => 1,
        }
    }
}

/// What the host draws for an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Appearance {
    /// Glowing eyes and teeth, built without external assets.
    #[default]
    Apparition,
    /// A loaded model.
    Model(VisualHandle),
}

/// A hostile entity.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Current position.
    pub position: Vec3,
    /// Facing direction (radians, 0 = +Z, positive toward +X).
    pub yaw: f32,
    /// Current AI state.
    pub state: EntityState,
    /// If true the entity only turns to face the observer.
    pub ai_disabled: bool,
    /// Current appearance.
    pub appearance: Appearance,
}

impl Entity {
    fn update(&mut self, dt: f32, observer: Vec3, hostile: bool, config: &PursuitConfig) {
        self.yaw = self.position.yaw_towards(observer);
        if self.ai_disabled {
            return;
        }

        let distance = self.position.planar_distance(observer);
        if !(hostile && distance < config.engagement_radius) {
            self.state = EntityState::Idle;
            return;
        }

        self.state = EntityState::Chasing;
        if distance < ARRIVAL_EPSILON || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let step = (config.speed * dt).min(distance);
        let dx = (observer.x - self.position.x) / distance;
        let dz = (observer.z - self.position.z) / distance;
        self.position.x += dx * step;
        self.position.z += dz * step;
    }
}

// ============================================================================
// PURSUIT CONTROLLER
// ============================================================================

/// Roster counts. Disabled entities only count toward `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PursuitStats {
    /// All entities.
    pub total: usize,
    /// Enabled entities that are chasing.
    pub chasing: usize,
    /// Enabled entities that are idle.
    pub idle: usize,
}

/// Manages all pursuit entities.
pub struct PursuitController {
    /// Configuration.
    config: PursuitConfig,
    /// All entities.
    entities: Vec<Entity>,
    /// Next ID to assign.
    next_id: u32,
}

impl PursuitController {
    /// Creates an empty controller.
    #[must_use]
    pub fn new(config: PursuitConfig) -> Self {
        Self {
            config,
            entities: Vec::with_capacity(16),
            next_id: 1,
        }
    }

    /// Spawns an entity with the apparition appearance.
    pub fn spawn_entity(&mut self, position: Vec3, ai_disabled: bool) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        self.entities.push(Entity {
            id,
            position,
            yaw: 0.0,
            state: EntityState::Idle,
            ai_disabled,
            appearance: Appearance::Apparition,
        });
        tracing::info!(
            "Spawned entity {} at ({:.1}, {:.1}, {:.1}){}",
            id.0,
            position.x,
            position.y,
            position.z,
            if ai_disabled { " [AI disabled]" } else { "" }
        );

        id
    }

    /// Updates every entity for one tick.
    ///
    /// `observer_zone` is the zone of the observer's position.
    pub fn update(&mut self, dt: f32, observer: Vec3, observer_zone: ZoneTag) {
        let hostile = observer_zone == self.config.hostile_zone;
        for entity in &mut self.entities {
            entity.update(dt, observer, hostile, &self.config);
        }
    }

    /// Applies the outcome of a model load.
    ///
    /// On success the entity switches to the model. On failure it keeps the
    /// apparition. Returns `false` if the entity does not exist.
    pub fn resolve_appearance(&mut self, id: EntityId, result: Result<VisualHandle, MaterializeError>) -> bool {
        let Some(entity) = self.get_mut(id) else {
            return false;
        };
        match result {
            Ok(handle) => entity.appearance = Appearance::Model(handle),
            Err(e) => tracing::warn!("Model load failed for entity {}, keeping apparition: {}", id.0, e),
        }
        true
    }

    /// Roster counts.
    #[must_use]
    pub fn stats(&self) -> PursuitStats {
        let mut stats = PursuitStats {
            total: self.entities.len(),
            ..PursuitStats::default()
        };
        for entity in self.entities.iter().filter(|e| !e.ai_disabled) {
            match entity.state {
                EntityState::Chasing => stats.chasing += 1,
                EntityState::Idle => stats.idle += 1,
            }
        }
        stats
    }

    /// Finds an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Finds a mutable entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// All entities.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &PursuitConfig {
        &self.config
    }
}

// ============================================================================
// ENTITY RENDERING DATA
// ============================================================================

/// Instance data for rendering a single entity.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EntityInstance {
    /// Position (x, y, z) + yaw.
    pub position_yaw: [f32; 4],
    /// State code (see [`EntityState::code`]).
    pub state: u32,
    /// 1 if AI is disabled.
    pub ai_disabled: u32,
}

impl From<&Entity> for EntityInstance {
    fn from(entity: &Entity) -> Self {
        Self {
            position_yaw: [entity.position.x, entity.position.y, entity.position.z, entity.yaw],
            state: entity.state.code(),
            ai_disabled: u32::from(entity.ai_disabled),
        }
    }
}

/// Generates render instances from all entities.
#[must_use]
pub fn generate_entity_instances(controller: &PursuitController) -> Vec<EntityInstance> {
    controller.entities().iter().map(EntityInstance::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_spawn_starts_idle_apparition() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let a = controller.spawn_entity(Vec3::new(0.0, 0.0, 5.0), false);
        let b = controller.spawn_entity(Vec3::new(3.0, 0.0, 0.0), true);
        assert_ne!(a, b);
        assert_eq!(controller.count(), 2);

        let entity = controller.get(a).unwrap();
        assert_eq!(entity.state, EntityState::Idle);
        assert_eq!(entity.appearance, Appearance::Apparition);
    }

    #[test]
    fn test_chases_in_hostile_zone() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let id = controller.spawn_entity(Vec3::new(0.0, 0.0, 5.0), false);
        let observer = Vec3::new(0.0, 1.7, 0.0);

        let mut last = 5.0;
        for _ in 0..60 {
            controller.update(DT, observer, ZoneTag::Parking);
            let entity = controller.get(id).unwrap();
            assert_eq!(entity.state, EntityState::Chasing);
            let distance = entity.position.planar_distance(observer);
            assert!(distance < last, "Distance must strictly decrease");
            last = distance;
        }
        // One second at 1.6 m/s.
        assert!((last - 3.4).abs() < 1e-3);
    }

    #[test]
    fn test_idle_outside_hostile_zone_or_range() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let near = controller.spawn_entity(Vec3::new(0.0, 0.0, 5.0), false);
        let far = controller.spawn_entity(Vec3::new(0.0, 0.0, 25.0), false);
        let observer = Vec3::ZERO;

        controller.update(DT, observer, ZoneTag::Hallway);
        assert_eq!(controller.get(near).unwrap().state, EntityState::Idle);
        assert_eq!(controller.get(near).unwrap().position, Vec3::new(0.0, 0.0, 5.0));

        controller.update(DT, observer, ZoneTag::Parking);
        assert_eq!(controller.get(near).unwrap().state, EntityState::Chasing);
        assert_eq!(controller.get(far).unwrap().state, EntityState::Idle);
    }

    #[test]
    fn test_disabled_entity_only_turns() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let start = Vec3::new(2.0, 0.0, 0.0);
        let id = controller.spawn_entity(start, true);

        controller.update(1.0, Vec3::new(2.0, 0.0, 5.0), ZoneTag::Parking);
        let entity = controller.get(id).unwrap();
        assert_eq!(entity.position, start);
        assert_eq!(entity.state, EntityState::Idle);
        assert!(entity.yaw.abs() < 1e-6);

        controller.update(1.0, Vec3::new(7.0, 0.0, 0.0), ZoneTag::Parking);
        let entity = controller.get(id).unwrap();
        assert!((entity.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(entity.position, start);
    }

    #[test]
    fn test_no_overshoot_and_arrival() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let id = controller.spawn_entity(Vec3::new(0.0, 0.0, 0.5), false);
        let observer = Vec3::ZERO;

        // A 10 s step would travel 16 m; it stops on the observer instead.
        controller.update(10.0, observer, ZoneTag::Parking);
        let entity = controller.get(id).unwrap();
        assert!(entity.position.planar_distance(observer) < ARRIVAL_EPSILON);

        // At zero distance nothing moves and nothing is NaN.
        controller.update(DT, observer, ZoneTag::Parking);
        let entity = controller.get(id).unwrap();
        assert!(entity.position.x.is_finite() && entity.position.z.is_finite());
        assert_eq!(entity.state, EntityState::Chasing);
    }

    #[test]
    fn test_non_finite_dt_does_not_move() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let start = Vec3::new(0.0, 0.0, 15.0);
        let id = controller.spawn_entity(start, false);

        controller.update(f32::NAN, Vec3::ZERO, ZoneTag::Parking);
        controller.update(f32::INFINITY, Vec3::ZERO, ZoneTag::Parking);
        let entity = controller.get(id).unwrap();
        assert_eq!(entity.position, start);
        assert_eq!(entity.state, EntityState::Chasing);
    }

    #[test]
    fn test_stats_exclude_disabled() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        controller.spawn_entity(Vec3::new(0.0, 0.0, 5.0), false);
        controller.spawn_entity(Vec3::new(0.0, 0.0, 50.0), false);
        controller.spawn_entity(Vec3::new(0.0, 0.0, 1.0), true);

        controller.update(DT, Vec3::ZERO, ZoneTag::Parking);
        assert_eq!(
            controller.stats(),
            PursuitStats {
                total: 3,
                chasing: 1,
                idle: 1,
            }
        );
    }

    #[test]
    fn test_resolve_appearance() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        let a = controller.spawn_entity(Vec3::ZERO, false);
        let b = controller.spawn_entity(Vec3::ZERO, false);

        assert!(controller.resolve_appearance(a, Ok(VisualHandle(7))));
        assert!(controller.resolve_appearance(
            b,
            Err(MaterializeError::AssetUnavailable("smiler model".to_owned()))
        ));
        assert!(!controller.resolve_appearance(EntityId(99), Ok(VisualHandle(8))));

        assert_eq!(controller.get(a).unwrap().appearance, Appearance::Model(VisualHandle(7)));
        assert_eq!(controller.get(b).unwrap().appearance, Appearance::Apparition);
    }

    #[test]
    fn test_entity_instance_layout() {
        let mut controller = PursuitController::new(PursuitConfig::default());
        controller.spawn_entity(Vec3::new(1.0, 2.0, 3.0), true);
        let instances = generate_entity_instances(&controller);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].ai_disabled, 1);
        assert_eq!(bytemuck::bytes_of(&instances[0]).len(), 24);
    }
}
