//! # Configuration
//!
//! One TOML file, one section per subsystem. Every field has a default, so
//! an empty file is a valid configuration.
//!
//! ```toml
//! [world]
//! chunk_size = 30.0
//! load_radius = 2
//! hysteresis_margin = 2
//! seed = 0
//!
//! [world.descriptor]
//! hazard_room = 0.04
//! special_exit = 0.02
//!
//! [progression]
//! visit_threshold = 20
//! travel_threshold = 5
//! ramp_rate = 0.015
//!
//! [pursuit]
//! engagement_radius = 20.0
//! speed = 1.6
//! hostile_zone = "parking"
//!
//! [sanity]
//! drain_base = 0.001
//! drain_dark = 0.003
//!
//! [events]
//! capacity = 1024
//! ```

use std::path::Path;

use liminal_procedural::WorldManagerConfig;
use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::gameplay::{PursuitConfig, SanityConfig};
use crate::progression::ProgressionConfig;

/// Event channel settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Bounded channel capacity.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiminalConfig {
    /// World streaming.
    pub world: WorldManagerConfig,
    /// Progression thresholds and rate.
    pub progression: ProgressionConfig,
    /// Pursuit AI.
    pub pursuit: PursuitConfig,
    /// Observer sanity.
    pub sanity: SanityConfig,
    /// Environment colors and levels.
    pub environment: EnvironmentConfig,
    /// Event channel.
    pub events: EventsConfig,
}

impl LiminalConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is invalid.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or holds
    /// an invalid value.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks every value against its valid range.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> ConfigResult<()> {
        let world = &self.world;
        if !(world.chunk_size.is_finite() && world.chunk_size > 0.0) {
            return Err(invalid("world.chunk_size", format!("must be positive, got {}", world.chunk_size)));
        }
        if let Some((field, p)) = world.descriptor.invalid_field() {
            return Err(ConfigError::InvalidValue {
                field: descriptor_field(field),
                reason: format!("probability must be within [0, 1], got {p}"),
            });
        }

        let progression = &self.progression;
        if progression.visit_threshold == 0 {
            return Err(invalid("progression.visit_threshold", "must be at least 1".to_owned()));
        }
        if progression.travel_threshold == 0 {
            return Err(invalid("progression.travel_threshold", "must be at least 1".to_owned()));
        }
        if !(progression.ramp_rate.is_finite() && progression.ramp_rate >= 0.0) {
            return Err(invalid(
                "progression.ramp_rate",
                format!("must be non-negative, got {}", progression.ramp_rate),
            ));
        }

        let pursuit = &self.pursuit;
        if !(pursuit.engagement_radius.is_finite() && pursuit.engagement_radius >= 0.0) {
            return Err(invalid(
                "pursuit.engagement_radius",
                format!("must be non-negative, got {}", pursuit.engagement_radius),
            ));
        }
        if !(pursuit.speed.is_finite() && pursuit.speed >= 0.0) {
            return Err(invalid("pursuit.speed", format!("must be non-negative, got {}", pursuit.speed)));
        }

        let sanity = &self.sanity;
        for (field, rate) in [
            ("sanity.drain_base", sanity.drain_base),
            ("sanity.drain_dark", sanity.drain_dark),
            ("sanity.drain_isolated", sanity.drain_isolated),
        ] {
            if !(rate.is_finite() && rate >= 0.0) {
                return Err(invalid(field, format!("must be non-negative, got {rate}")));
            }
        }
        for (field, factor) in [
            ("sanity.lit_light", sanity.lit_light),
            ("sanity.unlit_light", sanity.unlit_light),
            ("sanity.isolation", sanity.isolation),
        ] {
            if !(0.0..=1.0).contains(&factor) {
                return Err(invalid(field, format!("must be within [0, 1], got {factor}")));
            }
        }

        if !(0.0..=1.0).contains(&self.environment.shadow_darkness) {
            return Err(invalid(
                "environment.shadow_darkness",
                format!("must be within [0, 1], got {}", self.environment.shadow_darkness),
            ));
        }

        if self.events.capacity == 0 {
            return Err(invalid("events.capacity", "must be at least 1".to_owned()));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}

fn descriptor_field(field: &str) -> &'static str {
    match field {
        "hazard_room" => "world.descriptor.hazard_room",
        "special_exit" => "world.descriptor.special_exit",
        "unlit" => "world.descriptor.unlit",
        _ => "world.descriptor.open_zone",
    }
}
