//! # Environment Coupling
//!
//! Maps the progression state to the values a renderer and audio graph
//! apply each frame: fog and clear colors, ambient zone intensity, the
//! flashlight tint and shadow darkness. Pure: the same snapshot always
//! yields the same outputs.

use liminal_shared::Color3;
use serde::{Deserialize, Serialize};

use crate::progression::ProgressionSnapshot;

/// Colors and levels used by [`EnvironmentCoupling`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Fog color while dormant.
    pub fog_base: Color3,
    /// Fog color once the shift is active.
    pub fog_red: Color3,
    /// Clear color at ramp 0.
    pub clear_base: Color3,
    /// Clear color at ramp 1.
    pub clear_red_min: Color3,
    /// Flashlight color while dormant.
    pub flashlight_base: Color3,
    /// Flashlight color once the shift is active.
    pub flashlight_tint: Color3,
    /// Shadow darkness while dormant.
    pub shadow_darkness: f32,
    /// Added to the shadow darkness once active (result capped at 1).
    pub shadow_darkness_boost: f32,
    /// Ambient zone intensity while dormant.
    pub audio_base: f32,
    /// Ambient zone intensity once active.
    pub audio_active: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            fog_base: Color3::new(0.08, 0.08, 0.08),
            fog_red: Color3::new(0.08, 0.02, 0.02),
            clear_base: Color3::new(0.02, 0.02, 0.02),
            clear_red_min: Color3::new(0.08, 0.01, 0.01),
            flashlight_base: Color3::new(1.0, 1.0, 0.95),
            flashlight_tint: Color3::new(1.0, 0.92, 0.92),
            shadow_darkness: 0.6,
            shadow_darkness_boost: 0.1,
            audio_base: 0.5,
            audio_active: 1.0,
        }
    }
}

/// Per-frame environment values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvironmentOutputs {
    /// Fog color.
    pub fog_color: Color3,
    /// Background clear color.
    pub clear_color: Color3,
    /// Ambient zone audio intensity.
    pub audio_zone_intensity: f32,
    /// Flashlight diffuse color.
    pub flashlight_tint: Color3,
    /// Flashlight shadow darkness in `[0, 1]`.
    pub shadow_darkness: f32,
}

/// Evaluates [`EnvironmentOutputs`] from a progression snapshot.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentCoupling {
    config: EnvironmentConfig,
}

impl EnvironmentCoupling {
    /// Creates a coupling with the given colors and levels.
    #[must_use]
    pub const fn new(config: EnvironmentConfig) -> Self {
        Self { config }
    }

    /// Computes the outputs for `snapshot`.
    #[must_use]
    pub fn evaluate(&self, snapshot: &ProgressionSnapshot) -> EnvironmentOutputs {
        let c = &self.config;
        if snapshot.phase.is_active() {
            EnvironmentOutputs {
                fog_color: c.fog_red,
                clear_color: c.clear_base.lerp(c.clear_red_min, snapshot.ramp),
                audio_zone_intensity: c.audio_active,
                flashlight_tint: c.flashlight_tint,
                shadow_darkness: (c.shadow_darkness + c.shadow_darkness_boost).min(1.0),
            }
        } else {
            EnvironmentOutputs {
                fog_color: c.fog_base,
                clear_color: c.clear_base,
                audio_zone_intensity: c.audio_base,
                flashlight_tint: c.flashlight_base,
                shadow_darkness: c.shadow_darkness.min(1.0),
            }
        }
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &EnvironmentConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Phase;

    fn snapshot(phase: Phase, ramp: f32) -> ProgressionSnapshot {
        ProgressionSnapshot {
            phase,
            ramp,
            traversed: 0,
        }
    }

    #[test]
    fn test_dormant_outputs() {
        let out = EnvironmentCoupling::default().evaluate(&snapshot(Phase::Dormant, 0.0));
        assert_eq!(out.fog_color, Color3::new(0.08, 0.08, 0.08));
        assert_eq!(out.clear_color, Color3::new(0.02, 0.02, 0.02));
        assert_eq!(out.audio_zone_intensity, 0.5);
        assert_eq!(out.flashlight_tint, Color3::new(1.0, 1.0, 0.95));
        assert_eq!(out.shadow_darkness, 0.6);
    }

    #[test]
    fn test_active_endpoints() {
        let coupling = EnvironmentCoupling::default();

        let start = coupling.evaluate(&snapshot(Phase::Ramping, 0.0));
        assert_eq!(start.fog_color, Color3::new(0.08, 0.02, 0.02));
        assert_eq!(start.clear_color, Color3::new(0.02, 0.02, 0.02));
        assert_eq!(start.audio_zone_intensity, 1.0);
        assert_eq!(start.flashlight_tint, Color3::new(1.0, 0.92, 0.92));
        assert!((start.shadow_darkness - 0.7).abs() < 1e-6);

        let end = coupling.evaluate(&snapshot(Phase::Triggered, 1.0));
        assert!((end.clear_color.r - 0.08).abs() < 1e-6);
        assert!((end.clear_color.g - 0.01).abs() < 1e-6);
        assert!((end.clear_color.b - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_clear_color_is_monotonic_in_ramp() {
        let coupling = EnvironmentCoupling::default();
        let mut last_r = 0.0;
        for step in 0..=10 {
            let out = coupling.evaluate(&snapshot(Phase::Ramping, step as f32 / 10.0));
            assert!(out.clear_color.r >= last_r);
            last_r = out.clear_color.r;
        }
    }

    #[test]
    fn test_shadow_darkness_capped() {
        let coupling = EnvironmentCoupling::new(EnvironmentConfig {
            shadow_darkness: 0.95,
            shadow_darkness_boost: 0.2,
            ..EnvironmentConfig::default()
        });
        let out = coupling.evaluate(&snapshot(Phase::Ramping, 0.5));
        assert_eq!(out.shadow_darkness, 1.0);
    }
}
