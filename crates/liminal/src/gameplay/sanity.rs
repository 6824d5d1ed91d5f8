//! # Sanity
//!
//! The observer's sanity meter, in `[0, 1]`.
//!
//! Sanity drains every second at
//! `drain_base + (1 - light) * drain_dark + isolation * drain_isolated`,
//! where `light` is [`SanityConfig::lit_light`] in a lit chunk and
//! [`SanityConfig::unlit_light`] in an unlit one. Consumable items restore
//! it, capped at 1.

use liminal_procedural::ItemKind;
use serde::{Deserialize, Serialize};

/// Sanity of a fresh observer.
pub const FULL_SANITY: f32 = 1.0;

/// Configuration for the sanity meter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanityConfig {
    /// Drain per second regardless of surroundings.
    pub drain_base: f32,
    /// Extra drain per second in full darkness.
    pub drain_dark: f32,
    /// Extra drain per second at full isolation.
    pub drain_isolated: f32,
    /// Light factor in a lit chunk.
    pub lit_light: f32,
    /// Light factor in an unlit chunk.
    pub unlit_light: f32,
    /// Isolation factor of the endless grid.
    pub isolation: f32,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            drain_base: 0.001,
            drain_dark: 0.003,
            drain_isolated: 0.002,
            lit_light: 0.7,
            unlit_light: 0.0,
            isolation: 0.2,
        }
    }
}

impl SanityConfig {
    /// Drain per second for the given light factor.
    #[must_use]
    pub fn drain_rate(&self, light: f32) -> f32 {
        let light = light.clamp(0.0, 1.0);
        self.drain_base + (1.0 - light) * self.drain_dark + self.isolation * self.drain_isolated
    }
}

/// The observer's sanity.
#[derive(Clone, Debug)]
pub struct SanityMeter {
    config: SanityConfig,
    value: f32,
}

impl SanityMeter {
    /// Creates a full meter.
    #[must_use]
    pub const fn new(config: SanityConfig) -> Self {
        Self {
            config,
            value: FULL_SANITY,
        }
    }

    /// Drains for `dt` seconds. `unlit` selects the chunk's light factor.
    ///
    /// Negative or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f32, unlit: bool) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let light = if unlit {
            self.config.unlit_light
        } else {
            self.config.lit_light
        };
        self.value = (self.value - self.config.drain_rate(light) * dt).clamp(0.0, FULL_SANITY);
    }

    /// Consumes `item`. Returns false if the item restores nothing.
    pub fn use_item(&mut self, item: ItemKind) -> bool {
        let Some(amount) = item.restore() else {
            return false;
        };
        self.value = (self.value + amount).min(FULL_SANITY);
        true
    }

    /// Current sanity.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Refills the meter.
    pub fn reset(&mut self) {
        self.value = FULL_SANITY;
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &SanityConfig {
        &self.config
    }
}

impl Default for SanityMeter {
    fn default() -> Self {
        Self::new(SanityConfig::default())
    }
}
