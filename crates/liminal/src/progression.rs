//! # Progression State Machine
//!
//! The "progressive shift": once the observer has explored enough of the
//! world, the environment starts turning red. Crossing enough chunks while
//! the shift is active triggers the next stage.
//!
//! ## Phases
//!
//! - **Dormant**: Nothing happens until `visit_threshold` chunks are visited.
//! - **Ramping**: The ramp value climbs toward 1 and chunk changes are counted.
//! - **Triggered**: Terminal until [`ProgressionStateMachine::reset`]. The
//!   ramp keeps climbing so the environment stays shifted.
//!
//! ## Edge Reporting
//!
//! [`ProgressionStateMachine::update`] returns the transition of this tick,
//! if any. Each transition is returned exactly once.

use liminal_procedural::ChunkCoord;
use serde::{Deserialize, Serialize};

/// Configuration for the progression state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Distinct chunks visited before the ramp begins.
    pub visit_threshold: usize,
    /// Chunk changes while ramping before the trigger fires.
    pub travel_threshold: u32,
    /// Ramp increase per second.
    pub ramp_rate: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            visit_threshold: 20,
            travel_threshold: 5,
            ramp_rate: 0.015,
        }
    }
}

/// Progression phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not yet active.
    #[default]
    Dormant,
    /// Active, counting traversals.
    Ramping,
    /// Threshold reached.
    Triggered,
}

impl Phase {
    /// True once the shift has begun.
    #[inline]
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Dormant)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dormant => "DORMANT",
            Self::Ramping => "RAMPING",
            Self::Triggered => "TRIGGERED",
        }
    }
}

/// A phase change reported by [`ProgressionStateMachine::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// Dormant → Ramping.
    Began {
        /// Visited count at the moment of the transition.
        visited: usize,
    },
    /// Ramping → Triggered.
    Triggered {
        /// Chunk changes counted while ramping.
        traversed: u32,
        /// Ramp value at the moment of the transition.
        ramp: f32,
    },
}

/// Read-only view of the progression state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressionSnapshot {
    /// Current phase.
    pub phase: Phase,
    /// Ramp value in `[0, 1]`.
    pub ramp: f32,
    /// Chunk changes counted while ramping.
    pub traversed: u32,
}

/// The progression state machine.
pub struct ProgressionStateMachine {
    config: ProgressionConfig,
    phase: Phase,
    ramp: f32,
    traversed: u32,
    last_observed: Option<ChunkCoord>,
}

impl ProgressionStateMachine {
    /// Creates a dormant state machine.
    #[must_use]
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            config,
            phase: Phase::Dormant,
            ramp: 0.0,
            traversed: 0,
            last_observed: None,
        }
    }

    /// Advances by `dt` seconds.
    ///
    /// `visited` is the world's visited count and `observer` the chunk the
    /// observer stands in this tick. Returns the transition that happened
    /// during this tick, if any.
    pub fn update(&mut self, dt: f32, visited: usize, observer: ChunkCoord) -> Option<Transition> {
        let moved = self.last_observed.is_some_and(|last| last != observer);
        self.last_observed = Some(observer);

        let mut transition = None;
        match self.phase {
            Phase::Dormant => {
                if visited >= self.config.visit_threshold {
                    self.phase = Phase::Ramping;
                    self.ramp = 0.0;
                    self.traversed = 0;
                    tracing::info!(
                        "Progression transition: {} -> {} ({} chunks visited)",
                        Phase::Dormant.name(),
                        Phase::Ramping.name(),
                        visited
                    );
                    transition = Some(Transition::Began { visited });
                }
            }
            Phase::Ramping => {
                if moved {
                    self.traversed += 1;
                    tracing::trace!("Traversed {} of {}", self.traversed, self.config.travel_threshold);
                }
            }
            Phase::Triggered => {}
        }

        if self.phase.is_active() {
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            self.ramp = (self.ramp + dt * self.config.ramp_rate).min(1.0);
        }

        // Checked no earlier than the tick after Began, so both edges are reported.
        if transition.is_none() && self.phase == Phase::Ramping && self.traversed >= self.config.travel_threshold {
            self.phase = Phase::Triggered;
            tracing::info!(
                "Progression transition: {} -> {} ({} chunks traversed, ramp {:.3})",
                Phase::Ramping.name(),
                Phase::Triggered.name(),
                self.traversed,
                self.ramp
            );
            transition = Some(Transition::Triggered {
                traversed: self.traversed,
                ramp: self.ramp,
            });
        }

        transition
    }

    /// Returns to Dormant and clears every counter.
    pub fn reset(&mut self) {
        tracing::info!("Progression reset from {}", self.phase.name());
        self.phase = Phase::Dormant;
        self.ramp = 0.0;
        self.traversed = 0;
        self.last_observed = None;
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current ramp value.
    #[inline]
    #[must_use]
    pub const fn ramp(&self) -> f32 {
        self.ramp
    }

    /// Snapshot for environment coupling.
    #[must_use]
    pub const fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            phase: self.phase,
            ramp: self.ramp,
            traversed: self.traversed,
        }
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &ProgressionConfig {
        &self.config
    }
}
