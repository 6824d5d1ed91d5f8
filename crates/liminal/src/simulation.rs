//! # LIMINAL Simulation
//!
//! The per-frame orchestrator:
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. STREAMING                                                        │
//! │    ├─ Evict chunks beyond radius + hysteresis                       │
//! │    ├─ Activate missing chunks (claims, visuals, fixtures)           │
//! │    └─ Publish ChunkEvicted / ChunkActivated / UniqueFeatureClaimed  │
//! │                                                                     │
//! │ 2. PROGRESSION                                                      │
//! │    ├─ Visited count + observer chunk → phase, ramp                  │
//! │    └─ Publish ProgressionBegan / ProgressionRamp / Triggered        │
//! │                                                                     │
//! │ 3. PURSUIT                                                          │
//! │    └─ Zone of the observer → chase or idle                          │
//! │                                                                     │
//! │ 4. SANITY                                                           │
//! │    └─ Drain, faster in an unlit chunk                               │
//! │                                                                     │
//! │ 5. FLICKER                                                          │
//! │    └─ Advance fixture intensities                                   │
//! │                                                                     │
//! │ 6. ENVIRONMENT                                                      │
//! │    └─ Progression snapshot → fog, clear color, audio, flashlight    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on the caller's thread. Nothing blocks.

use liminal_procedural::{
    ChunkMaterializer, HeadlessMaterializer, ItemKind, StreamingReport, WorldManager, ZoneTag,
};
use liminal_shared::Vec3;

use crate::config::LiminalConfig;
use crate::environment::{EnvironmentCoupling, EnvironmentOutputs};
use crate::events::{EventBus, EventReceiver, EventSender, WorldEvent};
use crate::gameplay::{EntityId, PursuitController, PursuitStats, SanityMeter};
use crate::progression::{ProgressionStateMachine, Transition};

/// Largest time step accepted by [`Simulation::tick`] (seconds).
pub const MAX_TICK_DT: f32 = 0.1;

/// Smallest ramp change that publishes a new `ProgressionRamp` event.
pub const RAMP_EVENT_STEP: f32 = 0.01;

/// What one simulation tick did.
#[derive(Clone, Debug)]
pub struct TickReport {
    /// Frame number (starts at 0).
    pub frame: u64,
    /// Streaming outcome.
    pub streaming: StreamingReport,
    /// Progression transition of this tick, if any.
    pub transition: Option<Transition>,
    /// Zone of the observer.
    pub zone: ZoneTag,
    /// Entity counts after the pursuit update.
    pub pursuit: PursuitStats,
    /// Observer sanity after this tick.
    pub sanity: f32,
    /// Environment values for this frame.
    pub environment: EnvironmentOutputs,
    /// Events dropped because the channel was full.
    pub events_dropped: u32,
}

/// The simulation: world, progression, pursuit and environment in one tick.
pub struct Simulation<M = HeadlessMaterializer> {
    world: WorldManager<M>,
    progression: ProgressionStateMachine,
    coupling: EnvironmentCoupling,
    pursuit: PursuitController,
    sanity: SanityMeter,
    events: EventBus,
    sender: EventSender,
    last_published_ramp: Option<f32>,
    frame: u64,
}

impl Simulation<HeadlessMaterializer> {
    /// Creates a simulation with a [`HeadlessMaterializer`].
    #[must_use]
    pub fn new(config: LiminalConfig) -> Self {
        Self::with_materializer(config, HeadlessMaterializer::new())
    }
}

impl<M: ChunkMaterializer> Simulation<M> {
    /// Creates a simulation that builds visuals through `materializer`.
    #[must_use]
    pub fn with_materializer(config: LiminalConfig, materializer: M) -> Self {
        let events = EventBus::new(config.events.capacity);
        let sender = events.sender();
        Self {
            world: WorldManager::with_materializer(config.world, materializer),
            progression: ProgressionStateMachine::new(config.progression),
            coupling: EnvironmentCoupling::new(config.environment),
            pursuit: PursuitController::new(config.pursuit),
            sanity: SanityMeter::new(config.sanity),
            events,
            sender,
            last_published_ramp: None,
            frame: 0,
        }
    }

    /// Runs one tick of `dt` seconds with the observer at `observer`.
    ///
    /// `dt` is clamped to `[0, MAX_TICK_DT]`; a non-finite `dt` counts as 0.
    pub fn tick(&mut self, dt: f32, observer: Vec3) -> TickReport {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_TICK_DT) } else { 0.0 };
        let mut dropped = 0u32;

        // 1. Streaming
        let streaming = self.world.update(observer);
        for &coord in &streaming.evicted {
            dropped += self.publish(WorldEvent::ChunkEvicted { coord });
        }
        for &coord in &streaming.activated {
            if let Some(record) = self.world.chunk(coord) {
                let descriptor = record.descriptor;
                dropped += self.publish(WorldEvent::ChunkActivated { coord, descriptor });
            }
        }
        for &(kind, coord) in &streaming.claimed {
            dropped += self.publish(WorldEvent::UniqueFeatureClaimed { kind, coord });
        }

        // 2. Progression
        let transition = self
            .progression
            .update(dt, streaming.visited_count, streaming.observer_chunk);
        match transition {
            Some(Transition::Began { visited }) => {
                dropped += self.publish(WorldEvent::ProgressionBegan { visited });
            }
            Some(Transition::Triggered { traversed, ramp }) => {
                dropped += self.publish(WorldEvent::ProgressionTriggered { traversed, ramp });
            }
            None => {}
        }
        if self.progression.phase().is_active() {
            let value = self.progression.ramp();
            let due = match self.last_published_ramp {
                None => true,
                Some(last) => value - last >= RAMP_EVENT_STEP || (value >= 1.0 && last < 1.0),
            };
            if due {
                dropped += self.publish(WorldEvent::ProgressionRamp { value });
                self.last_published_ramp = Some(value);
            }
        } else {
            self.last_published_ramp = None;
        }

        // 3. Pursuit
        let zone = self.world.classify_zone(observer);
        self.pursuit.update(dt, observer, zone);

        // 4. Sanity
        let unlit = self
            .world
            .chunk(streaming.observer_chunk)
            .is_some_and(|record| record.descriptor.is_unlit);
        self.sanity.update(dt, unlit);

        // 5. Flicker
        self.world.advance_fixtures(dt);

        // 6. Environment
        let environment = self.coupling.evaluate(&self.progression.snapshot());

        let report = TickReport {
            frame: self.frame,
            streaming,
            transition,
            zone,
            pursuit: self.pursuit.stats(),
            sanity: self.sanity.value(),
            environment,
            events_dropped: dropped,
        };
        self.frame += 1;
        report
    }

    /// Spawns a hostile entity and publishes `EntitySpawned`.
    pub fn spawn_entity(&mut self, position: Vec3, ai_disabled: bool) -> EntityId {
        let id = self.pursuit.spawn_entity(position, ai_disabled);
        self.publish(WorldEvent::EntitySpawned {
            id,
            position,
            ai_disabled,
        });
        id
    }

    /// The observer consumes `item`. Returns false if it restores nothing.
    pub fn use_item(&mut self, item: ItemKind) -> bool {
        self.sanity.use_item(item)
    }

    /// Returns 1 if the event was dropped.
    fn publish(&self, event: WorldEvent) -> u32 {
        u32::from(!self.sender.send(event))
    }

    /// A receiver for published events.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        self.events.receiver()
    }

    /// Current environment values.
    #[must_use]
    pub fn environment(&self) -> EnvironmentOutputs {
        self.coupling.evaluate(&self.progression.snapshot())
    }

    /// The world manager.
    #[must_use]
    pub const fn world(&self) -> &WorldManager<M> {
        &self.world
    }

    /// Mutable access to the world manager.
    pub fn world_mut(&mut self) -> &mut WorldManager<M> {
        &mut self.world
    }

    /// The progression state machine.
    #[must_use]
    pub const fn progression(&self) -> &ProgressionStateMachine {
        &self.progression
    }

    /// Mutable access to the progression state machine (e.g. to reset it).
    pub fn progression_mut(&mut self) -> &mut ProgressionStateMachine {
        &mut self.progression
    }

    /// The pursuit controller.
    #[must_use]
    pub const fn pursuit(&self) -> &PursuitController {
        &self.pursuit
    }

    /// Mutable access to the pursuit controller.
    pub fn pursuit_mut(&mut self) -> &mut PursuitController {
        &mut self.pursuit
    }

    /// The observer's sanity meter.
    #[must_use]
    pub const fn sanity(&self) -> &SanityMeter {
        &self.sanity
    }

    /// Mutable access to the sanity meter.
    pub fn sanity_mut(&mut self) -> &mut SanityMeter {
        &mut self.sanity
    }

    /// Frames ticked so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}
