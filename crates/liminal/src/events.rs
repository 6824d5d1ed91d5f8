//! # LIMINAL Event System
//!
//! One-way notifications from the simulation to whoever renders, plays
//! audio or drives level changes.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │ Simulation  │─────>│   Event     │─────>│   Host      │
//! │  (tick)     │      │   Channel   │      │ (GFX/Audio) │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! The channel is bounded. A full channel drops the event and logs a
//! warning; progression transitions are also returned directly from
//! `Simulation::tick`, so losing an event never loses an edge.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use liminal_procedural::{ChunkCoord, ChunkDescriptor, FeatureKind};
use liminal_shared::Vec3;

use crate::gameplay::EntityId;

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Events published by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldEvent {
    // =========================================================================
    // Progression Events
    // =========================================================================
    /// The environmental shift began.
    ProgressionBegan {
        /// Distinct chunks visited at that moment.
        visited: usize,
    },

    /// Ramp value after this tick (published every tick while active).
    ProgressionRamp {
        /// Ramp value in `[0, 1]`.
        value: f32,
    },

    /// The traversal threshold was reached. Published exactly once.
    ProgressionTriggered {
        /// Chunk changes counted while ramping.
        traversed: u32,
        /// Ramp value at the moment of the trigger.
        ramp: f32,
    },

    // =========================================================================
    // World Events
    // =========================================================================
    /// A chunk was materialized.
    ChunkActivated {
        /// Chunk coordinate.
        coord: ChunkCoord,
        /// Its descriptor flags.
        descriptor: ChunkDescriptor,
    },

    /// A chunk was evicted and its visuals released.
    ChunkEvicted {
        /// Chunk coordinate.
        coord: ChunkCoord,
    },

    /// A unique feature found its holder.
    UniqueFeatureClaimed {
        /// Which feature.
        kind: FeatureKind,
        /// Holder coordinate.
        coord: ChunkCoord,
    },

    // =========================================================================
    // Entity Events
    // =========================================================================
    /// A hostile entity spawned.
    EntitySpawned {
        /// Entity ID.
        id: EntityId,
        /// Spawn position.
        position: Vec3,
        /// True if the entity never moves.
        ai_disabled: bool,
    },
}

/// Event bus between the simulation and the host.
///
/// Pre-allocates a bounded channel to prevent memory growth in the hot
/// path.
pub struct EventBus {
    /// Sender end - held by the simulation.
    sender: Sender<WorldEvent>,
    /// Receiver end - held by consumers.
    receiver: Receiver<WorldEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<WorldEvent>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: WorldEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Event channel full, dropped {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<WorldEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<WorldEvent> {
        let mut events = Vec::with_capacity(64);
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<WorldEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_send_receive() {
        let bus = EventBus::new(100);
        let sender = bus.sender();
        let receiver = bus.receiver();

        let event = WorldEvent::ChunkEvicted {
            coord: ChunkCoord::new(1, -1),
        };

        assert!(sender.send(event.clone()));
        assert!(receiver.has_events());
        assert_eq!(receiver.try_recv(), Some(event));
        assert!(!receiver.has_events());
    }

    #[test]
    fn test_full_channel_drops() {
        let bus = EventBus::new(2);
        let sender = bus.sender();
        let receiver = bus.receiver();

        assert!(sender.send(WorldEvent::ProgressionRamp { value: 0.1 }));
        assert!(sender.send(WorldEvent::ProgressionRamp { value: 0.2 }));
        assert!(!sender.send(WorldEvent::ProgressionRamp { value: 0.3 }));
        assert_eq!(receiver.pending_count(), 2);

        let drained = receiver.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1], WorldEvent::ProgressionRamp { value: 0.2 });
    }
}
