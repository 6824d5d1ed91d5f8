//! # Unique World Features
//!
//! At most one chunk per session is *the* hazard room and at most one is
//! *the* exit. Descriptor flags only say a chunk is eligible; the first
//! flagged chunk to be materialized claims the feature, permanently.
//!
//! Claims outlive the chunk: unloading and re-materializing the holder
//! honors the feature again, and no other coordinate can take it over.

use crate::chunk::ChunkCoord;

/// Features with at most one holder per world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// The "pitfalls" room: beams over a grid of pits.
    HazardRoom,
    /// The exit door.
    SpecialExit,
}

impl FeatureKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HazardRoom => "hazard room",
            Self::SpecialExit => "special exit",
        }
    }
}

/// First-come claims on unique features.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniqueFeatures {
    hazard_room: Option<ChunkCoord>,
    special_exit: Option<ChunkCoord>,
}

impl UniqueFeatures {
    /// Creates an empty claim table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hazard_room: None,
            special_exit: None,
        }
    }

    fn slot(&mut self, kind: FeatureKind) -> &mut Option<ChunkCoord> {
        match kind {
            FeatureKind::HazardRoom => &mut self.hazard_room,
            FeatureKind::SpecialExit => &mut self.special_exit,
        }
    }

    /// Claims `kind` for `coord`.
    ///
    /// Returns `true` if the claim is new or `coord` already holds it.
    /// Returns `false` (and changes nothing) if another coordinate holds it.
    pub fn claim(&mut self, kind: FeatureKind, coord: ChunkCoord) -> bool {
        let slot = self.slot(kind);
        match *slot {
            None => {
                *slot = Some(coord);
                true
            }
            Some(holder) => holder == coord,
        }
    }

    /// Returns the holder of `kind`, if claimed.
    #[must_use]
    pub const fn holder(&self, kind: FeatureKind) -> Option<ChunkCoord> {
        match kind {
            FeatureKind::HazardRoom => self.hazard_room,
            FeatureKind::SpecialExit => self.special_exit,
        }
    }

    /// True if `coord` holds `kind`.
    #[must_use]
    pub fn is_holder(&self, kind: FeatureKind, coord: ChunkCoord) -> bool {
        self.holder(kind) == Some(coord)
    }
}

/// Which flagged features a materialized chunk actually gets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HonoredFeatures {
    /// This chunk is the hazard room.
    pub hazard_room: bool,
    /// This chunk holds the exit.
    pub special_exit: bool,
}

impl HonoredFeatures {
    /// True if any feature is honored.
    #[must_use]
    pub const fn any(self) -> bool {
        self.hazard_room || self.special_exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_wins() {
        let mut features = UniqueFeatures::new();
        let a = ChunkCoord::new(1, 2);
        let b = ChunkCoord::new(-3, 4);

        assert!(features.claim(FeatureKind::HazardRoom, a));
        assert!(!features.claim(FeatureKind::HazardRoom, b));
        assert_eq!(features.holder(FeatureKind::HazardRoom), Some(a));
    }

    #[test]
    fn test_claim_is_idempotent_for_holder() {
        let mut features = UniqueFeatures::new();
        let a = ChunkCoord::new(0, 0);
        assert!(features.claim(FeatureKind::SpecialExit, a));
        assert!(features.claim(FeatureKind::SpecialExit, a));
        assert!(features.is_holder(FeatureKind::SpecialExit, a));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut features = UniqueFeatures::new();
        let a = ChunkCoord::new(5, 5);
        let b = ChunkCoord::new(6, 6);
        assert!(features.claim(FeatureKind::HazardRoom, a));
        assert!(features.claim(FeatureKind::SpecialExit, b));
        assert_eq!(features.holder(FeatureKind::HazardRoom), Some(a));
        assert_eq!(features.holder(FeatureKind::SpecialExit), Some(b));
    }
}
