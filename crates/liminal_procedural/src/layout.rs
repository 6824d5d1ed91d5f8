//! # Chunk Layout
//!
//! Structural data a renderer needs to build a chunk: internal wall
//! segments, item spawns and ceiling fixture slots. The layout is derived
//! from the chunk stream *after* the four descriptor draws, in this order:
//!
//! 1. wall segment count, then per segment: orientation, length, x, z
//! 2. flashlight chance, almond water chance, then two position draws per
//!    spawned item
//!
//! Fixture slots take no draws; they sit on a fixed grid.
//!
//! Unique features (hazard room, exit door) have fixed placement inside
//! their chunk, see [`hazard_room_bounds`] and [`exit_door_position`]. They
//! bring their own lights, see [`feature_fixtures`].

use liminal_shared::{Vec3, CEILING_HEIGHT};

use crate::chunk::AreaBounds;
use crate::descriptor::ChunkDescriptor;
use crate::features::HonoredFeatures;
use crate::rng::ChunkRng;

/// Minimum number of internal wall segments.
const MIN_WALL_SEGMENTS: u32 = 2;
/// Extra segments drawn on top of the minimum (exclusive upper bound).
const EXTRA_WALL_SEGMENTS: f64 = 6.0;
/// Minimum wall segment length in meters.
const MIN_WALL_LENGTH: u32 = 3;
/// Extra length drawn on top of the minimum (exclusive upper bound).
const EXTRA_WALL_LENGTH: f64 = 10.0;

/// Chance per chunk to spawn a flashlight.
pub const FLASHLIGHT_CHANCE: f64 = 0.15;
/// Chance per chunk to spawn an almond water bottle.
pub const ALMOND_WATER_CHANCE: f64 = 0.25;
/// Items keep this distance from the chunk edge.
const ITEM_SAFE_MARGIN: f32 = 2.0;
/// Items rest slightly above the floor.
const ITEM_HEIGHT: f32 = 0.12;

/// Fixture grid spacing in meters.
const FIXTURE_SPACING: f32 = 4.0;
/// Distance of the first fixture row from the chunk corner.
const FIXTURE_INSET: f32 = 2.0;
/// Fixture intensity in lit chunks.
pub const LIT_INTENSITY: f32 = 0.9;
/// Fixture intensity in unlit chunks.
pub const UNLIT_INTENSITY: f32 = 0.15;

/// Edge length of the hazard room.
pub const HAZARD_ROOM_SIZE: f32 = 20.0;
/// Pits per side inside the hazard room.
pub const HAZARD_ROOM_PITS: u32 = 4;
/// Width of the beams between pits.
const HAZARD_BEAM_WIDTH: f32 = 0.6;
/// Spacing of the hazard room's overhead lights.
const HAZARD_FIXTURE_SPACING: f32 = 5.0;
/// Base intensity of the hazard room's lights.
pub const HAZARD_FIXTURE_INTENSITY: f32 = 0.8;
/// Flicker stress of the hazard room's lights.
pub const HAZARD_FIXTURE_STRESS: f32 = 0.3;
/// Base intensity of the light above the exit door.
pub const EXIT_FIXTURE_INTENSITY: f32 = 0.6;
/// Flicker stress of the light above the exit door.
pub const EXIT_FIXTURE_STRESS: f32 = 0.8;

/// A straight internal wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSegment {
    /// Runs along X if true, along Z otherwise.
    pub horizontal: bool,
    /// Length in meters.
    pub length: f32,
    /// Start X in world space.
    pub x: f32,
    /// Start Z in world space.
    pub z: f32,
}

impl WallSegment {
    /// Midpoint of the wall on the floor plane.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        if self.horizontal {
            Vec3::new(self.x + self.length / 2.0, CEILING_HEIGHT / 2.0, self.z)
        } else {
            Vec3::new(self.x, CEILING_HEIGHT / 2.0, self.z + self.length / 2.0)
        }
    }
}

/// Kinds of pickup items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Handheld light.
    Flashlight,
    /// Restores sanity when used.
    AlmondWater,
}

impl ItemKind {
    /// Sanity restored on use, if the item is consumable.
    #[must_use]
    pub const fn restore(self) -> Option<f32> {
        match self {
            Self::Flashlight => None,
            Self::AlmondWater => Some(0.35),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Flashlight => "Flashlight",
            Self::AlmondWater => "Almond Water",
        }
    }
}

/// An item placed on the floor of a chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemSpawn {
    /// What spawns.
    pub kind: ItemKind,
    /// World position.
    pub position: Vec3,
}

/// A ceiling light position and its base brightness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixtureSlot {
    /// World position, just below the ceiling.
    pub position: Vec3,
    /// Intensity the flicker oscillates around.
    pub base_intensity: f32,
    /// Fixed flicker stress. `None` takes the chunk's stress factor.
    pub stress: Option<f32>,
}

/// Everything structural about a chunk besides its flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkLayout {
    /// Internal wall segments (outer walls are implied by the bounds).
    pub walls: Vec<WallSegment>,
    /// Item spawns.
    pub items: Vec<ItemSpawn>,
    /// Ceiling fixture slots.
    pub fixtures: Vec<FixtureSlot>,
}

impl ChunkLayout {
    /// Generates the layout, continuing `rng` after the descriptor draws.
    pub(crate) fn generate(rng: &mut ChunkRng, descriptor: &ChunkDescriptor, bounds: AreaBounds) -> Self {
        let walls = generate_walls(rng, bounds);
        let items = generate_items(rng, bounds);
        let fixtures = fixture_grid(bounds, descriptor.is_unlit);
        Self {
            walls,
            items,
            fixtures,
        }
    }
}

fn generate_walls(rng: &mut ChunkRng, bounds: AreaBounds) -> Vec<WallSegment> {
    let count = MIN_WALL_SEGMENTS + (rng.next_f64() * EXTRA_WALL_SEGMENTS) as u32;
    let mut walls = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let horizontal = rng.chance(0.5);
        let length = (MIN_WALL_LENGTH + (rng.next_f64() * EXTRA_WALL_LENGTH) as u32) as f32;
        // Keep one meter of clearance to the outer walls; shrinks to zero
        // span when the chunk is too small for the segment.
        let span_x = (bounds.w - length - 2.0).max(0.0);
        let span_z = (bounds.d - length - 2.0).max(0.0);
        let x = bounds.x + rng.next_f64() as f32 * span_x + 1.0;
        let z = bounds.z + rng.next_f64() as f32 * span_z + 1.0;
        walls.push(WallSegment {
            horizontal,
            length,
            x,
            z,
        });
    }

    walls
}

fn generate_items(rng: &mut ChunkRng, bounds: AreaBounds) -> Vec<ItemSpawn> {
    let spawn_flashlight = rng.chance(FLASHLIGHT_CHANCE);
    let spawn_almond = rng.chance(ALMOND_WATER_CHANCE);

    let mut items = Vec::with_capacity(2);
    let mut place = |kind: ItemKind, rng: &mut ChunkRng| {
        let span_x = (bounds.w - ITEM_SAFE_MARGIN * 2.0).max(0.0);
        let span_z = (bounds.d - ITEM_SAFE_MARGIN * 2.0).max(0.0);
        let x = bounds.x + ITEM_SAFE_MARGIN + rng.next_f64() as f32 * span_x;
        let z = bounds.z + ITEM_SAFE_MARGIN + rng.next_f64() as f32 * span_z;
        items.push(ItemSpawn {
            kind,
            position: Vec3::new(x, ITEM_HEIGHT, z),
        });
    };

    if spawn_flashlight {
        place(ItemKind::Flashlight, rng);
    }
    if spawn_almond {
        place(ItemKind::AlmondWater, rng);
    }

    items
}

fn fixture_grid(bounds: AreaBounds, unlit: bool) -> Vec<FixtureSlot> {
    let base_intensity = if unlit { UNLIT_INTENSITY } else { LIT_INTENSITY };
    let y = CEILING_HEIGHT - 0.2;
    let mut fixtures = Vec::new();

    let mut x = bounds.x + FIXTURE_INSET;
    while x < bounds.x + bounds.w - 1.0 {
        let mut z = bounds.z + FIXTURE_INSET;
        while z < bounds.z + bounds.d - 1.0 {
            fixtures.push(FixtureSlot {
                position: Vec3::new(x, y, z),
                base_intensity,
                stress: None,
            });
            z += FIXTURE_SPACING;
        }
        x += FIXTURE_SPACING;
    }

    fixtures
}

/// Bounds of the hazard room inside its chunk (centered, clamped to the chunk).
#[must_use]
pub fn hazard_room_bounds(chunk: AreaBounds) -> AreaBounds {
    chunk.centered(HAZARD_ROOM_SIZE.min(chunk.w), HAZARD_ROOM_SIZE.min(chunk.d))
}

/// Pit cells of the hazard room, a `HAZARD_ROOM_PITS` square grid with
/// beams in between. Ordered by column, then row.
#[must_use]
pub fn hazard_room_pits(chunk: AreaBounds) -> Vec<AreaBounds> {
    let room = hazard_room_bounds(chunk);
    let cells = HAZARD_ROOM_PITS as f32;
    let cell_w = room.w / cells;
    let cell_d = room.d / cells;
    let pit_w = (cell_w - HAZARD_BEAM_WIDTH).max(0.0);
    let pit_d = (cell_d - HAZARD_BEAM_WIDTH).max(0.0);

    let mut pits = Vec::with_capacity((HAZARD_ROOM_PITS * HAZARD_ROOM_PITS) as usize);
    for ix in 0..HAZARD_ROOM_PITS {
        for iz in 0..HAZARD_ROOM_PITS {
            let cell = AreaBounds::new(room.x + ix as f32 * cell_w, room.z + iz as f32 * cell_d, cell_w, cell_d);
            pits.push(cell.centered(pit_w, pit_d));
        }
    }
    pits
}

/// Overhead lights of the hazard room.
#[must_use]
pub fn hazard_room_fixtures(chunk: AreaBounds) -> Vec<FixtureSlot> {
    let room = hazard_room_bounds(chunk);
    let y = CEILING_HEIGHT - 0.2;
    let mut fixtures = Vec::new();

    let mut x = room.x + FIXTURE_INSET;
    while x < room.x + room.w - 1.0 {
        let mut z = room.z + FIXTURE_INSET;
        while z < room.z + room.d - 1.0 {
            fixtures.push(FixtureSlot {
                position: Vec3::new(x, y, z),
                base_intensity: HAZARD_FIXTURE_INTENSITY,
                stress: Some(HAZARD_FIXTURE_STRESS),
            });
            z += HAZARD_FIXTURE_SPACING;
        }
        x += HAZARD_FIXTURE_SPACING;
    }

    fixtures
}

/// Position of the exit door inside its chunk (near the far corner).
#[must_use]
pub fn exit_door_position(chunk: AreaBounds) -> Vec3 {
    Vec3::new(chunk.x + chunk.w - 2.0, 1.1, chunk.z + chunk.d - 2.0)
}

/// The light above the exit door.
#[must_use]
pub fn exit_door_fixture(chunk: AreaBounds) -> FixtureSlot {
    let door = exit_door_position(chunk);
    FixtureSlot {
        position: Vec3::new(door.x, CEILING_HEIGHT - 0.2, door.z),
        base_intensity: EXIT_FIXTURE_INTENSITY,
        stress: Some(EXIT_FIXTURE_STRESS),
    }
}

/// Extra lights of the features a chunk holds.
#[must_use]
pub fn feature_fixtures(chunk: AreaBounds, honored: HonoredFeatures) -> Vec<FixtureSlot> {
    let mut fixtures = Vec::new();
    if honored.hazard_room {
        fixtures.extend(hazard_room_fixtures(chunk));
    }
    if honored.special_exit {
        fixtures.push(exit_door_fixture(chunk));
    }
    fixtures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkCoord;
    use crate::descriptor::DescriptorGenerator;

    fn layout_at(x: i32, z: i32) -> ChunkLayout {
        let coord = ChunkCoord::new(x, z);
        DescriptorGenerator::default()
            .generate(coord, AreaBounds::for_chunk(coord, 30.0))
            .1
    }

    #[test]
    fn test_layout_determinism() {
        for x in -5..5 {
            for z in -5..5 {
                assert_eq!(layout_at(x, z), layout_at(x, z));
            }
        }
    }

    #[test]
    fn test_walls_within_bounds() {
        for x in -10..10 {
            let coord = ChunkCoord::new(x, 3);
            let bounds = AreaBounds::for_chunk(coord, 30.0);
            let layout = layout_at(x, 3);

            assert!((2..8).contains(&layout.walls.len()));
            for wall in &layout.walls {
                assert!((3.0..13.0).contains(&wall.length));
                assert!(bounds.contains(wall.x, wall.z), "Wall start outside chunk: {wall:?}");
            }
        }
    }

    #[test]
    fn test_items_respect_margin() {
        for x in -30..30 {
            let coord = ChunkCoord::new(x, -x);
            let bounds = AreaBounds::for_chunk(coord, 30.0);
            for item in layout_at(x, -x).items {
                assert!(item.position.x >= bounds.x + ITEM_SAFE_MARGIN);
                assert!(item.position.x <= bounds.x + bounds.w - ITEM_SAFE_MARGIN);
                assert!(item.position.z >= bounds.z + ITEM_SAFE_MARGIN);
                assert!(item.position.z <= bounds.z + bounds.d - ITEM_SAFE_MARGIN);
            }
        }
    }

    #[test]
    fn test_fixture_grid() {
        let lit = fixture_grid(AreaBounds::new(0.0, 0.0, 30.0, 30.0), false);
        // Rows at 2, 6, 10, 14, 18, 22, 26.
        assert_eq!(lit.len(), 49);
        assert!(lit.iter().all(|f| f.base_intensity == LIT_INTENSITY && f.stress.is_none()));

        let unlit = fixture_grid(AreaBounds::new(0.0, 0.0, 30.0, 30.0), true);
        assert!(unlit.iter().all(|f| f.base_intensity == UNLIT_INTENSITY));
    }

    #[test]
    fn test_feature_placement() {
        let chunk = AreaBounds::new(30.0, 60.0, 30.0, 30.0);
        assert_eq!(hazard_room_bounds(chunk), AreaBounds::new(35.0, 65.0, 20.0, 20.0));
        assert_eq!(exit_door_position(chunk), Vec3::new(58.0, 1.1, 88.0));

        // Small chunks clamp the room to the chunk.
        let small = AreaBounds::new(0.0, 0.0, 12.0, 12.0);
        assert_eq!(hazard_room_bounds(small), small);
    }

    #[test]
    fn test_hazard_room_pits() {
        let chunk = AreaBounds::new(0.0, 0.0, 30.0, 30.0);
        let pits = hazard_room_pits(chunk);
        assert_eq!(pits.len(), 16);

        // Room spans 5..25, cells are 5 m, pits 4.4 m.
        let first = pits[0];
        for (got, want) in [(first.x, 5.3), (first.z, 5.3), (first.w, 4.4), (first.d, 4.4)] {
            assert!((got - want).abs() < 1e-4, "{got} != {want}");
        }
        let room = hazard_room_bounds(chunk);
        for pit in &pits {
            assert!(room.contains(pit.x, pit.z));
            assert!(pit.x + pit.w <= room.x + room.w);
            assert!(pit.z + pit.d <= room.z + room.d);
        }
    }

    #[test]
    fn test_feature_fixtures() {
        let chunk = AreaBounds::new(0.0, 0.0, 30.0, 30.0);
        let none = HonoredFeatures::default();
        assert!(feature_fixtures(chunk, none).is_empty());

        // Room lights at 7, 12, 17, 22 on both axes.
        let hazard = hazard_room_fixtures(chunk);
        assert_eq!(hazard.len(), 16);
        assert!(hazard
            .iter()
            .all(|f| f.base_intensity == HAZARD_FIXTURE_INTENSITY && f.stress == Some(HAZARD_FIXTURE_STRESS)));

        let exit = exit_door_fixture(chunk);
        assert_eq!(exit.position.x, 28.0);
        assert_eq!(exit.position.z, 28.0);
        assert_eq!(exit.stress, Some(EXIT_FIXTURE_STRESS));

        let both = HonoredFeatures {
            hazard_room: true,
            special_exit: true,
        };
        assert_eq!(feature_fixtures(chunk, both).len(), 17);
    }

    #[test]
    fn test_almond_water_restores() {
        assert_eq!(ItemKind::AlmondWater.restore(), Some(0.35));
        assert_eq!(ItemKind::Flashlight.restore(), None);
    }
}
