//! # Chunk Coordinates
//!
//! The world is a grid of square chunks on the XZ plane. A chunk is
//! addressed by integer grid coordinates and covers
//! `[x * size, (x + 1) * size) x [z * size, (z + 1) * size)` in meters.

use liminal_shared::Vec3;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not meters).
    pub x: i32,
    /// Z coordinate (in chunks, not meters).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts a world position to the chunk that contains it.
    ///
    /// Uses floor division, so `-0.5` lands in chunk `-1`.
    #[inline]
    #[must_use]
    pub fn from_position(position: Vec3, chunk_size: f32) -> Self {
        Self {
            x: (position.x / chunk_size).floor() as i32,
            z: (position.z / chunk_size).floor() as i32,
        }
    }

    /// Chebyshev (king-move) distance between two coordinates.
    #[inline]
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx.max(dz)
    }

    /// Manhattan distance between two coordinates.
    #[inline]
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx + dz
    }

    /// Returns the coordinate offset by `(dx, dz)`, wrapping at the edges.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            z: self.z.wrapping_add(dz),
        }
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Axis-aligned rectangle on the XZ plane, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaBounds {
    /// Minimum X (corner).
    pub x: f32,
    /// Minimum Z (corner).
    pub z: f32,
    /// Extent along X.
    pub w: f32,
    /// Extent along Z.
    pub d: f32,
}

impl AreaBounds {
    /// Creates new bounds from a corner and extents.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, z: f32, w: f32, d: f32) -> Self {
        Self { x, z, w, d }
    }

    /// Returns the area covered by a chunk.
    #[inline]
    #[must_use]
    pub fn for_chunk(coord: ChunkCoord, chunk_size: f32) -> Self {
        Self {
            x: coord.x as f32 * chunk_size,
            z: coord.z as f32 * chunk_size,
            w: chunk_size,
            d: chunk_size,
        }
    }

    /// Returns a `w x d` rectangle centered inside `self`.
    #[inline]
    #[must_use]
    pub fn centered(self, w: f32, d: f32) -> Self {
        Self {
            x: self.x + (self.w - w) / 2.0,
            z: self.z + (self.d - d) / 2.0,
            w,
            d,
        }
    }

    /// Center of the rectangle at height `y`.
    #[inline]
    #[must_use]
    pub fn center(self, y: f32) -> Vec3 {
        Vec3::new(self.x + self.w / 2.0, y, self.z + self.d / 2.0)
    }

    /// True if the planar point lies inside (min inclusive, max exclusive).
    #[inline]
    #[must_use]
    pub fn contains(self, x: f32, z: f32) -> bool {
        x >= self.x && x < self.x + self.w && z >= self.z && z < self.z + self.d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_position() {
        let size = 30.0;
        let at = |x: f32, z: f32| ChunkCoord::from_position(Vec3::new(x, 1.7, z), size);

        assert_eq!(at(0.0, 0.0), ChunkCoord::new(0, 0));
        assert_eq!(at(29.9, 29.9), ChunkCoord::new(0, 0));
        assert_eq!(at(30.0, 30.0), ChunkCoord::new(1, 1));
        assert_eq!(at(-0.1, -0.1), ChunkCoord::new(-1, -1));
        assert_eq!(at(-30.0, -30.0), ChunkCoord::new(-1, -1));
        assert_eq!(at(-30.1, -30.1), ChunkCoord::new(-2, -2));
    }

    #[test]
    fn test_distances() {
        let a = ChunkCoord::new(0, 0);
        let b = ChunkCoord::new(3, -1);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(a.manhattan_distance(b), 4);

        // No overflow at the extremes.
        let lo = ChunkCoord::new(i32::MIN, i32::MIN);
        let hi = ChunkCoord::new(i32::MAX, i32::MAX);
        assert_eq!(lo.chebyshev_distance(hi), u64::from(u32::MAX));
    }

    #[test]
    fn test_bounds_for_chunk() {
        let bounds = AreaBounds::for_chunk(ChunkCoord::new(-1, 2), 30.0);
        assert_eq!(bounds, AreaBounds::new(-30.0, 60.0, 30.0, 30.0));
        assert!(bounds.contains(-15.0, 75.0));
        assert!(!bounds.contains(0.0, 75.0));
    }

    #[test]
    fn test_centered() {
        let room = AreaBounds::new(0.0, 0.0, 30.0, 30.0).centered(20.0, 20.0);
        assert_eq!(room, AreaBounds::new(5.0, 5.0, 20.0, 20.0));
    }
}
