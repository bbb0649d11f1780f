use std::fmt;

use serde::{Deserialize, Serialize};

/// World units per map tile.
pub const TILE_SIZE: i16 = 32;

/// A tile coordinate on the game map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u16,
    pub y: u16,
}

impl TilePos {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Centre of the tile in world units, at the given height.
    pub fn world_centre(self, z: i16) -> Pos3 {
        Pos3 {
            x: self.x as i16 * TILE_SIZE + TILE_SIZE / 2,
            y: self.y as i16 * TILE_SIZE + TILE_SIZE / 2,
            z,
        }
    }

    /// Manhattan distance in tiles; used for spacing rules.
    pub fn manhattan_distance(self, other: TilePos) -> u32 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        dx + dy
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position in world units, used for viewport invalidation hints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Pos3 {
    pub fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Pos3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_centre_lands_mid_tile() {
        let pos = TilePos::new(2, 3).world_centre(48);
        assert_eq!(pos, Pos3::new(80, 112, 48));
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = TilePos::new(1, 10);
        let b = TilePos::new(4, 2);
        assert_eq!(a.manhattan_distance(b), 11);
        assert_eq!(b.manhattan_distance(a), 11);
    }
}
