use serde::{Deserialize, Serialize};

use sim_schema::{CompanyId, IndustryId, StationId, TilePos};

/// Surface heights are expressed in small units; terraform commands move one
/// step at a time.
pub const MIN_BASE_HEIGHT: u8 = 0;
pub const MAX_BASE_HEIGHT: u8 = 60;

/// A tree standing on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeElement {
    pub object: u8,
    pub growth: u8,
    /// Preview instance; invisible to normal gameplay queries.
    pub ghost: bool,
}

/// A free-standing wall on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallElement {
    pub object: u8,
    pub rotation: u8,
    pub ghost: bool,
}

/// What occupies a tile besides terrain decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Industry(IndustryId),
    Headquarters(CompanyId),
    Station(StationId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileOccupant {
    pub occupant: Occupant,
    pub ghost: bool,
}

/// One map tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub base_height: u8,
    pub land_material: u8,
    pub tree: Option<TreeElement>,
    pub wall: Option<WallElement>,
    pub occupant: Option<TileOccupant>,
}

impl Tile {
    fn flat(base_height: u8) -> Self {
        Self {
            base_height,
            land_material: 0,
            tree: None,
            wall: None,
            occupant: None,
        }
    }

    /// A tile is clear when nothing occupies it. Ghost elements still block:
    /// previews reserve the tile until they are reversed.
    pub fn is_clear(&self) -> bool {
        self.tree.is_none() && self.wall.is_none() && self.occupant.is_none()
    }

    /// Tree visible to gameplay (ghosts excluded).
    pub fn live_tree(&self) -> Option<&TreeElement> {
        self.tree.as_ref().filter(|tree| !tree.ghost)
    }

    /// Wall visible to gameplay (ghosts excluded).
    pub fn live_wall(&self) -> Option<&WallElement> {
        self.wall.as_ref().filter(|wall| !wall.ghost)
    }
}

/// The game map: a dense grid of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
}

impl TileMap {
    pub fn flat(width: u16, height: u16, base_height: u8) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::flat(base_height); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Construction is illegal on the outermost ring of tiles. A map too
    /// small to have an interior has no buildable tiles at all.
    pub fn is_buildable(&self, pos: TilePos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as u32 + 1) < self.width as u32
            && (pos.y as u32 + 1) < self.height as u32
    }

    pub fn tile(&self, pos: TilePos) -> Option<&Tile> {
        self.index_of(pos).map(|index| &self.tiles[index])
    }

    pub fn tile_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index_of(pos).map(move |index| &mut self.tiles[index])
    }

    fn index_of(&self, pos: TilePos) -> Option<usize> {
        if pos.x < self.width && pos.y < self.height {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_maps_have_no_buildable_tiles() {
        for size in [0u16, 1, 2] {
            let map = TileMap::flat(size, size, 4);
            assert!(!map.is_buildable(TilePos::new(0, 0)));
            assert!(!map.is_buildable(TilePos::new(1, 1)));
        }
    }

    #[test]
    fn edge_ring_is_not_buildable() {
        let map = TileMap::flat(8, 8, 4);
        assert!(!map.is_buildable(TilePos::new(0, 3)));
        assert!(!map.is_buildable(TilePos::new(7, 3)));
        assert!(!map.is_buildable(TilePos::new(3, 0)));
        assert!(map.is_buildable(TilePos::new(1, 1)));
        assert!(map.is_buildable(TilePos::new(6, 6)));
    }

    #[test]
    fn ghost_elements_block_but_stay_invisible() {
        let mut map = TileMap::flat(4, 4, 4);
        let pos = TilePos::new(1, 1);
        let tile = map.tile_mut(pos).unwrap();
        tile.tree = Some(TreeElement {
            object: 0,
            growth: 0,
            ghost: true,
        });
        let tile = map.tile(pos).unwrap();
        assert!(tile.live_tree().is_none());
        assert!(!tile.is_clear());
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let map = TileMap::flat(4, 4, 4);
        assert!(map.tile(TilePos::new(4, 0)).is_none());
        assert!(map.tile(TilePos::new(0, 4)).is_none());
        assert!(map.tile(TilePos::new(3, 3)).is_some());
    }
}
