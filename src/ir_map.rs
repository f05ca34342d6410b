// src/ir_map.rs

/// Canonical, format-agnostic map as produced by a [`MapSource`](crate::MapSource).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Map {
    /// Width of a single tile in pixels.
    pub tile_width: u32,
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Tilesets in declaration order.
    pub tilesets: Vec<Tileset>,
    /// Tile layers in document order.
    pub layers: Vec<Layer>,
    /// Object groups in document order.
    pub object_groups: Vec<ObjectGroup>,
}

impl Map {
    /// Total number of objects across every object group.
    pub fn object_count(&self) -> usize {
        self.object_groups.iter().map(|g| g.objects.len()).sum()
    }
}

/// A tileset reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tileset {
    /// Tileset name as declared in the map.
    pub name: String,
    /// Image source relative to the map directory. `None` for image-collection tilesets.
    pub image_source: Option<String>,
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    /// Tileset-local tile index.
    pub id: u32,
    /// Index into [`Map::tilesets`], `None` when no tile is placed.
    pub tileset: Option<usize>,
}

impl Tile {
    /// A cell with no tile placed.
    pub const EMPTY: Tile = Tile { id: 0, tileset: None };

    /// A cell holding tile `id` of tileset `tileset`.
    pub const fn new(tileset: usize, id: u32) -> Self {
        Tile {
            id,
            tileset: Some(tileset),
        }
    }

    /// True for a cell with no tile placed.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.tileset.is_none()
    }
}

/// One grid of tile placements spanning the whole map, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layer {
    /// Layer name as authored.
    pub name: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// `width * height` cells.
    pub tiles: Vec<Tile>,
}

impl Layer {
    /// A `width` x `height` layer with every cell empty.
    pub fn empty(name: impl Into<String>, width: u32, height: u32) -> Self {
        Layer {
            name: name.into(),
            width,
            height,
            tiles: vec![Tile::EMPTY; width as usize * height as usize],
        }
    }

    /// Places `tile` at (`x`, `y`). Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) as usize;
            self.tiles[idx] = tile;
        }
    }

    /// Cell at (`x`, `y`); anything outside the grid reads as empty.
    pub fn tile(&self, x: u32, y: u32) -> Tile {
        if x >= self.width || y >= self.height {
            return Tile::EMPTY;
        }
        self.tiles
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(Tile::EMPTY)
    }

    /// Rows top-to-bottom, each left-to-right.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width.max(1) as usize)
    }
}

/// A named, ordered collection of placed objects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectGroup {
    /// Group name as authored.
    pub name: String,
    /// Objects in document order.
    pub objects: Vec<MapObject>,
}

/// A placed rectangular object in map-space pixels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapObject {
    /// Object name; may be empty.
    pub name: String,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Zero for points and polygons.
    pub width: i32,
    /// Zero for points and polygons.
    pub height: i32,
}

impl MapObject {
    /// Builds an object from already-truncated coordinates.
    pub fn new(name: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        MapObject {
            name: name.into(),
            x,
            y,
            width,
            height,
        }
    }
}
