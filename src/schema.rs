//! Structural schema a map must satisfy before it can be encoded.
//!
//! The default schema is the level format's contract: one `spritesheet.png`
//! tileset, tile layers `Background` then `Foreground`, and object groups
//! `Collision` then `Spawn`. Other pipelines can describe their own layout in a
//! JSON file and reuse the same validator and encoder.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image every map's single tileset must use.
pub const SPRITESHEET_IMAGE: &str = "spritesheet.png";
/// Name of the first tile layer.
pub const BACKGROUND_LAYER: &str = "Background";
/// Name of the second tile layer.
pub const FOREGROUND_LAYER: &str = "Foreground";
/// Name of the collision geometry group.
pub const COLLISION_GROUP: &str = "Collision";
/// Name of the spawn point group.
pub const SPAWN_GROUP: &str = "Spawn";
/// Byte written for a cell with no tile.
pub const EMPTY_TILE: u8 = 0xFF;
/// Largest tile id the single-byte tile encoding can carry.
pub const MAX_TILE_ID: u8 = EMPTY_TILE - 1;

/// Required names and limits, one entry per structural role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schema {
    /// Image source of the only allowed tileset.
    pub tileset_image: String,
    /// Tile layer names in required order; the count is the list length.
    pub layers: Vec<String>,
    /// Object group names in required order; the count is the list length.
    pub object_groups: Vec<String>,
    /// Largest tile id accepted in any layer.
    pub max_tile_id: u8,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            tileset_image: SPRITESHEET_IMAGE.to_owned(),
            layers: vec![BACKGROUND_LAYER.to_owned(), FOREGROUND_LAYER.to_owned()],
            object_groups: vec![COLLISION_GROUP.to_owned(), SPAWN_GROUP.to_owned()],
            max_tile_id: MAX_TILE_ID,
        }
    }
}

impl Schema {
    /// Parses a schema from JSON. Omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        if schema.max_tile_id >= EMPTY_TILE {
            return Err(SchemaError::TileIdCollidesWithEmpty(schema.max_tile_id));
        }
        Ok(schema)
    }

    /// Reads and parses a schema file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&txt)
    }
}
