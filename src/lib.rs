#![warn(missing_docs)]

//! Validates Tiled maps against a fixed structural schema and converts them
//! into compact big-endian level assets.

mod convert;
mod decode;
mod encode;
mod error;
mod ir_map;
pub mod loader;
mod output;
mod schema;
mod validate;

pub use convert::{convert, Conversion};
pub use decode::LevelAsset;
pub use encode::{encode, encoded_len};
pub use error::{ConvertError, ParseError, SchemaError, ValidationError};
pub use ir_map::{Layer, Map, MapObject, ObjectGroup, Tile, Tileset};
pub use loader::{DefaultLoader, JsonLoader, MapSource, TmxLoader};
pub use output::write_atomically;
pub use schema::{
    Schema, BACKGROUND_LAYER, COLLISION_GROUP, EMPTY_TILE, FOREGROUND_LAYER, MAX_TILE_ID,
    SPAWN_GROUP, SPRITESHEET_IMAGE,
};
pub use validate::validate;
