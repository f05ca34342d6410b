use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning map markup into a [`Map`](crate::Map).
#[derive(Debug, Error)]
pub enum ParseError {
    /// The map or one of its tileset files could not be read
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        /// File that failed to open
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// JSON parse error
    #[error("malformed JSON in {}: {source}", .path.display())]
    Json {
        /// File being parsed
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },
    /// TMX/TSX parse error reported by the `tiled` crate
    #[error("malformed TMX in {}: {source}", .path.display())]
    Tmx {
        /// File being parsed
        path: PathBuf,
        /// Underlying parser error
        source: tiled::Error,
    },
    /// Unsupported file extension
    #[error("unsupported map format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Structurally unusable map content
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// A layer's data length does not match width * height
    #[error("layer '{layer}' has {found} cells, expected {expected}")]
    InvalidLayerSize {
        /// Layer name
        layer: String,
        /// width * height
        expected: usize,
        /// Cells actually present
        found: usize,
    },
    /// A tile references a gid outside every tileset
    #[error("layer '{layer}' references tile gid {gid} outside every tileset (max {max_gid})")]
    InvalidTileGid {
        /// Layer name
        layer: String,
        /// Offending gid with flip flags cleared
        gid: u32,
        /// Highest gid covered by a tileset
        max_gid: u32,
    },
}

impl ParseError {
    /// Numeric error code: 1 = cannot open, 2 = malformed markup, 3 = invalid content.
    pub fn code(&self) -> u8 {
        match self {
            ParseError::Io { .. } => 1,
            ParseError::Json { .. } | ParseError::Tmx { .. } => 2,
            ParseError::UnsupportedFormat(_)
            | ParseError::InvalidMap(_)
            | ParseError::InvalidLayerSize { .. }
            | ParseError::InvalidTileGid { .. } => 3,
        }
    }
}

/// The first structural rule a map violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Wrong tileset count, or the single tileset uses the wrong image
    #[error("map has to have a single tileset called {expected} (found {found_tilesets} tileset(s){})",
        image_suffix(.found_image))]
    Tileset {
        /// Required image source
        expected: String,
        /// Number of tilesets in the map
        found_tilesets: usize,
        /// Image of the first tileset, if any
        found_image: Option<String>,
    },
    /// Wrong number of tile layers
    #[error("map has to have exactly {} tile layers ({}), found {found}", .expected.len(), .expected.join(" & "))]
    LayerCount {
        /// Required layer names, in order
        expected: Vec<String>,
        /// Layers in the map
        found: usize,
    },
    /// A tile layer at a fixed position has the wrong name
    #[error("tile layer {} must be named '{expected}', found '{found}'", .index + 1)]
    LayerName {
        /// Zero-based layer position
        index: usize,
        /// Required name
        expected: String,
        /// Actual name
        found: String,
    },
    /// Wrong number of object groups
    #[error("map has to have exactly {} object groups ({}), found {found}", .expected.len(), .expected.join(" & "))]
    ObjectGroupCount {
        /// Required group names, in order
        expected: Vec<String>,
        /// Groups in the map
        found: usize,
    },
    /// An object group at a fixed position has the wrong name
    #[error("object group {} must be named '{expected}', found '{found}'", .index + 1)]
    ObjectGroupName {
        /// Zero-based group position
        index: usize,
        /// Required name
        expected: String,
        /// Actual name
        found: String,
    },
    /// A placed tile id does not fit in the single-byte tile encoding
    #[error("tile ({x}, {y}) in layer '{layer}' has id {id}, the level format stores at most {max}")]
    TileIdOutOfRange {
        /// Layer name
        layer: String,
        /// Column
        x: u32,
        /// Row
        y: u32,
        /// Offending tileset-local id
        id: u32,
        /// Largest storable id
        max: u8,
    },
}

fn image_suffix(image: &Option<String>) -> String {
    match image {
        Some(img) => format!(", image '{img}'"),
        None => String::new(),
    }
}

/// Errors from loading a schema configuration file.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read
    #[error("cannot read schema {}: {source}", .path.display())]
    Io {
        /// Schema path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The schema is not valid JSON for [`Schema`](crate::Schema)
    #[error("malformed schema: {0}")]
    Json(#[from] serde_json::Error),
    /// `max_tile_id` would collide with the empty-cell byte
    #[error("max_tile_id {0} collides with the empty tile byte 0xFF")]
    TileIdCollidesWithEmpty(u8),
}

/// Errors from a whole map-to-level conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The map could not be parsed
    #[error("map parser error {}: {}", .0.code(), .0)]
    Parse(#[from] ParseError),
    /// The map violates the schema
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The level asset could not be written
    #[error("cannot write level asset {}: {source}", .path.display())]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_rule() {
        let err = ValidationError::Tileset {
            expected: "spritesheet.png".into(),
            found_tilesets: 2,
            found_image: None,
        };
        assert_eq!(
            err.to_string(),
            "map has to have a single tileset called spritesheet.png (found 2 tileset(s))"
        );

        let err = ValidationError::LayerCount {
            expected: vec!["Background".into(), "Foreground".into()],
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "map has to have exactly 2 tile layers (Background & Foreground), found 1"
        );

        let err = ValidationError::ObjectGroupName {
            index: 0,
            expected: "Collision".into(),
            found: "Walls".into(),
        };
        assert_eq!(
            err.to_string(),
            "object group 1 must be named 'Collision', found 'Walls'"
        );
    }

    #[test]
    fn parse_errors_carry_codes() {
        let err = ConvertError::from(ParseError::InvalidMap("no layers".into()));
        assert_eq!(err.to_string(), "map parser error 3: invalid map: no layers");

        let err = ParseError::Io {
            path: PathBuf::from("missing.tmx"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.code(), 1);
    }
}
