// src/loader/tmx_loader.rs
use super::MapSource;
use crate::error::ParseError;
use crate::ir_map::*;
use std::path::Path;
use tiled::{LayerType, ObjectShape};

/// Loads TMX maps through the `tiled` crate.
///
/// Tile layers become [`Map::layers`] and object layers become
/// [`Map::object_groups`], each in document order. Image and group layers are
/// skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct TmxLoader;

impl MapSource for TmxLoader {
    fn parse(&self, path: &Path) -> Result<Map, ParseError> {
        std::fs::metadata(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut loader = tiled::Loader::new();
        let tmx = loader.load_tmx_map(path).map_err(|source| ParseError::Tmx {
            path: path.to_path_buf(),
            source,
        })?;

        let map_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let tilesets = tmx
            .tilesets()
            .iter()
            .map(|ts| Tileset {
                name: ts.name.clone(),
                image_source: ts
                    .image
                    .as_ref()
                    .map(|img| relative_to(&img.source, map_dir)),
            })
            .collect::<Vec<_>>();

        let mut layers = Vec::new();
        let mut object_groups = Vec::new();
        for layer in tmx.layers() {
            match layer.layer_type() {
                LayerType::Tiles(tile_layer) => {
                    let mut out = Layer::empty(layer.name.clone(), tmx.width, tmx.height);
                    for y in 0..tmx.height {
                        for x in 0..tmx.width {
                            if let Some(tile) = tile_layer.get_tile(x as i32, y as i32) {
                                out.set(x, y, Tile::new(tile.tileset_index(), tile.id()));
                            }
                        }
                    }
                    layers.push(out);
                }
                LayerType::Objects(object_layer) => object_groups.push(ObjectGroup {
                    name: layer.name.clone(),
                    objects: object_layer
                        .objects()
                        .map(|obj| {
                            let (width, height) = shape_extent(&obj.shape);
                            // Float attributes are truncated toward zero.
                            MapObject {
                                name: obj.name.clone(),
                                x: obj.x as i32,
                                y: obj.y as i32,
                                width: width as i32,
                                height: height as i32,
                            }
                        })
                        .collect(),
                }),
                _ => log::warn!("skipping non-tile, non-object layer '{}'", layer.name),
            }
        }

        log::debug!(
            "decoded {}: {} tilesets, {} tile layers, {} object groups",
            path.display(),
            tilesets.len(),
            layers.len(),
            object_groups.len()
        );

        Ok(Map {
            tile_width: tmx.tile_width,
            width: tmx.width,
            height: tmx.height,
            tilesets,
            layers,
            object_groups,
        })
    }
}

/// `tiled` resolves image sources against the tileset's directory; report them
/// relative to the map instead, with `/` separators.
fn relative_to(source: &Path, map_dir: &Path) -> String {
    let rel = source.strip_prefix(map_dir).unwrap_or(source);
    rel.to_string_lossy().replace('\\', "/")
}

fn shape_extent(shape: &ObjectShape) -> (f32, f32) {
    match shape {
        ObjectShape::Rect { width, height } | ObjectShape::Ellipse { width, height } => {
            (*width, *height)
        }
        ObjectShape::Text { width, height, .. } => (*width, *height),
        _ => (0.0, 0.0),
    }
}
