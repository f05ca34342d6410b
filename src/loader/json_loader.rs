// src/loader/json_loader.rs
use super::MapSource;
use crate::error::ParseError;
use crate::ir_map::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const FLIP_H: u32 = 0x8000_0000; // bit 31
const FLIP_V: u32 = 0x4000_0000; // bit 30
const FLIP_D: u32 = 0x2000_0000; // bit 29
const GID_MASK: u32 = !(FLIP_H | FLIP_V | FLIP_D);

/// Loads Tiled JSON maps (`.json` / `.tmj`).
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl MapSource for JsonLoader {
    fn parse(&self, path: &Path) -> Result<Map, ParseError> {
        decode_map_file(path)
    }
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    #[serde(default)]
    infinite: bool,
    #[serde(default)]
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" | "objectgroup" | "imagelayer" | "group"
    data: Option<JsonLayerData>,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    /// External tileset file, relative to the map.
    source: Option<String>,
    #[serde(default)]
    name: String,
    image: Option<String>,
    tilecount: Option<u32>,
}

#[derive(Deserialize)]
struct ExternalTileset {
    #[serde(default)]
    name: String,
    image: Option<String>,
    tilecount: Option<u32>,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
}

/// Range of gids one tileset covers; `tilecount == None` leaves it open-ended.
struct GidRange {
    first_gid: u32,
    tilecount: Option<u32>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ParseError> {
    let txt = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| ParseError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Image path of an external tileset, re-rooted at the map directory.
fn image_relative_to_map(tileset_source: &str, image: &str) -> String {
    let joined = match Path::new(tileset_source).parent() {
        Some(dir) => dir.join(image),
        None => PathBuf::from(image),
    };
    joined.to_string_lossy().replace('\\', "/")
}

fn load_tileset(
    ts: JsonTilesetRef,
    map_dir: &Path,
) -> Result<(Tileset, GidRange), ParseError> {
    let Some(source) = ts.source else {
        return Ok((
            Tileset {
                name: ts.name,
                image_source: ts.image,
            },
            GidRange {
                first_gid: ts.firstgid,
                tilecount: ts.tilecount,
            },
        ));
    };

    let ext = Path::new(&source).extension().and_then(|e| e.to_str());
    if !matches!(ext, Some("json") | Some("tsj")) {
        return Err(ParseError::InvalidMap(format!(
            "External tileset must be JSON: {source}"
        )));
    }
    let ext: ExternalTileset = read_json(&map_dir.join(&source))?;
    Ok((
        Tileset {
            name: ext.name,
            image_source: ext.image.map(|img| image_relative_to_map(&source, &img)),
        },
        GidRange {
            first_gid: ts.firstgid,
            tilecount: ext.tilecount,
        },
    ))
}

fn resolve_gid(ranges: &[GidRange], layer: &str, raw_gid: u32) -> Result<Tile, ParseError> {
    let gid = raw_gid & GID_MASK;
    if gid == 0 {
        return Ok(Tile::EMPTY);
    }

    let owner = ranges
        .iter()
        .enumerate()
        .filter(|(_, r)| r.first_gid <= gid)
        .max_by_key(|(_, r)| r.first_gid)
        .filter(|(_, r)| r.tilecount.map_or(true, |count| gid - r.first_gid < count));

    match owner {
        Some((index, range)) => Ok(Tile::new(index, gid - range.first_gid)),
        None => Err(ParseError::InvalidTileGid {
            layer: layer.to_owned(),
            gid,
            max_gid: ranges
                .iter()
                .map(|r| {
                    r.first_gid
                        .saturating_add(r.tilecount.unwrap_or(1))
                        .saturating_sub(1)
                })
                .max()
                .unwrap_or(0),
        }),
    }
}

fn object_from_json(obj: JsonObject) -> MapObject {
    // Float attributes are truncated toward zero.
    MapObject {
        name: obj.name,
        x: obj.x as i32,
        y: obj.y as i32,
        width: obj.width as i32,
        height: obj.height as i32,
    }
}

/// Reads a Tiled JSON map and its external JSON tilesets.
pub fn decode_map_file(p: &Path) -> Result<Map, ParseError> {
    let j: JsonMap = read_json(p)?;
    if j.infinite {
        return Err(ParseError::InvalidMap(format!(
            "infinite maps are not supported: {}",
            p.display()
        )));
    }

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let mut tilesets = Vec::with_capacity(j.tilesets.len());
    let mut ranges = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let (tileset, range) = load_tileset(ts, &map_dir)?;
        tilesets.push(tileset);
        ranges.push(range);
    }

    let cells = j.width as usize * j.height as usize;
    let mut layers = Vec::new();
    let mut object_groups = Vec::new();
    for l in j.layers {
        match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {
                let gids = match l.data {
                    Some(JsonLayerData::Gids(gids)) => gids,
                    Some(JsonLayerData::Encoded(_)) => {
                        return Err(ParseError::InvalidMap(format!(
                            "layer '{}' uses an encoded data string; save the map with CSV layer format",
                            l.name
                        )));
                    }
                    None => Vec::new(),
                };
                if gids.len() != cells {
                    return Err(ParseError::InvalidLayerSize {
                        layer: l.name,
                        expected: cells,
                        found: gids.len(),
                    });
                }
                let tiles = gids
                    .iter()
                    .map(|&gid| resolve_gid(&ranges, &l.name, gid))
                    .collect::<Result<Vec<_>, _>>()?;
                layers.push(Layer {
                    name: l.name,
                    width: j.width,
                    height: j.height,
                    tiles,
                });
            }
            "objectgroup" => object_groups.push(ObjectGroup {
                name: l.name,
                objects: l.objects.into_iter().map(object_from_json).collect(),
            }),
            other => log::warn!("skipping {other} layer '{}'", l.name),
        }
    }

    log::debug!(
        "decoded {}: {} tilesets, {} tile layers, {} object groups",
        p.display(),
        tilesets.len(),
        layers.len(),
        object_groups.len()
    );

    Ok(Map {
        tile_width: j.tilewidth,
        width: j.width,
        height: j.height,
        tilesets,
        layers,
        object_groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const SCENARIO_JSON: &str = r#"{
      "width": 2,
      "height": 1,
      "tilewidth": 16,
      "tileheight": 16,
      "orientation": "orthogonal",
      "tilesets": [
        {"firstgid": 1, "name": "sprites", "image": "spritesheet.png", "tilecount": 64, "columns": 8}
      ],
      "layers": [
        {"type": "tilelayer", "name": "Background", "width": 2, "height": 1, "data": [0, 6]},
        {"type": "tilelayer", "name": "Foreground", "width": 2, "height": 1, "data": [0, 0]},
        {"type": "objectgroup", "name": "Collision", "objects": []},
        {"type": "objectgroup", "name": "Spawn", "objects": [
          {"id": 1, "name": "P1", "x": 10, "y": 20.75, "width": 8, "height": 8}
        ]}
      ]
    }"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    #[test]
    fn parses_embedded_tileset_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(dir.path(), "map.json", SCENARIO_JSON);

        let map = decode_map_file(&map_path).expect("decode");

        assert_eq!((map.tile_width, map.width, map.height), (16, 2, 1));
        assert_eq!(map.tilesets[0].image_source.as_deref(), Some("spritesheet.png"));
        assert_eq!(map.layers[0].tiles, vec![Tile::EMPTY, Tile::new(0, 5)]);
        assert_eq!(map.layers[1].tiles, vec![Tile::EMPTY, Tile::EMPTY]);
        assert_eq!(map.object_groups[0].name, "Collision");
        assert_eq!(
            map.object_groups[1].objects,
            vec![MapObject::new("P1", 10, 20, 8, 8)]
        );
    }

    #[test]
    fn resolves_gids_across_tilesets_and_masks_flip_flags() {
        let ranges = [
            GidRange { first_gid: 1, tilecount: Some(4) },
            GidRange { first_gid: 5, tilecount: Some(10) },
        ];
        assert_eq!(resolve_gid(&ranges, "L", 4).unwrap(), Tile::new(0, 3));
        assert_eq!(resolve_gid(&ranges, "L", 5).unwrap(), Tile::new(1, 0));
        assert_eq!(resolve_gid(&ranges, "L", 7 | FLIP_H | FLIP_D).unwrap(), Tile::new(1, 2));
        assert!(matches!(
            resolve_gid(&ranges, "L", 15),
            Err(ParseError::InvalidTileGid { gid: 15, max_gid: 14, .. })
        ));
    }

    #[test]
    fn external_tileset_image_is_relative_to_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("tiles")).expect("mkdir");
        write(
            dir.path(),
            "tiles/sprites.tsj",
            r#"{"name": "sprites", "image": "spritesheet.png", "tilecount": 16}"#,
        );
        let map_path = write(
            dir.path(),
            "map.json",
            r#"{"width": 1, "height": 1, "tilewidth": 8,
                "tilesets": [{"firstgid": 1, "source": "tiles/sprites.tsj"}],
                "layers": [{"type": "tilelayer", "name": "Background", "data": [16]}]}"#,
        );

        let map = decode_map_file(&map_path).expect("decode");
        assert_eq!(map.tilesets[0].name, "sprites");
        assert_eq!(
            map.tilesets[0].image_source.as_deref(),
            Some("tiles/spritesheet.png")
        );
        assert_eq!(map.layers[0].tiles, vec![Tile::new(0, 15)]);
    }

    #[test]
    fn skips_image_and_group_layers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(
            dir.path(),
            "map.json",
            r#"{"width": 1, "height": 1, "tilewidth": 8, "tilesets": [],
                "layers": [
                  {"type": "imagelayer", "name": "Sky", "image": "sky.png"},
                  {"type": "group", "name": "Folder", "layers": []},
                  {"type": "tilelayer", "name": "Background", "data": [0]}
                ]}"#,
        );

        let map = decode_map_file(&map_path).expect("decode");
        assert_eq!(map.layers.len(), 1);
        assert!(map.object_groups.is_empty());
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(dir.path(), "map.json", "{ not json");

        let err = decode_map_file(&map_path).unwrap_err();
        assert!(matches!(err, ParseError::Json { .. }));
        assert_eq!(err.code(), 2);
    }

    #[test]
    fn returns_typed_error_for_missing_tileset_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(
            dir.path(),
            "map.json",
            r#"{"width": 1, "height": 1, "tilewidth": 8, "layers": [],
                "tilesets": [{"firstgid": 1, "source": "missing_tileset.json"}]}"#,
        );

        let err = decode_map_file(&map_path).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn rejects_tsx_tileset_from_json_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(
            dir.path(),
            "map.json",
            r#"{"width": 1, "height": 1, "tilewidth": 8, "layers": [],
                "tilesets": [{"firstgid": 1, "source": "sprites.tsx"}]}"#,
        );

        let err = decode_map_file(&map_path).unwrap_err();
        assert!(matches!(err, ParseError::InvalidMap(_)));
    }

    #[test]
    fn error_on_layer_size_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(
            dir.path(),
            "map.json",
            r#"{"width": 2, "height": 2, "tilewidth": 8, "tilesets": [],
                "layers": [{"type": "tilelayer", "name": "oops", "data": [0, 0, 0]}]}"#,
        );

        let err = decode_map_file(&map_path).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidLayerSize { ref layer, expected: 4, found: 3 } if layer == "oops"
        ));
    }

    #[test]
    fn rejects_encoded_layer_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let map_path = write(
            dir.path(),
            "map.json",
            r#"{"width": 1, "height": 1, "tilewidth": 8, "tilesets": [],
                "layers": [{"type": "tilelayer", "name": "Background",
                            "encoding": "base64", "data": "AAAAAA=="}]}"#,
        );

        let err = decode_map_file(&map_path).unwrap_err();
        assert!(matches!(err, ParseError::InvalidMap(_)));
    }

    #[test]
    fn gid_bound_saturates_for_huge_firstgid() {
        let ranges = [GidRange {
            first_gid: u32::MAX - 1,
            tilecount: Some(10),
        }];

        let err = resolve_gid(&ranges, "L", 5).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTileGid { gid: 5, max_gid, .. } if max_gid == u32::MAX - 1
        ));
    }
}
