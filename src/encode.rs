//! Level asset encoder.
//!
//! Layout, all integers big-endian `i32`:
//!
//! ```text
//! tile_width, width, height
//! per layer:  width * height bytes, row-major, tile id or 0xFF when empty
//! per group:  object count, then per object:
//!             name length, name bytes (no terminator), x, y, width, height
//! ```

use crate::ir_map::{Layer, Map, ObjectGroup, Tile};
use crate::schema::EMPTY_TILE;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

const HEADER_LEN: usize = 12;
const COUNT_LEN: usize = 4;
/// Name length prefix plus x, y, width, height.
const OBJECT_FIXED_LEN: usize = 4 + 16;

/// Writes `map` as a level asset.
///
/// The map must already have passed [`validate`](crate::validate); no
/// structural rule is rechecked here. Layers and object groups are written in
/// the order they are stored.
pub fn encode<W: Write>(map: &Map, sink: &mut W) -> io::Result<()> {
    sink.write_u32::<BigEndian>(map.tile_width)?;
    sink.write_u32::<BigEndian>(map.width)?;
    sink.write_u32::<BigEndian>(map.height)?;

    for layer in &map.layers {
        write_layer(map, layer, sink)?;
    }

    for group in &map.object_groups {
        write_group(group, sink)?;
    }

    log::debug!("encoded {} bytes", encoded_len(map));
    Ok(())
}

/// Exact size in bytes of the asset [`encode`] produces for `map`.
pub fn encoded_len(map: &Map) -> usize {
    let cells = map.width as usize * map.height as usize;
    let tiles = map.layers.len() * cells;
    let objects: usize = map
        .object_groups
        .iter()
        .map(|g| {
            COUNT_LEN
                + g.objects
                    .iter()
                    .map(|o| OBJECT_FIXED_LEN + o.name.len())
                    .sum::<usize>()
        })
        .sum();
    HEADER_LEN + tiles + objects
}

fn write_layer<W: Write>(map: &Map, layer: &Layer, sink: &mut W) -> io::Result<()> {
    let mut row = Vec::with_capacity(map.width as usize);
    for y in 0..map.height {
        row.clear();
        for x in 0..map.width {
            let tile = layer.tile(x, y);
            let byte = tile_byte(tile).ok_or_else(|| {
                invalid_data(format!(
                    "tile ({x}, {y}) in layer '{}' has id {} which does not fit the level format",
                    layer.name, tile.id
                ))
            })?;
            row.push(byte);
        }
        sink.write_all(&row)?;
    }
    Ok(())
}

/// `None` when the id cannot be stored without truncating or colliding with the empty byte.
fn tile_byte(tile: Tile) -> Option<u8> {
    if tile.is_empty() {
        return Some(EMPTY_TILE);
    }
    u8::try_from(tile.id).ok().filter(|&b| b != EMPTY_TILE)
}

fn write_group<W: Write>(group: &ObjectGroup, sink: &mut W) -> io::Result<()> {
    sink.write_i32::<BigEndian>(to_i32(group.objects.len(), "object count")?)?;
    for obj in &group.objects {
        let name = obj.name.as_bytes();
        sink.write_i32::<BigEndian>(to_i32(name.len(), "object name length")?)?;
        sink.write_all(name)?;
        sink.write_i32::<BigEndian>(obj.x)?;
        sink.write_i32::<BigEndian>(obj.y)?;
        sink.write_i32::<BigEndian>(obj.width)?;
        sink.write_i32::<BigEndian>(obj.height)?;
    }
    Ok(())
}

fn to_i32(n: usize, what: &str) -> io::Result<i32> {
    i32::try_from(n).map_err(|_| invalid_data(format!("{what} {n} does not fit in 32 bits")))
}

fn invalid_data(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}
