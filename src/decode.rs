//! Reader for level assets, the engine-side view of the format.

use crate::ir_map::MapObject;
use crate::schema::{Schema, EMPTY_TILE};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};

/// A decoded level asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelAsset {
    /// Tile edge in pixels.
    pub tile_width: u32,
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// One row-major grid per layer; `None` marks an empty cell.
    pub layers: Vec<Vec<Option<u8>>>,
    /// Objects of each group in stored order.
    pub object_groups: Vec<Vec<MapObject>>,
}

impl LevelAsset {
    /// Decodes an asset written under `schema`.
    ///
    /// The format stores neither the layer count nor the group count, so both
    /// come from the schema. Trailing bytes after the last group are an error.
    pub fn read<R: Read>(reader: &mut R, schema: &Schema) -> io::Result<Self> {
        let tile_width = reader.read_u32::<BigEndian>()?;
        let width = reader.read_u32::<BigEndian>()?;
        let height = reader.read_u32::<BigEndian>()?;
        let cells = width as usize * height as usize;

        let mut layers = Vec::with_capacity(schema.layers.len());
        for _ in &schema.layers {
            let mut raw = vec![0u8; cells];
            reader.read_exact(&mut raw)?;
            layers.push(
                raw.into_iter()
                    .map(|b| (b != EMPTY_TILE).then_some(b))
                    .collect(),
            );
        }

        let mut object_groups = Vec::with_capacity(schema.object_groups.len());
        for _ in &schema.object_groups {
            let count = read_len(reader, "object count")?;
            let mut objects = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                objects.push(read_object(reader)?);
            }
            object_groups.push(objects);
        }

        let mut rest = [0u8; 1];
        if reader.read(&mut rest)? != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "trailing bytes after the last object group",
            ));
        }

        Ok(LevelAsset {
            tile_width,
            width,
            height,
            layers,
            object_groups,
        })
    }
}

fn read_object<R: Read>(reader: &mut R) -> io::Result<MapObject> {
    let len = read_len(reader, "object name length")?;
    let mut name = vec![0u8; len];
    reader.read_exact(&mut name)?;
    let name = String::from_utf8(name)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(MapObject {
        name,
        x: reader.read_i32::<BigEndian>()?,
        y: reader.read_i32::<BigEndian>()?,
        width: reader.read_i32::<BigEndian>()?,
        height: reader.read_i32::<BigEndian>()?,
    })
}

fn read_len<R: Read>(reader: &mut R, what: &str) -> io::Result<usize> {
    let n = reader.read_i32::<BigEndian>()?;
    usize::try_from(n)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, format!("negative {what} {n}")))
}
