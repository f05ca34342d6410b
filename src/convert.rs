//! The map-to-level pipeline: parse, validate, then stage and write.

use crate::encode::encode;
use crate::error::ConvertError;
use crate::loader::MapSource;
use crate::output::write_atomically;
use crate::schema::Schema;
use crate::validate::validate;
use std::path::Path;

/// What a successful conversion produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    /// Size of the written level asset.
    pub bytes: u64,
    /// Tile layers encoded.
    pub layers: usize,
    /// Object groups encoded.
    pub object_groups: usize,
    /// Objects across all groups.
    pub objects: usize,
}

/// Converts the map at `input` into a level asset at `output`.
///
/// The output file is only touched once the map has parsed and validated; a
/// failure while writing leaves any previous file at `output` in place.
pub fn convert(
    source: &dyn MapSource,
    input: &Path,
    output: &Path,
    schema: &Schema,
) -> Result<Conversion, ConvertError> {
    log::info!("parsing map file {}", input.display());
    let map = source.parse(input)?;

    log::info!("validating map structure");
    validate(&map, schema)?;

    log::info!("writing level asset {}", output.display());
    let bytes = write_atomically(output, |w| encode(&map, w)).map_err(|source| {
        ConvertError::Io {
            path: output.to_path_buf(),
            source,
        }
    })?;

    Ok(Conversion {
        bytes,
        layers: map.layers.len(),
        object_groups: map.object_groups.len(),
        objects: map.object_count(),
    })
}
