//! Structural validation of a parsed map against a [`Schema`].

use crate::error::ValidationError;
use crate::ir_map::Map;
use crate::schema::Schema;

/// Checks `map` against `schema` and reports the first violated rule.
///
/// Rules run in a fixed order: tileset, layer count, layer names, object group
/// count, object group names, then tile id range. Nothing else about tiles or
/// objects is checked; empty groups, duplicate names and out-of-map coordinates
/// are accepted as-is.
pub fn validate(map: &Map, schema: &Schema) -> Result<(), ValidationError> {
    validate_tileset(map, schema)?;
    validate_layers(map, schema)?;
    validate_object_groups(map, schema)?;
    validate_tile_ids(map, schema)?;

    log::debug!(
        "map passed validation: {} layers, {} object groups",
        map.layers.len(),
        map.object_groups.len()
    );
    Ok(())
}

fn validate_tileset(map: &Map, schema: &Schema) -> Result<(), ValidationError> {
    let image = map.tilesets.first().and_then(|ts| ts.image_source.as_deref());
    // Wrong count and wrong image are reported as one failure.
    if map.tilesets.len() != 1 || image != Some(schema.tileset_image.as_str()) {
        return Err(ValidationError::Tileset {
            expected: schema.tileset_image.clone(),
            found_tilesets: map.tilesets.len(),
            found_image: image.map(str::to_owned),
        });
    }
    log::debug!("tileset ok: {}", schema.tileset_image);
    Ok(())
}

fn validate_layers(map: &Map, schema: &Schema) -> Result<(), ValidationError> {
    if map.layers.len() != schema.layers.len() {
        return Err(ValidationError::LayerCount {
            expected: schema.layers.clone(),
            found: map.layers.len(),
        });
    }

    for (index, (layer, expected)) in map.layers.iter().zip(&schema.layers).enumerate() {
        if layer.name != *expected {
            return Err(ValidationError::LayerName {
                index,
                expected: expected.clone(),
                found: layer.name.clone(),
            });
        }
    }
    log::debug!("tile layers ok: {:?}", schema.layers);
    Ok(())
}

fn validate_object_groups(map: &Map, schema: &Schema) -> Result<(), ValidationError> {
    if map.object_groups.len() != schema.object_groups.len() {
        return Err(ValidationError::ObjectGroupCount {
            expected: schema.object_groups.clone(),
            found: map.object_groups.len(),
        });
    }

    for (index, (group, expected)) in map
        .object_groups
        .iter()
        .zip(&schema.object_groups)
        .enumerate()
    {
        if group.name != *expected {
            return Err(ValidationError::ObjectGroupName {
                index,
                expected: expected.clone(),
                found: group.name.clone(),
            });
        }
    }
    log::debug!("object groups ok: {:?}", schema.object_groups);
    Ok(())
}

fn validate_tile_ids(map: &Map, schema: &Schema) -> Result<(), ValidationError> {
    let max = u32::from(schema.max_tile_id);
    for layer in &map.layers {
        for y in 0..map.height {
            for x in 0..map.width {
                let tile = layer.tile(x, y);
                if !tile.is_empty() && tile.id > max {
                    return Err(ValidationError::TileIdOutOfRange {
                        layer: layer.name.clone(),
                        x,
                        y,
                        id: tile.id,
                        max: schema.max_tile_id,
                    });
                }
            }
        }
    }
    log::debug!("tile ids within 0..={}", schema.max_tile_id);
    Ok(())
}
