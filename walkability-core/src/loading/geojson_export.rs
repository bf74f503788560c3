//! GeoJSON exports of OSM data (e.g. overpass turbo "Export → GeoJSON")

use std::path::Path;

use geo::{Centroid, Geometry};
use geojson::{Feature, FeatureCollection, GeoJson, feature::Id};
use log::{debug, info};

use crate::{Entity, EntityId, EntityKind, Error, InfrastructureSnapshot};

/// Builds a snapshot from a GeoJSON feature collection.
///
/// String properties become tags (keys starting with `@` are skipped).
/// Feature ids of the form `node/123` or `way/45` set the element type
/// and id; otherwise points are nodes, other geometries ways, and ids are
/// assigned sequentially from -1 downwards.
///
/// # Errors
///
/// Returns an error if a geometry cannot be converted
pub fn snapshot_from_geojson(collection: FeatureCollection) -> Result<InfrastructureSnapshot, Error> {
    let mut synthetic_id: EntityId = 0;
    let mut entities = Vec::with_capacity(collection.features.len());

    for feature in collection.features {
        if let Some(entity) = feature_to_entity(feature, &mut synthetic_id)? {
            entities.push(entity);
        }
    }

    debug!("Converted {} GeoJSON features", entities.len());
    Ok(InfrastructureSnapshot::from_entities(entities))
}

/// Reads a GeoJSON file from disk and builds a snapshot from it
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not GeoJSON, or is not a
/// `FeatureCollection`
pub fn load_geojson_snapshot(path: &Path) -> Result<InfrastructureSnapshot, Error> {
    info!("Loading infrastructure from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    let geojson: GeoJson = content
        .parse()
        .map_err(|e: geojson::Error| Error::InvalidData(e.to_string()))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => snapshot_from_geojson(collection),
        _ => Err(Error::InvalidData(format!(
            "Expected a FeatureCollection in {}",
            path.display()
        ))),
    }
}

fn parse_osm_id(raw: &str) -> Option<(EntityKind, EntityId)> {
    let (kind, id) = raw.split_once('/')?;
    let kind = match kind {
        "node" => EntityKind::Node,
        "way" => EntityKind::Way,
        _ => return None,
    };
    Some((kind, id.parse().ok()?))
}

fn feature_to_entity(feature: Feature, synthetic_id: &mut EntityId) -> Result<Option<Entity>, Error> {
    let Some(geometry) = feature.geometry else {
        return Ok(None);
    };
    let geometry = Geometry::<f64>::try_from(geometry)
        .map_err(|e| Error::InvalidData(format!("Unsupported GeoJSON geometry: {e}")))?;
    let Some(position) = geometry.centroid() else {
        return Ok(None);
    };

    let properties = feature.properties.unwrap_or_default();
    let declared = match &feature.id {
        Some(Id::String(raw)) => parse_osm_id(raw),
        _ => None,
    }
    .or_else(|| {
        properties
            .get("@id")
            .and_then(|value| value.as_str())
            .and_then(parse_osm_id)
    });

    let (kind, id) = declared.unwrap_or_else(|| {
        *synthetic_id -= 1;
        let kind = if matches!(geometry, Geometry::Point(_)) {
            EntityKind::Node
        } else {
            EntityKind::Way
        };
        (kind, *synthetic_id)
    });

    let tags = properties
        .iter()
        .filter(|(key, _)| !key.starts_with('@'))
        .filter_map(|(key, value)| value.as_str().map(|v| (key.clone(), v.to_string())));

    let entity = match kind {
        EntityKind::Node => Entity::node(id, position.y(), position.x(), tags),
        EntityKind::Way => Entity::way(id, tags).with_position(position.y(), position.x()),
    };
    Ok(Some(entity))
}
