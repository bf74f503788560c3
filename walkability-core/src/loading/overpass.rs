use hashbrown::HashMap;
use serde::Deserialize;

use crate::{Entity, EntityId, Error, InfrastructureSnapshot};

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: EntityId,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Way {
        id: EntityId,
        #[serde(default)]
        nodes: Vec<EntityId>,
        #[serde(default)]
        tags: HashMap<String, String>,
        center: Option<LatLon>,
    },
    #[serde(other)]
    Other,
}

/// Parses the `elements` array of an Overpass API JSON response.
/// Relations and other element types are skipped.
///
/// # Errors
///
/// Returns an error if the document is not valid Overpass JSON
pub fn parse_overpass_elements(json: &str) -> Result<Vec<Entity>, Error> {
    let response: OverpassResponse = serde_json::from_str(json)?;

    let entities = response
        .elements
        .into_iter()
        .filter_map(|element| match element {
            OverpassElement::Node { id, lat, lon, tags } => {
                Some(Entity::node(id, lat, lon, tags))
            }
            OverpassElement::Way {
                id,
                nodes,
                tags,
                center,
            } => {
                let way = Entity::way(id, tags).with_refs(nodes);
                Some(match center {
                    Some(center) => way.with_position(center.lat, center.lon),
                    None => way,
                })
            }
            OverpassElement::Other => None,
        })
        .collect();

    Ok(entities)
}

/// Builds a snapshot from an Overpass API JSON response
///
/// # Errors
///
/// Returns an error if the document is not valid Overpass JSON
pub fn snapshot_from_overpass(json: &str) -> Result<InfrastructureSnapshot, Error> {
    let entities = parse_overpass_elements(json)?;
    log::debug!("Parsed {} Overpass elements", entities.len());
    Ok(InfrastructureSnapshot::from_entities(entities))
}
