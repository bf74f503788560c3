//! Normalized neighbourhood infrastructure data

use geo::{Distance, Haversine, Point};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::tags;

/// OSM element identifier
pub type EntityId = i64;

/// OSM element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Way,
}

/// Node coordinates stored in the snapshot node index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub lat: f64,
    pub lon: f64,
}

impl NodePosition {
    pub fn point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Single tagged OSM element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub tags: HashMap<String, String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Member node ids (ways only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<EntityId>,
}

impl Entity {
    pub fn node<K, V>(id: EntityId, lat: f64, lon: f64, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id,
            kind: EntityKind::Node,
            tags: collect_tags(tags),
            lat: Some(lat),
            lon: Some(lon),
            refs: Vec::new(),
        }
    }

    pub fn way<K, V>(id: EntityId, tags: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id,
            kind: EntityKind::Way,
            tags: collect_tags(tags),
            lat: None,
            lon: None,
            refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_refs(mut self, refs: Vec<EntityId>) -> Self {
        self.refs = refs;
        self
    }

    #[must_use]
    pub fn with_position(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag_in(&self, key: &str, values: &[&str]) -> bool {
        self.tag(key).is_some_and(|value| values.contains(&value))
    }

    /// Own coordinates, if the element carries them
    pub fn point(&self) -> Option<Point<f64>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Point::new(lon, lat)),
            _ => None,
        }
    }
}

fn collect_tags<K, V>(tags: impl IntoIterator<Item = (K, V)>) -> HashMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
{
    tags.into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Street, crossing, sidewalk and POI data around a query location.
///
/// Built once per query by [`InfrastructureSnapshot::from_entities`] and never
/// mutated afterwards. Classification invariants:
///
/// - `streets` holds only ways whose `highway` is in [`tags::STREET_HIGHWAYS`]
/// - `pois` holds only elements passing [`tags::is_poi`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureSnapshot {
    crossings: Vec<Entity>,
    sidewalks: Vec<Entity>,
    streets: Vec<Entity>,
    pois: Vec<Entity>,
    node_index: HashMap<EntityId, NodePosition>,
}

impl InfrastructureSnapshot {
    /// Classifies raw OSM elements into a snapshot.
    ///
    /// Every node with coordinates enters the node index. Way POIs without
    /// their own coordinates receive the mean position of their member nodes.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let entities: Vec<Entity> = entities.into_iter().collect();

        let node_index: HashMap<EntityId, NodePosition> = entities
            .iter()
            .filter(|entity| entity.kind == EntityKind::Node)
            .filter_map(|entity| {
                Some((
                    entity.id,
                    NodePosition {
                        lat: entity.lat?,
                        lon: entity.lon?,
                    },
                ))
            })
            .collect();

        let mut snapshot = Self {
            node_index,
            ..Self::default()
        };

        for mut entity in entities {
            if entity.tags.is_empty() {
                continue;
            }
            if entity.kind == EntityKind::Way && entity.point().is_none() {
                if let Some(center) = snapshot.refs_centroid(&entity.refs) {
                    entity.lat = Some(center.y());
                    entity.lon = Some(center.x());
                }
            }

            if tags::is_crossing(&entity) {
                snapshot.crossings.push(entity.clone());
            }
            if tags::is_sidewalk(&entity) {
                snapshot.sidewalks.push(entity.clone());
            }
            if tags::is_street(&entity) {
                snapshot.streets.push(entity.clone());
            }
            if tags::is_poi(&entity) {
                snapshot.pois.push(entity);
            }
        }

        snapshot
    }

    pub fn crossings(&self) -> &[Entity] {
        &self.crossings
    }

    pub fn sidewalks(&self) -> &[Entity] {
        &self.sidewalks
    }

    pub fn streets(&self) -> &[Entity] {
        &self.streets
    }

    pub fn pois(&self) -> &[Entity] {
        &self.pois
    }

    pub fn node_index(&self) -> &HashMap<EntityId, NodePosition> {
        &self.node_index
    }

    pub fn is_empty(&self) -> bool {
        self.crossings.is_empty()
            && self.sidewalks.is_empty()
            && self.streets.is_empty()
            && self.pois.is_empty()
    }

    /// Position of an element: own coordinates, then node index (nodes
    /// only, way ids share the number space), then the centroid of its
    /// member nodes
    pub fn position_of(&self, entity: &Entity) -> Option<Point<f64>> {
        entity
            .point()
            .or_else(|| match entity.kind {
                EntityKind::Node => self.node_index.get(&entity.id).map(|pos| pos.point()),
                EntityKind::Way => None,
            })
            .or_else(|| self.refs_centroid(&entity.refs))
    }

    #[allow(clippy::cast_precision_loss)]
    fn refs_centroid(&self, refs: &[EntityId]) -> Option<Point<f64>> {
        let positions: Vec<NodePosition> = refs
            .iter()
            .filter_map(|id| self.node_index.get(id).copied())
            .collect();
        if positions.is_empty() {
            return None;
        }

        let count = positions.len() as f64;
        let (lat, lon) = positions
            .iter()
            .fold((0.0, 0.0), |(lat, lon), pos| (lat + pos.lat, lon + pos.lon));
        Some(Point::new(lon / count, lat / count))
    }

    /// Crops the snapshot to elements within `radius` metres of `center`.
    ///
    /// Ways are kept when any member node, or their own position, lies
    /// inside the circle.
    #[must_use]
    pub fn within_radius(&self, center: Point<f64>, radius: f64) -> Self {
        let inside = |point: Point<f64>| Haversine.distance(center, point) <= radius;

        let node_index: HashMap<EntityId, NodePosition> = self
            .node_index
            .iter()
            .filter(|(_, pos)| inside(pos.point()))
            .map(|(id, pos)| (*id, *pos))
            .collect();

        let keep = |entity: &&Entity| {
            entity.refs.iter().any(|id| node_index.contains_key(id))
                || self.position_of(entity).is_some_and(inside)
        };
        let crop = |entities: &[Entity]| -> Vec<Entity> {
            entities.iter().filter(keep).cloned().collect()
        };

        Self {
            crossings: crop(&self.crossings),
            sidewalks: crop(&self.sidewalks),
            streets: crop(&self.streets),
            pois: crop(&self.pois),
            node_index,
        }
    }
}
