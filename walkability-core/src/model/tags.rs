//! OSM tag classification rules shared by all snapshot builders

use super::snapshot::{Entity, EntityKind};

/// `highway` values counted as walkable street segments
pub const STREET_HIGHWAYS: [&str; 6] = [
    "primary",
    "secondary",
    "tertiary",
    "residential",
    "living_street",
    "pedestrian",
];

pub const POI_RAILWAY: [&str; 4] = ["station", "halt", "tram_stop", "subway_entrance"];
pub const POI_LANDUSE: [&str; 5] = [
    "forest",
    "meadow",
    "grass",
    "recreation_ground",
    "village_green",
];
pub const POI_NATURAL: [&str; 2] = ["wood", "grassland"];

pub fn is_street(entity: &Entity) -> bool {
    entity.kind == EntityKind::Way && entity.has_tag_in("highway", &STREET_HIGHWAYS)
}

pub fn is_crossing(entity: &Entity) -> bool {
    entity.kind == EntityKind::Node
        && (entity.tag("highway") == Some("crossing") || entity.tag("crossing").is_some())
}

pub fn is_sidewalk(entity: &Entity) -> bool {
    entity.kind == EntityKind::Way && entity.tag("footway") == Some("sidewalk")
}

pub fn is_poi(entity: &Entity) -> bool {
    entity.tag("amenity").is_some()
        || entity.tag("shop").is_some()
        || entity.tag("leisure").is_some()
        || entity.has_tag_in("railway", &POI_RAILWAY)
        || entity.has_tag_in("landuse", &POI_LANDUSE)
        || entity.has_tag_in("natural", &POI_NATURAL)
}

/// Whether a street segment carries a usable sidewalk tag
pub fn has_sidewalk(street: &Entity) -> bool {
    street
        .tag("sidewalk")
        .is_some_and(|value| value != "no" && value != "none")
}
