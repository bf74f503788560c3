//! This module turns external OSM payloads (Overpass API responses,
//! GeoJSON exports) into infrastructure snapshots.

mod geojson_export;
mod overpass;

pub use geojson_export::{load_geojson_snapshot, snapshot_from_geojson};
pub use overpass::{parse_overpass_elements, snapshot_from_overpass};
