//! Sub-scores derived from the infrastructure snapshot alone

use geo::{Distance, Haversine, Point};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::round1;
use crate::model::{Entity, InfrastructureSnapshot, tags};

/// Assumed length of one street segment in metres
pub const STREET_SEGMENT_LENGTH: f64 = 100.0;
/// Crossing distance from the query center at which the gap score bottoms out at 5
pub const MAX_CROSSING_GAP: f64 = 200.0;

const FULL_CROSSINGS_PER_KM: f64 = 8.0;
const FULL_SIDEWALK_SHARE: f64 = 0.9;
const FULL_CONNECTIVITY_RATIO: f64 = 0.5;
const FULL_GREEN_WEIGHT: f64 = 5.0;

/// Five infrastructure sub-scores, each in `[0, 10]` with one decimal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMetrics {
    pub crossing_density: f64,
    pub sidewalk_coverage: f64,
    pub network_efficiency: f64,
    pub destination_access: f64,
    pub green_space_access: f64,
}

impl BaseMetrics {
    pub fn calculate(snapshot: &InfrastructureSnapshot, center: Point<f64>) -> Self {
        Self {
            crossing_density: crossing_density(snapshot, center),
            sidewalk_coverage: sidewalk_coverage(snapshot),
            network_efficiency: network_efficiency(snapshot),
            destination_access: destination_access(snapshot),
            green_space_access: green_space_access(snapshot),
        }
    }

    pub(crate) fn as_array(&self) -> [f64; 5] {
        [
            self.crossing_density,
            self.sidewalk_coverage,
            self.network_efficiency,
            self.destination_access,
            self.green_space_access,
        ]
    }
}

fn to_score(value: f64, full_at: f64) -> f64 {
    round1((value / full_at * 10.0).clamp(0.0, 10.0))
}

/// Mean of a crossings-per-km score and a coverage-gap score.
///
/// Street length is estimated as one [`STREET_SEGMENT_LENGTH`] per street.
/// The gap is the greatest distance from `center` to any positioned crossing;
/// when no crossing has a position only the density part is used.
#[allow(clippy::cast_precision_loss)]
pub fn crossing_density(snapshot: &InfrastructureSnapshot, center: Point<f64>) -> f64 {
    let crossings = snapshot.crossings();
    let streets = snapshot.streets();
    if crossings.is_empty() || streets.is_empty() {
        return 0.0;
    }

    let street_km = streets.len() as f64 * STREET_SEGMENT_LENGTH / 1000.0;
    let per_km = crossings.len() as f64 / street_km;
    let density_score = (per_km / FULL_CROSSINGS_PER_KM * 10.0).min(10.0);

    let gap = crossings
        .iter()
        .filter_map(|crossing| snapshot.position_of(crossing))
        .map(|position| Haversine.distance(center, position))
        .reduce(f64::max);

    let score = match gap {
        Some(gap) => {
            let gap_score = (10.0 - gap / MAX_CROSSING_GAP * 5.0).max(0.0);
            (density_score + gap_score) / 2.0
        }
        None => density_score,
    };

    round1(score.clamp(0.0, 10.0))
}

/// Share of streets tagged with a sidewalk; 90% or more scores 10
#[allow(clippy::cast_precision_loss)]
pub fn sidewalk_coverage(snapshot: &InfrastructureSnapshot) -> f64 {
    let streets = snapshot.streets();
    if streets.is_empty() {
        return 0.0;
    }

    let with_sidewalk = streets.iter().filter(|s| tags::has_sidewalk(s)).count();
    to_score(with_sidewalk as f64 / streets.len() as f64, FULL_SIDEWALK_SHARE)
}

/// Crossings per street as a connectivity proxy; a ratio of 0.5 scores 10
#[allow(clippy::cast_precision_loss)]
pub fn network_efficiency(snapshot: &InfrastructureSnapshot) -> f64 {
    let streets = snapshot.streets();
    if streets.is_empty() {
        return 0.0;
    }

    let ratio = snapshot.crossings().len() as f64 / streets.len() as f64;
    to_score(ratio, FULL_CONNECTIVITY_RATIO)
}

/// Everyday destination groups looked for among POIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationCategory {
    Education,
    Transit,
    Shopping,
    Healthcare,
    Food,
    Recreation,
}

impl DestinationCategory {
    pub const ALL: [DestinationCategory; 6] = [
        DestinationCategory::Education,
        DestinationCategory::Transit,
        DestinationCategory::Shopping,
        DestinationCategory::Healthcare,
        DestinationCategory::Food,
        DestinationCategory::Recreation,
    ];

    pub fn matches(self, poi: &Entity) -> bool {
        match self {
            DestinationCategory::Education => poi.has_tag_in(
                "amenity",
                &["school", "kindergarten", "college", "university", "library"],
            ),
            DestinationCategory::Transit => {
                poi.has_tag_in("railway", &["station", "halt", "tram_stop", "subway_entrance"])
                    || poi.has_tag_in("amenity", &["bus_station", "ferry_terminal"])
            }
            DestinationCategory::Shopping => {
                poi.tag("shop").is_some() || poi.tag("amenity") == Some("marketplace")
            }
            DestinationCategory::Healthcare => poi.has_tag_in(
                "amenity",
                &["hospital", "clinic", "doctors", "dentist", "pharmacy"],
            ),
            DestinationCategory::Food => poi.has_tag_in(
                "amenity",
                &["restaurant", "cafe", "fast_food", "bar", "pub", "food_court"],
            ),
            DestinationCategory::Recreation => {
                poi.has_tag_in(
                    "leisure",
                    &["park", "playground", "sports_centre", "pitch", "garden", "fitness_centre"],
                ) || poi.has_tag_in("amenity", &["theatre", "cinema", "community_centre"])
            }
        }
    }
}

/// Distinct destination categories present among POIs
pub fn destination_categories(snapshot: &InfrastructureSnapshot) -> Vec<DestinationCategory> {
    snapshot
        .pois()
        .iter()
        .flat_map(|poi| {
            DestinationCategory::ALL
                .into_iter()
                .filter(move |category| category.matches(poi))
        })
        .unique()
        .sorted_by_key(|category| *category as u8)
        .collect()
}

/// Number of the six destination categories present, scaled to 10
#[allow(clippy::cast_precision_loss)]
pub fn destination_access(snapshot: &InfrastructureSnapshot) -> f64 {
    let present = destination_categories(snapshot).len();
    to_score(present as f64, DestinationCategory::ALL.len() as f64)
}

/// Weight of a green-space POI, `None` for everything else
pub fn green_weight(poi: &Entity) -> Option<f64> {
    if poi.tag("landuse") == Some("forest") || poi.tag("natural") == Some("wood") {
        Some(2.0)
    } else if poi.has_tag_in("leisure", &["park", "garden"]) {
        Some(1.0)
    } else if poi.has_tag_in("leisure", &["sports_centre", "pitch", "playground"])
        || poi.has_tag_in("landuse", &["meadow", "grass"])
        || poi.tag("natural") == Some("grassland")
    {
        Some(0.5)
    } else {
        None
    }
}

/// Weighted green-space count; a weight of 5 scores 10
pub fn green_space_access(snapshot: &InfrastructureSnapshot) -> f64 {
    let weighted: f64 = snapshot.pois().iter().filter_map(green_weight).sum();
    to_score(weighted, FULL_GREEN_WEIGHT)
}
