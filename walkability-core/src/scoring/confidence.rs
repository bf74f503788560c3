//! Data completeness classification

use serde::{Deserialize, Serialize};

use crate::model::InfrastructureSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

/// Hard three-tier classifier on element counts
pub fn classify_confidence(street_count: usize, crossing_count: usize, poi_count: usize) -> Confidence {
    if street_count > 50 && crossing_count > 10 && poi_count > 20 {
        Confidence::High
    } else if street_count > 20 && crossing_count > 5 && poi_count > 10 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Element counts of a snapshot and the resulting confidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub crossing_count: usize,
    pub street_count: usize,
    pub sidewalk_count: usize,
    pub poi_count: usize,
    pub confidence: Confidence,
}

impl DataQuality {
    pub fn assess(snapshot: &InfrastructureSnapshot) -> Self {
        let crossing_count = snapshot.crossings().len();
        let street_count = snapshot.streets().len();
        let poi_count = snapshot.pois().len();

        Self {
            crossing_count,
            street_count,
            sidewalk_count: snapshot.sidewalks().len(),
            poi_count,
            confidence: classify_confidence(street_count, crossing_count, poi_count),
        }
    }
}
