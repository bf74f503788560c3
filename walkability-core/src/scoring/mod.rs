//! Pure scoring functions: infrastructure metrics, confidence, environmental
//! signals, fusion and street-imagery assessment.

pub mod confidence;
pub mod fusion;
pub mod imagery;
pub mod metrics;
pub mod signals;

use geo::Point;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use confidence::{Confidence, DataQuality, classify_confidence};
pub use fusion::{FusionOptions, Regime, SignalScores, UnresolvedSignals, fuse, overall_score};
pub use imagery::{
    Detection, ImageryAssessment, ImageryRequest, SidewalkQuality, assess_imagery,
    assess_imagery_batch,
};
pub use metrics::{BaseMetrics, DestinationCategory};

use crate::model::InfrastructureSnapshot;

/// Rounds half away from zero to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Snapshot-derived part of an assessment, computed once per query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseAssessment {
    pub metrics: BaseMetrics,
    pub quality: DataQuality,
}

impl BaseAssessment {
    pub fn new(snapshot: &InfrastructureSnapshot, center: Point<f64>) -> Self {
        Self {
            metrics: BaseMetrics::calculate(snapshot, center),
            quality: DataQuality::assess(snapshot),
        }
    }
}

/// Evaluates many snapshots in parallel
pub fn assess_many(inputs: &[(InfrastructureSnapshot, Point<f64>)]) -> Vec<BaseAssessment> {
    inputs
        .par_iter()
        .map(|(snapshot, center)| BaseAssessment::new(snapshot, *center))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Label};

    #[test]
    fn round1_is_half_up_for_scores() {
        assert_eq!(round1(7.25), 7.3);
        assert_eq!(round1(7.24), 7.2);
        assert_eq!(round1(0.05), 0.1);
        assert_eq!(round1(10.0), 10.0);
    }

    #[test]
    fn empty_snapshot_assessment() {
        let assessment = BaseAssessment::new(&InfrastructureSnapshot::default(), Point::new(0.0, 0.0));
        assert_eq!(assessment.metrics, BaseMetrics::default());
        assert_eq!(assessment.quality.confidence, Confidence::Low);

        let metrics = fuse(
            &assessment.metrics,
            &SignalScores::default(),
            &FusionOptions::default(),
        );
        assert_eq!(metrics.overall_score, 0.0);
        assert_eq!(metrics.label, Label::Critical);
    }

    #[test]
    fn dense_neighbourhood_is_high_confidence() {
        let mut entities: Vec<Entity> = (0..80)
            .map(|i| Entity::way(i, [("highway", "residential")]))
            .collect();
        entities.extend((100..115).map(|i| Entity::node(i, 0.0, 0.0, [("highway", "crossing")])));
        entities.extend((200..225).map(|i| Entity::node(i, 0.0, 0.0, [("amenity", "cafe")])));
        let snapshot = InfrastructureSnapshot::from_entities(entities);

        let assessment = BaseAssessment::new(&snapshot, Point::new(0.0, 0.0));
        assert_eq!(assessment.quality.street_count, 80);
        assert_eq!(assessment.quality.crossing_count, 15);
        assert_eq!(assessment.quality.poi_count, 25);
        assert_eq!(assessment.quality.confidence, Confidence::High);
    }

    #[test]
    fn assess_many_keeps_order() {
        let dense = InfrastructureSnapshot::from_entities(
            (0..10).map(|i| Entity::way(i, [("highway", "residential"), ("sidewalk", "both")])),
        );
        let inputs = vec![
            (InfrastructureSnapshot::default(), Point::new(0.0, 0.0)),
            (dense, Point::new(0.0, 0.0)),
        ];
        let results = assess_many(&inputs);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].metrics.sidewalk_coverage, 0.0);
        assert_eq!(results[1].metrics.sidewalk_coverage, 10.0);
    }
}
