use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{BaseAssessment, DataQuality, FusionOptions, Regime, SignalScores, fuse};
use crate::{Location, SignalKind, SignalResult, Signals, WalkabilityMetrics};

/// Signal that contributed to an update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSignal {
    pub kind: SignalKind,
    pub score: f64,
    pub raw: f64,
}

/// One published walkability snapshot of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkabilityUpdate {
    /// Generation of the query that produced this update
    pub generation: u64,
    pub location: Location,
    pub metrics: WalkabilityMetrics,
    pub data_quality: DataQuality,
    pub regime: Regime,
    pub resolved: Vec<ResolvedSignal>,
    /// Signals that failed, timed out or had no measurement
    pub failed: Vec<SignalKind>,
    /// No further update will follow for this query
    pub settled: bool,
    pub published_at: DateTime<Utc>,
}

impl WalkabilityUpdate {
    pub(crate) fn build(
        generation: u64,
        location: &Location,
        assessment: &BaseAssessment,
        signals: &Signals,
        failed: &[SignalKind],
        options: &FusionOptions,
        settled: bool,
    ) -> Self {
        let scores = SignalScores::from(signals);

        Self {
            generation,
            location: location.clone(),
            metrics: fuse(&assessment.metrics, &scores, options),
            data_quality: assessment.quality,
            regime: scores.regime(),
            resolved: SignalKind::ALL
                .into_iter()
                .filter_map(|kind| {
                    signals.get(kind).map(|SignalResult { score, raw }| ResolvedSignal {
                        kind,
                        score,
                        raw,
                    })
                })
                .collect(),
            failed: failed.to_vec(),
            settled,
            published_at: Utc::now(),
        }
    }

    /// Signal scores as known at publish time
    pub fn signal_scores(&self) -> SignalScores {
        let mut signals = Signals::default();
        for resolved in &self.resolved {
            signals.resolve(
                resolved.kind,
                SignalResult {
                    score: resolved.score,
                    raw: resolved.raw,
                },
            );
        }
        SignalScores::from(&signals)
    }
}
