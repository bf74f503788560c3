//! Signal results and the published walkability metrics

use std::fmt;

use serde::{Deserialize, Serialize};

/// Independently sourced environmental signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Terrain slope in degrees
    Slope,
    /// Vegetation index on a 0..1 scale
    TreeCanopy,
    /// Surface temperature in °C
    SurfaceTemp,
    /// PM2.5 concentration in µg/m³
    AirQuality,
    /// Urban heat-island delta in °C
    HeatIsland,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::Slope,
        SignalKind::TreeCanopy,
        SignalKind::SurfaceTemp,
        SignalKind::AirQuality,
        SignalKind::HeatIsland,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Slope => "slope",
            SignalKind::TreeCanopy => "tree_canopy",
            SignalKind::SurfaceTemp => "surface_temp",
            SignalKind::AirQuality => "air_quality",
            SignalKind::HeatIsland => "heat_island",
        }
    }

    fn index(self) -> usize {
        match self {
            SignalKind::Slope => 0,
            SignalKind::TreeCanopy => 1,
            SignalKind::SurfaceTemp => 2,
            SignalKind::AirQuality => 3,
            SignalKind::HeatIsland => 4,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored environmental measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    /// Sub-score in `[0, 10]`
    pub score: f64,
    /// Raw measurement in the signal's native unit
    pub raw: f64,
}

impl SignalResult {
    /// Scores a raw measurement with the scorer for `kind`
    pub fn from_raw(kind: SignalKind, raw: f64) -> Self {
        Self {
            score: crate::scoring::signals::score_signal(kind, raw),
            raw,
        }
    }
}

/// Resolved signal results of one query, at most one per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    slots: [Option<SignalResult>; 5],
}

impl Signals {
    pub fn get(&self, kind: SignalKind) -> Option<SignalResult> {
        self.slots[kind.index()]
    }

    /// Stores a result unless the slot is already filled.
    /// Returns `false` for a duplicate.
    pub fn resolve(&mut self, kind: SignalKind, result: SignalResult) -> bool {
        let slot = &mut self.slots[kind.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(result);
        true
    }

    pub fn score(&self, kind: SignalKind) -> Option<f64> {
        self.get(kind).map(|result| result.score)
    }

    pub fn resolved_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn resolved_kinds(&self) -> Vec<SignalKind> {
        SignalKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
            .collect()
    }
}

/// Qualitative walkability rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl Label {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Label::Excellent
        } else if score >= 6.0 {
            Label::Good
        } else if score >= 4.0 {
            Label::Fair
        } else if score >= 2.0 {
            Label::Poor
        } else {
            Label::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Excellent => "Excellent",
            Label::Good => "Good",
            Label::Fair => "Fair",
            Label::Poor => "Poor",
            Label::Critical => "Critical",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete walkability assessment as observed by callers.
///
/// Unresolved signals are reported as `0.0`, never omitted. A new value is
/// built for every recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkabilityMetrics {
    pub crossing_density: f64,
    pub sidewalk_coverage: f64,
    pub network_efficiency: f64,
    pub destination_access: f64,
    pub green_space_access: f64,
    pub slope: f64,
    pub tree_canopy: f64,
    pub surface_temp: f64,
    pub air_quality: f64,
    pub heat_island: f64,
    pub overall_score: f64,
    pub label: Label,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds() {
        assert_eq!(Label::from_score(10.0), Label::Excellent);
        assert_eq!(Label::from_score(8.0), Label::Excellent);
        assert_eq!(Label::from_score(7.9), Label::Good);
        assert_eq!(Label::from_score(6.0), Label::Good);
        assert_eq!(Label::from_score(4.0), Label::Fair);
        assert_eq!(Label::from_score(2.0), Label::Poor);
        assert_eq!(Label::from_score(1.9), Label::Critical);
        assert_eq!(Label::from_score(0.0), Label::Critical);
    }

    #[test]
    fn signal_slots_fill_once() {
        let mut signals = Signals::default();
        let first = SignalResult { score: 8.0, raw: 3.0 };
        let second = SignalResult { score: 2.0, raw: 20.0 };

        assert!(signals.resolve(SignalKind::Slope, first));
        assert!(!signals.resolve(SignalKind::Slope, second));
        assert_eq!(signals.get(SignalKind::Slope), Some(first));
        assert_eq!(signals.resolved_count(), 1);
        assert_eq!(signals.resolved_kinds(), vec![SignalKind::Slope]);
        assert_eq!(signals.score(SignalKind::AirQuality), None);
    }
}
