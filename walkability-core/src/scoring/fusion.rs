//! Composite score from infrastructure and environmental sub-scores
//!
//! The weighting regime depends only on how many signal scores are passed
//! in as known (`Some`), never on their values.

use serde::{Deserialize, Serialize};

use super::metrics::BaseMetrics;
use super::round1;
use crate::model::{Label, SignalKind, Signals, WalkabilityMetrics};

/// Infrastructure weights when no signal is known
pub const INFRASTRUCTURE_WEIGHTS: [f64; 5] = [0.25, 0.25, 0.15, 0.15, 0.20];
/// Infrastructure weights when all five signals are known
pub const COMPLETE_INFRASTRUCTURE_WEIGHTS: [f64; 5] = [0.14, 0.14, 0.10, 0.10, 0.10];
/// Signal weights when all five signals are known, in [`SignalKind::ALL`] order
pub const COMPLETE_SIGNAL_WEIGHTS: [f64; 5] = [0.10, 0.10, 0.08, 0.07, 0.07];
/// Share of the infrastructure composite in the partial regime
pub const PARTIAL_INFRASTRUCTURE_SHARE: f64 = 0.5;

/// Weighting scheme selected by the number of known signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// No signal known
    InfrastructureOnly,
    /// Between one and four signals known
    Partial,
    /// All five signals known
    Complete,
}

impl Regime {
    pub fn select(known_signals: usize) -> Self {
        match known_signals {
            0 => Regime::InfrastructureOnly,
            n if n < SignalKind::ALL.len() => Regime::Partial,
            _ => Regime::Complete,
        }
    }
}

/// Treatment of unknown signal slots in the partial regime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedSignals {
    /// Unknown slots contribute 0 to a five-slot average
    #[default]
    CountAsZero,
    /// Only known slots are averaged
    Exclude,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionOptions {
    pub unresolved: UnresolvedSignals,
}

/// Signal sub-scores passed to a fusion call; `None` means "not known"
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalScores {
    pub slope: Option<f64>,
    pub tree_canopy: Option<f64>,
    pub surface_temp: Option<f64>,
    pub air_quality: Option<f64>,
    pub heat_island: Option<f64>,
}

impl SignalScores {
    pub fn get(&self, kind: SignalKind) -> Option<f64> {
        match kind {
            SignalKind::Slope => self.slope,
            SignalKind::TreeCanopy => self.tree_canopy,
            SignalKind::SurfaceTemp => self.surface_temp,
            SignalKind::AirQuality => self.air_quality,
            SignalKind::HeatIsland => self.heat_island,
        }
    }

    pub fn as_array(&self) -> [Option<f64>; 5] {
        SignalKind::ALL.map(|kind| self.get(kind))
    }

    pub fn known_count(&self) -> usize {
        self.as_array().iter().flatten().count()
    }

    pub fn regime(&self) -> Regime {
        Regime::select(self.known_count())
    }
}

impl From<&Signals> for SignalScores {
    fn from(signals: &Signals) -> Self {
        Self {
            slope: signals.score(SignalKind::Slope),
            tree_canopy: signals.score(SignalKind::TreeCanopy),
            surface_temp: signals.score(SignalKind::SurfaceTemp),
            air_quality: signals.score(SignalKind::AirQuality),
            heat_island: signals.score(SignalKind::HeatIsland),
        }
    }
}

fn weighted_sum(weights: &[f64; 5], values: &[f64; 5]) -> f64 {
    weights.iter().zip(values).map(|(w, v)| w * v).sum()
}

/// Composite score rounded to one decimal
#[allow(clippy::cast_precision_loss)]
pub fn overall_score(base: &BaseMetrics, signals: &SignalScores, options: &FusionOptions) -> f64 {
    let infrastructure = base.as_array();
    let slots = signals.as_array();

    let score = match signals.regime() {
        Regime::InfrastructureOnly => weighted_sum(&INFRASTRUCTURE_WEIGHTS, &infrastructure),
        Regime::Partial => {
            let composite = weighted_sum(&INFRASTRUCTURE_WEIGHTS, &infrastructure);
            let known: Vec<f64> = slots.iter().flatten().copied().collect();
            let divisor = match options.unresolved {
                UnresolvedSignals::CountAsZero => slots.len(),
                UnresolvedSignals::Exclude => known.len(),
            };
            let environment = known.iter().sum::<f64>() / divisor as f64;
            PARTIAL_INFRASTRUCTURE_SHARE * composite
                + (1.0 - PARTIAL_INFRASTRUCTURE_SHARE) * environment
        }
        Regime::Complete => {
            let environment = slots.map(|slot| slot.unwrap_or(0.0));
            weighted_sum(&COMPLETE_INFRASTRUCTURE_WEIGHTS, &infrastructure)
                + weighted_sum(&COMPLETE_SIGNAL_WEIGHTS, &environment)
        }
    };

    round1(score.clamp(0.0, 10.0))
}

/// Builds the full metrics value; unknown signals are reported as `0.0`
pub fn fuse(base: &BaseMetrics, signals: &SignalScores, options: &FusionOptions) -> WalkabilityMetrics {
    let overall = overall_score(base, signals, options);

    WalkabilityMetrics {
        crossing_density: base.crossing_density,
        sidewalk_coverage: base.sidewalk_coverage,
        network_efficiency: base.network_efficiency,
        destination_access: base.destination_access,
        green_space_access: base.green_space_access,
        slope: signals.slope.unwrap_or(0.0),
        tree_canopy: signals.tree_canopy.unwrap_or(0.0),
        surface_temp: signals.surface_temp.unwrap_or(0.0),
        air_quality: signals.air_quality.unwrap_or(0.0),
        heat_island: signals.heat_island.unwrap_or(0.0),
        overall_score: overall,
        label: Label::from_score(overall),
    }
}
