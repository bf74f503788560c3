pub use crate::DEFAULT_RADIUS;

// Queries
pub use crate::acquisition::{
    AcquisitionConfig, FixedSignal, InfrastructureSource, QueryPhase, SignalSource, SourceSet,
    StaticInfrastructure, WalkabilitySession, WalkabilityStream, WalkabilityUpdate,
    compute_walkability,
};
pub use crate::loading::{load_geojson_snapshot, snapshot_from_geojson, snapshot_from_overpass};
pub use crate::model::{InfrastructureSnapshot, Label, Location, SignalKind, WalkabilityMetrics};

// Pure scoring
pub use crate::scoring::{
    BaseAssessment, BaseMetrics, Confidence, DataQuality, FusionOptions, Regime, SignalScores,
    UnresolvedSignals, assess_imagery, assess_many, fuse, overall_score,
};

pub use crate::{Error, SourceError};
