//! Progressive walkability scoring
//!
//! Infrastructure metrics come from an OpenStreetMap snapshot around the
//! query location. Environmental signals (slope, canopy, temperature, air
//! quality, heat island) refine the overall score as they arrive.

pub mod acquisition;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod scoring;

pub use error::{Error, SourceError};
pub use model::{
    Entity, EntityId, EntityKind, InfrastructureSnapshot, Label, Location, NodePosition,
    SignalKind, SignalResult, Signals, WalkabilityMetrics,
};

pub use acquisition::{
    AcquisitionConfig, QueryPhase, SourceSet, WalkabilitySession, WalkabilityStream,
    WalkabilityUpdate, compute_walkability,
};
pub use scoring::{BaseAssessment, BaseMetrics, Confidence, DataQuality, Regime, assess_many};

/// Default search radius around a query location, metres
pub const DEFAULT_RADIUS: f64 = 500.0;
