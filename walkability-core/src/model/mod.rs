//! Data model for walkability assessment
//!
//! Contains the query location, the infrastructure snapshot and the
//! signal/metrics types published to callers.

pub mod location;
pub mod metrics;
pub mod snapshot;
pub mod tags;

pub use location::Location;
pub use metrics::{Label, SignalKind, SignalResult, Signals, WalkabilityMetrics};
pub use snapshot::{Entity, EntityId, EntityKind, InfrastructureSnapshot, NodePosition};
