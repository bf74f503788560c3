//! Progressive multi-source acquisition
//!
//! A query fetches the infrastructure snapshot and every configured signal
//! concurrently, and publishes refined metrics as each piece arrives.

pub mod config;
pub mod session;
pub mod sources;
pub mod update;

pub use config::AcquisitionConfig;
pub use session::{
    DisplayState, QueryPhase, WalkabilitySession, WalkabilityStream, compute_walkability,
};
pub use sources::{FixedSignal, InfrastructureSource, SignalSource, SourceSet, StaticInfrastructure};
pub use update::{ResolvedSignal, WalkabilityUpdate};
