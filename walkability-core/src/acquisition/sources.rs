//! Contracts for the external data collaborators

use std::sync::Arc;

use async_trait::async_trait;

use crate::{InfrastructureSnapshot, Location, SignalKind, SourceError};

/// Fetches the infrastructure snapshot around a location
#[async_trait]
pub trait InfrastructureSource: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<InfrastructureSnapshot, SourceError>;
}

/// Fetches one raw environmental measurement
#[async_trait]
pub trait SignalSource: Send + Sync {
    fn kind(&self) -> SignalKind;

    /// `Ok(None)` when the source has no measurement for the location
    async fn fetch(&self, location: &Location) -> Result<Option<f64>, SourceError>;
}

/// Infrastructure collaborator plus at most one source per signal kind
#[derive(Clone)]
pub struct SourceSet {
    infrastructure: Arc<dyn InfrastructureSource>,
    signals: Vec<Arc<dyn SignalSource>>,
}

impl SourceSet {
    pub fn new(infrastructure: Arc<dyn InfrastructureSource>) -> Self {
        Self {
            infrastructure,
            signals: Vec::new(),
        }
    }

    /// Adds a signal source, replacing any source of the same kind
    #[must_use]
    pub fn with_signal(mut self, source: Arc<dyn SignalSource>) -> Self {
        let kind = source.kind();
        self.signals.retain(|existing| existing.kind() != kind);
        self.signals.push(source);
        self
    }

    pub fn infrastructure(&self) -> &dyn InfrastructureSource {
        self.infrastructure.as_ref()
    }

    pub fn signals(&self) -> &[Arc<dyn SignalSource>] {
        &self.signals
    }

    pub fn signal_kinds(&self) -> Vec<SignalKind> {
        self.signals.iter().map(|source| source.kind()).collect()
    }
}

impl std::fmt::Debug for SourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSet")
            .field("signals", &self.signal_kinds())
            .finish_non_exhaustive()
    }
}

/// Signal source answering every location with the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSignal {
    pub kind: SignalKind,
    pub value: f64,
}

#[async_trait]
impl SignalSource for FixedSignal {
    fn kind(&self) -> SignalKind {
        self.kind
    }

    async fn fetch(&self, _location: &Location) -> Result<Option<f64>, SourceError> {
        Ok(Some(self.value))
    }
}

/// Infrastructure source answering every location with the same snapshot
#[derive(Debug, Clone)]
pub struct StaticInfrastructure(pub Arc<InfrastructureSnapshot>);

#[async_trait]
impl InfrastructureSource for StaticInfrastructure {
    async fn fetch(&self, _location: &Location) -> Result<InfrastructureSnapshot, SourceError> {
        Ok(self.0.as_ref().clone())
    }
}
