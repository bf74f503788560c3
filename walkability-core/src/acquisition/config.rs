use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scoring::FusionOptions;

/// Configuration for concurrent data acquisition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Time limit for the infrastructure fetch; exceeding it fails the query
    pub infrastructure_timeout_ms: u64,
    /// Time limit per signal fetch; exceeding it marks the signal absent
    pub signal_timeout_ms: u64,
    /// Abort the previous query's task when a new location is selected
    pub abort_superseded: bool,
    pub fusion: FusionOptions,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            infrastructure_timeout_ms: 30_000,
            signal_timeout_ms: 15_000,
            abort_superseded: true,
            fusion: FusionOptions::default(),
        }
    }
}

impl AcquisitionConfig {
    pub fn infrastructure_timeout(&self) -> Duration {
        Duration::from_millis(self.infrastructure_timeout_ms)
    }

    pub fn signal_timeout(&self) -> Duration {
        Duration::from_millis(self.signal_timeout_ms)
    }
}
