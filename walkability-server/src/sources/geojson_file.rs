use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use walkability_core::acquisition::InfrastructureSource;
use walkability_core::loading::load_geojson_snapshot;
use walkability_core::{InfrastructureSnapshot, Location, SourceError};

use crate::error::ServerError;

/// City-scale snapshot loaded once at startup and cropped per query
#[derive(Debug, Clone)]
pub struct GeojsonFileSource {
    snapshot: Arc<InfrastructureSnapshot>,
    radius: f64,
}

impl GeojsonFileSource {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a FeatureCollection
    pub fn load(path: &Path, radius: f64) -> Result<Self, ServerError> {
        let snapshot = load_geojson_snapshot(path)?;
        tracing::info!(
            "Loaded {} streets, {} crossings, {} POIs from {}",
            snapshot.streets().len(),
            snapshot.crossings().len(),
            snapshot.pois().len(),
            path.display()
        );
        Ok(Self::new(Arc::new(snapshot), radius))
    }

    pub fn new(snapshot: Arc<InfrastructureSnapshot>, radius: f64) -> Self {
        Self { snapshot, radius }
    }
}

#[async_trait]
impl InfrastructureSource for GeojsonFileSource {
    async fn fetch(&self, location: &Location) -> Result<InfrastructureSnapshot, SourceError> {
        let snapshot = Arc::clone(&self.snapshot);
        let center = location.point();
        let radius = self.radius;

        tokio::task::spawn_blocking(move || snapshot.within_radius(center, radius))
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))
    }
}
