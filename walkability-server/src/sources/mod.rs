//! Remote and local collaborators feeding the acquisition engine

mod geojson_file;
mod open_meteo;
mod overpass;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use walkability_core::SignalKind;
use walkability_core::acquisition::{FixedSignal, SignalSource, SourceSet};

pub use geojson_file::GeojsonFileSource;
pub use open_meteo::{OpenMeteoCurrent, OpenMeteoSlope};
pub use overpass::OverpassSource;

use crate::config::{InfrastructureConfig, ServerConfig, SignalProvider};
use crate::error::ServerError;

const USER_AGENT: &str = concat!("walkability-server/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client; per-fetch limits are enforced by the acquisition engine
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised
pub fn http_client(timeout: Duration) -> Result<Client, ServerError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Builds the collaborator set described by the configuration
///
/// # Errors
///
/// Returns an error if a local snapshot cannot be loaded or a signal has
/// no implementation for the selected provider
pub fn build_sources(config: &ServerConfig, client: &Client) -> Result<SourceSet, ServerError> {
    let mut sources = match &config.infrastructure {
        InfrastructureConfig::Overpass { endpoint, radius } => SourceSet::new(Arc::new(
            OverpassSource::new(client.clone(), endpoint.clone(), *radius),
        )),
        InfrastructureConfig::Geojson { path, radius } => {
            SourceSet::new(Arc::new(GeojsonFileSource::load(path, *radius)?))
        }
    };

    for kind in SignalKind::ALL {
        let source: Arc<dyn SignalSource> = match config.signals.provider(kind) {
            SignalProvider::Disabled => continue,
            SignalProvider::Fixed { value } => Arc::new(FixedSignal { kind, value }),
            SignalProvider::OpenMeteo => open_meteo_source(kind, client)?,
        };
        sources = sources.with_signal(source);
    }

    tracing::info!("Signal sources: {:?}", sources.signal_kinds());
    Ok(sources)
}

fn open_meteo_source(kind: SignalKind, client: &Client) -> Result<Arc<dyn SignalSource>, ServerError> {
    match kind {
        SignalKind::Slope => Ok(Arc::new(OpenMeteoSlope::new(client.clone()))),
        SignalKind::SurfaceTemp => Ok(Arc::new(OpenMeteoCurrent::temperature(client.clone()))),
        SignalKind::AirQuality => Ok(Arc::new(OpenMeteoCurrent::air_quality(client.clone()))),
        SignalKind::TreeCanopy | SignalKind::HeatIsland => Err(ServerError::Config(format!(
            "open-meteo has no {kind} data, use a fixed or disabled provider"
        ))),
    }
}
