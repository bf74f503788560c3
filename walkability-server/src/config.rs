//! Server configuration, read from a TOML file with CLI overrides

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use walkability_core::{AcquisitionConfig, DEFAULT_RADIUS, SignalKind};

use crate::error::ServerError;

pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_LOG_FILTER: &str = "walkability_server=info,walkability_core=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "walkability-server", version, about = "Progressive walkability scoring over HTTP")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to bind, overrides the config file
    #[arg(long)]
    pub bind: Option<IpAddr>,
    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub acquisition: AcquisitionConfig,
    pub infrastructure: InfrastructureConfig,
    pub signals: SignalsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
    pub log_filter: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            request_timeout_secs: 60,
            concurrency_limit: 64,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where infrastructure snapshots come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum InfrastructureConfig {
    Overpass {
        #[serde(default = "default_overpass_endpoint")]
        endpoint: String,
        #[serde(default = "default_radius")]
        radius: f64,
    },
    Geojson {
        path: PathBuf,
        #[serde(default = "default_radius")]
        radius: f64,
    },
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        InfrastructureConfig::Overpass {
            endpoint: default_overpass_endpoint(),
            radius: DEFAULT_RADIUS,
        }
    }
}

fn default_overpass_endpoint() -> String {
    DEFAULT_OVERPASS_ENDPOINT.to_string()
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum SignalProvider {
    OpenMeteo,
    Fixed { value: f64 },
    Disabled,
}

/// Provider per signal, keyed by the signal's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    pub slope: SignalProvider,
    pub tree_canopy: SignalProvider,
    pub surface_temp: SignalProvider,
    pub air_quality: SignalProvider,
    pub heat_island: SignalProvider,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            slope: SignalProvider::OpenMeteo,
            tree_canopy: SignalProvider::Disabled,
            surface_temp: SignalProvider::OpenMeteo,
            air_quality: SignalProvider::OpenMeteo,
            heat_island: SignalProvider::Disabled,
        }
    }
}

impl SignalsConfig {
    pub fn provider(&self, kind: SignalKind) -> SignalProvider {
        match kind {
            SignalKind::Slope => self.slope,
            SignalKind::TreeCanopy => self.tree_canopy,
            SignalKind::SurfaceTemp => self.surface_temp,
            SignalKind::AirQuality => self.air_quality,
            SignalKind::HeatIsland => self.heat_island,
        }
    }

    pub fn enabled(&self) -> BTreeMap<&'static str, SignalProvider> {
        SignalKind::ALL
            .into_iter()
            .map(|kind| (kind.as_str(), self.provider(kind)))
            .filter(|(_, provider)| *provider != SignalProvider::Disabled)
            .collect()
    }
}

impl ServerConfig {
    /// Reads the configuration file, falling back to defaults when it is absent
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// # Errors
    ///
    /// Returns an error for malformed TOML or invalid values
    pub fn from_toml(text: &str) -> Result<Self, ServerError> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ServerError> {
        let radius = match &self.infrastructure {
            InfrastructureConfig::Overpass { radius, .. }
            | InfrastructureConfig::Geojson { radius, .. } => *radius,
        };
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ServerError::Config(format!(
                "infrastructure radius must be positive, got {radius}"
            )));
        }
        for kind in SignalKind::ALL {
            if let SignalProvider::Fixed { value } = self.signals.provider(kind) {
                if !value.is_finite() {
                    return Err(ServerError::Config(format!(
                        "fixed value for {kind} must be finite"
                    )));
                }
            }
        }
        if self.server.concurrency_limit == 0 {
            return Err(ServerError::Config("concurrency_limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(bind) = cli.bind {
            self.server.bind = bind;
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }
}
