//! Open-Meteo forecast, air-quality and elevation APIs

use async_trait::async_trait;
use geo::{Destination, Haversine, Point};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use walkability_core::acquisition::SignalSource;
use walkability_core::{Location, SignalKind, SourceError};

use super::overpass::request_error;

pub const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";
pub const AIR_QUALITY_ENDPOINT: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";
pub const ELEVATION_ENDPOINT: &str = "https://api.open-meteo.com/v1/elevation";

/// Distance from the query point to each elevation sample, metres
const SLOPE_SPACING: f64 = 50.0;

#[derive(Deserialize)]
struct CurrentResponse {
    current: Map<String, Value>,
}

#[derive(Deserialize)]
struct ElevationResponse {
    elevation: Vec<f64>,
}

/// One variable of an Open-Meteo `current=` block
#[derive(Debug, Clone)]
pub struct OpenMeteoCurrent {
    client: Client,
    kind: SignalKind,
    endpoint: String,
    variable: &'static str,
}

impl OpenMeteoCurrent {
    /// Air temperature 2 m above ground, °C
    pub fn temperature(client: Client) -> Self {
        Self {
            client,
            kind: SignalKind::SurfaceTemp,
            endpoint: FORECAST_ENDPOINT.to_string(),
            variable: "temperature_2m",
        }
    }

    /// PM2.5 concentration, µg/m³
    pub fn air_quality(client: Client) -> Self {
        Self {
            client,
            kind: SignalKind::AirQuality,
            endpoint: AIR_QUALITY_ENDPOINT.to_string(),
            variable: "pm2_5",
        }
    }
}

#[async_trait]
impl SignalSource for OpenMeteoCurrent {
    fn kind(&self) -> SignalKind {
        self.kind
    }

    async fn fetch(&self, location: &Location) -> Result<Option<f64>, SourceError> {
        let response: CurrentResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", location.lat.to_string()),
                ("longitude", location.lon.to_string()),
                ("current", self.variable.to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        Ok(response.current.get(self.variable).and_then(Value::as_f64))
    }
}

/// Terrain slope from four elevation samples around the query point
#[derive(Debug, Clone)]
pub struct OpenMeteoSlope {
    client: Client,
    endpoint: String,
}

impl OpenMeteoSlope {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: ELEVATION_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl SignalSource for OpenMeteoSlope {
    fn kind(&self) -> SignalKind {
        SignalKind::Slope
    }

    async fn fetch(&self, location: &Location) -> Result<Option<f64>, SourceError> {
        let center = location.point();
        // north, south, east, west
        let samples: Vec<Point<f64>> = [0.0, 180.0, 90.0, 270.0]
            .into_iter()
            .map(|bearing| Haversine.destination(center, bearing, SLOPE_SPACING))
            .collect();
        let join = |coord: fn(Point<f64>) -> f64| {
            samples
                .iter()
                .map(|p| format!("{:.6}", coord(*p)))
                .collect::<Vec<_>>()
                .join(",")
        };

        let response: ElevationResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("latitude", join(Point::y)), ("longitude", join(Point::x))])
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        match response.elevation.as_slice() {
            [north, south, east, west] => Ok(Some(slope_degrees(
                *north,
                *south,
                *east,
                *west,
                SLOPE_SPACING,
            ))),
            other => Err(SourceError::Decode(format!(
                "expected 4 elevations, got {}",
                other.len()
            ))),
        }
    }
}

/// Slope in degrees from central differences over `spacing` metres
pub fn slope_degrees(north: f64, south: f64, east: f64, west: f64, spacing: f64) -> f64 {
    let dz_dx = (east - west) / (2.0 * spacing);
    let dz_dy = (north - south) / (2.0 * spacing);
    dz_dx.hypot(dz_dy).atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_ground_has_no_slope() {
        assert_eq!(slope_degrees(100.0, 100.0, 100.0, 100.0, 50.0), 0.0);
    }

    #[test]
    fn slope_from_rise_over_run() {
        // 10 m rise across 100 m is a 10% grade
        let slope = slope_degrees(110.0, 100.0, 100.0, 100.0, 50.0);
        assert!((slope - 0.1_f64.atan().to_degrees()).abs() < 1e-9);

        let diagonal = slope_degrees(105.0, 95.0, 105.0, 95.0, 50.0);
        assert!((diagonal - (0.1_f64 * 2.0_f64.sqrt()).atan().to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn decodes_current_block() {
        let body = r#"{"latitude":52.23,"longitude":21.01,"current":{"time":"2024-06-01T12:00","interval":900,"pm2_5":7.4}}"#;
        let response: CurrentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.current.get("pm2_5").and_then(Value::as_f64), Some(7.4));
        assert_eq!(response.current.get("temperature_2m").and_then(Value::as_f64), None);
    }
}
