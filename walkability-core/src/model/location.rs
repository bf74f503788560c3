//! Query location selected by the caller

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Geographic point a walkability query is issued for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl Location {
    /// Creates a validated location
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] if the coordinates are not finite
    /// or fall outside the WGS84 range
    pub fn new(lat: f64, lon: f64, display_name: impl Into<String>) -> Result<Self, Error> {
        let location = Self {
            lat,
            lon,
            display_name: display_name.into(),
            country_code: None,
        };
        location.validate()?;
        Ok(location)
    }

    #[must_use]
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    /// Checks that coordinates are usable for spatial queries
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] for NaN, infinite or out of range values
    pub fn validate(&self) -> Result<(), Error> {
        let valid = self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon);

        if valid {
            Ok(())
        } else {
            Err(Error::InvalidLocation {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    /// Location as a `geo` point (x = lon, y = lat)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}
