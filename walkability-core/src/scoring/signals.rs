//! Environmental signal scorers
//!
//! Each scorer maps one raw measurement to `[0, 10]`, higher meaning more
//! comfortable for pedestrians. Non-finite input lands in the worst band.

use super::round1;
use crate::model::SignalKind;

/// Step function over terrain slope in degrees (sign ignored)
pub fn score_slope(degrees: f64) -> f64 {
    let degrees = degrees.abs();
    if degrees <= 2.0 {
        10.0
    } else if degrees <= 5.0 {
        8.0
    } else if degrees <= 10.0 {
        6.0
    } else if degrees <= 15.0 {
        4.0
    } else {
        2.0
    }
}

/// Piecewise-linear score over a 0..1 vegetation index
pub fn score_vegetation(index: f64) -> f64 {
    let score = if index >= 0.6 {
        10.0
    } else if index >= 0.4 {
        5.0 + (index - 0.4) / 0.2 * 5.0
    } else if index >= 0.2 {
        (index - 0.2) / 0.2 * 5.0
    } else {
        0.0
    };
    round1(score)
}

/// Piecewise-linear score over surface temperature in °C
pub fn score_surface_temperature(celsius: f64) -> f64 {
    let score = if celsius <= 25.0 {
        10.0
    } else if celsius <= 35.0 {
        10.0 - (celsius - 25.0) / 10.0 * 5.0
    } else if celsius <= 45.0 {
        5.0 - (celsius - 35.0) / 10.0 * 5.0
    } else {
        0.0
    };
    round1(score)
}

/// EPA-style PM2.5 bands (µg/m³)
pub fn score_air_quality(pm25: f64) -> f64 {
    if pm25 <= 12.0 {
        10.0
    } else if pm25 <= 35.4 {
        8.0
    } else if pm25 <= 55.4 {
        6.0
    } else if pm25 <= 150.4 {
        4.0
    } else if pm25 <= 250.4 {
        2.0
    } else {
        0.0
    }
}

/// Heat-island intensity bands (°C above rural reference)
pub fn score_heat_island(delta: f64) -> f64 {
    if delta <= 1.0 {
        10.0
    } else if delta <= 2.0 {
        8.0
    } else if delta <= 3.0 {
        6.0
    } else if delta <= 5.0 {
        4.0
    } else {
        2.0
    }
}

pub fn score_signal(kind: SignalKind, raw: f64) -> f64 {
    match kind {
        SignalKind::Slope => score_slope(raw),
        SignalKind::TreeCanopy => score_vegetation(raw),
        SignalKind::SurfaceTemp => score_surface_temperature(raw),
        SignalKind::AirQuality => score_air_quality(raw),
        SignalKind::HeatIsland => score_heat_island(raw),
    }
}
