use pyo3::prelude::*;
use walkability_core::prelude::*;
use walkability_core::scoring::{classify_confidence, signals};

/// WalkabilityMetrics
///
/// Ten sub-scores in ``[0, 10]``, the weighted overall score and its label.
/// Unknown environmental signals are reported as ``0.0``.
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyclass)]
#[pyclass(name = "WalkabilityMetrics", frozen)]
pub struct PyWalkabilityMetrics {
    pub(crate) inner: WalkabilityMetrics,
}

#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pymethods)]
#[pymethods]
impl PyWalkabilityMetrics {
    #[getter]
    fn crossing_density(&self) -> f64 {
        self.inner.crossing_density
    }

    #[getter]
    fn sidewalk_coverage(&self) -> f64 {
        self.inner.sidewalk_coverage
    }

    #[getter]
    fn network_efficiency(&self) -> f64 {
        self.inner.network_efficiency
    }

    #[getter]
    fn destination_access(&self) -> f64 {
        self.inner.destination_access
    }

    #[getter]
    fn green_space_access(&self) -> f64 {
        self.inner.green_space_access
    }

    #[getter]
    fn slope(&self) -> f64 {
        self.inner.slope
    }

    #[getter]
    fn tree_canopy(&self) -> f64 {
        self.inner.tree_canopy
    }

    #[getter]
    fn surface_temp(&self) -> f64 {
        self.inner.surface_temp
    }

    #[getter]
    fn air_quality(&self) -> f64 {
        self.inner.air_quality
    }

    #[getter]
    fn heat_island(&self) -> f64 {
        self.inner.heat_island
    }

    #[getter]
    fn overall_score(&self) -> f64 {
        self.inner.overall_score
    }

    #[getter]
    fn label(&self) -> &'static str {
        self.inner.label.as_str()
    }

    /// Serialize to a JSON object with camelCase keys
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Failed to serialize metrics: {e}"
            ))
        })
    }

    fn __repr__(&self) -> String {
        format!(
            "WalkabilityMetrics(overall_score={}, label='{}')",
            self.inner.overall_score, self.inner.label
        )
    }
}

/// Score terrain slope in degrees; steeper is worse
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn score_slope(degrees: f64) -> f64 {
    signals::score_slope(degrees)
}

/// Score a vegetation index on a ``0..1`` scale
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn score_vegetation(index: f64) -> f64 {
    signals::score_vegetation(index)
}

/// Score surface temperature in °C; full marks up to 25 °C
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn score_surface_temperature(celsius: f64) -> f64 {
    signals::score_surface_temperature(celsius)
}

/// Score PM2.5 concentration in µg/m³ with EPA-style breakpoints
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn score_air_quality(pm25: f64) -> f64 {
    signals::score_air_quality(pm25)
}

/// Score the urban heat-island temperature delta in °C
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn score_heat_island(delta: f64) -> f64 {
    signals::score_heat_island(delta)
}

/// Fuse infrastructure and environmental sub-scores
///
/// Parameters
/// ----------
/// crossing_density, sidewalk_coverage, network_efficiency, destination_access, green_space_access : float
///     Infrastructure sub-scores in ``[0, 10]``
/// slope, tree_canopy, surface_temp, air_quality, heat_island : float, optional
///     Environmental sub-scores; ``None`` means the signal is not known
/// exclude_unresolved : bool
///     Average only known signals when some are missing, instead of
///     counting the missing ones as zero
///
/// Returns
/// -------
/// WalkabilityMetrics
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
#[pyo3(signature = (
    crossing_density,
    sidewalk_coverage,
    network_efficiency,
    destination_access,
    green_space_access,
    slope=None,
    tree_canopy=None,
    surface_temp=None,
    air_quality=None,
    heat_island=None,
    exclude_unresolved=false
))]
#[allow(clippy::too_many_arguments)]
pub fn fuse_scores(
    crossing_density: f64,
    sidewalk_coverage: f64,
    network_efficiency: f64,
    destination_access: f64,
    green_space_access: f64,
    slope: Option<f64>,
    tree_canopy: Option<f64>,
    surface_temp: Option<f64>,
    air_quality: Option<f64>,
    heat_island: Option<f64>,
    exclude_unresolved: bool,
) -> PyWalkabilityMetrics {
    let base = BaseMetrics {
        crossing_density,
        sidewalk_coverage,
        network_efficiency,
        destination_access,
        green_space_access,
    };
    let signals = SignalScores {
        slope,
        tree_canopy,
        surface_temp,
        air_quality,
        heat_island,
    };
    let options = FusionOptions {
        unresolved: if exclude_unresolved {
            UnresolvedSignals::Exclude
        } else {
            UnresolvedSignals::CountAsZero
        },
    };

    PyWalkabilityMetrics {
        inner: fuse(&base, &signals, &options),
    }
}

/// Label for an overall score: Excellent, Good, Fair, Poor or Critical
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn walkability_label(score: f64) -> &'static str {
    Label::from_score(score).as_str()
}

/// Confidence tier (``"high"``, ``"medium"`` or ``"low"``) for entity counts
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyfunction)]
#[pyfunction]
pub fn assess_confidence(street_count: usize, crossing_count: usize, poi_count: usize) -> &'static str {
    classify_confidence(street_count, crossing_count, poi_count).as_str()
}
