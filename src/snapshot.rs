use std::path::PathBuf;

use geo::Point;
use pyo3::prelude::*;
use rayon::prelude::*;
use walkability_core::prelude::*;

use crate::scoring::PyWalkabilityMetrics;

/// Bad coordinates or malformed input data
fn is_bad_input(e: &Error) -> bool {
    matches!(e, Error::InvalidLocation { .. } | Error::InvalidData(_))
}

fn core_error(context: &str, e: &Error) -> PyErr {
    let message = format!("{context}: {e}");
    match e {
        Error::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
            PyErr::new::<pyo3::exceptions::PyFileNotFoundError, _>(message)
        }
        _ if is_bad_input(e) => PyErr::new::<pyo3::exceptions::PyValueError, _>(message),
        _ => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(message),
    }
}

/// DataQuality
///
/// Entity counts of a snapshot and the resulting confidence tier.
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyclass)]
#[pyclass(name = "DataQuality", frozen)]
pub struct PyDataQuality {
    inner: DataQuality,
}

#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pymethods)]
#[pymethods]
impl PyDataQuality {
    #[getter]
    fn crossing_count(&self) -> usize {
        self.inner.crossing_count
    }

    #[getter]
    fn street_count(&self) -> usize {
        self.inner.street_count
    }

    #[getter]
    fn sidewalk_count(&self) -> usize {
        self.inner.sidewalk_count
    }

    #[getter]
    fn poi_count(&self) -> usize {
        self.inner.poi_count
    }

    #[getter]
    fn confidence(&self) -> &'static str {
        self.inner.confidence.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "DataQuality(streets={}, crossings={}, pois={}, confidence='{}')",
            self.inner.street_count,
            self.inner.crossing_count,
            self.inner.poi_count,
            self.inner.confidence.as_str()
        )
    }
}

/// Snapshot
///
/// Classified OpenStreetMap entities around a location: crossings,
/// sidewalks, streets and points of interest.
///
/// Example:
///
/// .. code-block:: python
///
///     snapshot = Snapshot(overpass_json)
///     metrics = snapshot.metrics(52.2297, 21.0122)
///     print(metrics.overall_score, snapshot.data_quality().confidence)
#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pyclass)]
#[pyclass(name = "Snapshot", frozen)]
pub struct PySnapshot {
    inner: InfrastructureSnapshot,
}

#[cfg_attr(feature = "stubgen", pyo3_stub_gen::derive::gen_stub_pymethods)]
#[pymethods]
impl PySnapshot {
    /// Build a snapshot from an Overpass API JSON response
    #[new]
    pub fn new(overpass_json: &str) -> PyResult<Self> {
        let inner = snapshot_from_overpass(overpass_json)
            .map_err(|e| core_error("Failed to parse Overpass response", &e))?;
        Ok(Self { inner })
    }

    /// Build a snapshot from a GeoJSON FeatureCollection file
    #[staticmethod]
    pub fn from_geojson(py: Python<'_>, path: PathBuf) -> PyResult<Self> {
        let inner = py
            .detach(|| load_geojson_snapshot(&path))
            .map_err(|e| core_error("Failed to load GeoJSON snapshot", &e))?;
        Ok(Self { inner })
    }

    /// Entities within ``radius`` metres of a point
    pub fn within_radius(&self, lat: f64, lon: f64, radius: f64) -> Self {
        Self {
            inner: self.inner.within_radius(Point::new(lon, lat), radius),
        }
    }

    /// Infrastructure-only metrics centred at ``(lat, lon)``
    pub fn metrics(&self, lat: f64, lon: f64) -> PyResult<PyWalkabilityMetrics> {
        let location = Location::new(lat, lon, "")
            .map_err(|e| core_error("Invalid coordinates", &e))?;
        let base = BaseMetrics::calculate(&self.inner, location.point());

        Ok(PyWalkabilityMetrics {
            inner: fuse(&base, &SignalScores::default(), &FusionOptions::default()),
        })
    }

    /// Infrastructure-only metrics for many ``(lat, lon)`` points, in parallel
    pub fn metrics_many(
        &self,
        py: Python<'_>,
        points: Vec<(f64, f64)>,
    ) -> PyResult<Vec<PyWalkabilityMetrics>> {
        let locations = points
            .into_iter()
            .map(|(lat, lon)| Location::new(lat, lon, ""))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| core_error("Invalid coordinates", &e))?;

        let metrics = py.detach(|| {
            locations
                .par_iter()
                .map(|location| {
                    let base = BaseMetrics::calculate(&self.inner, location.point());
                    fuse(&base, &SignalScores::default(), &FusionOptions::default())
                })
                .collect::<Vec<_>>()
        });

        Ok(metrics
            .into_iter()
            .map(|inner| PyWalkabilityMetrics { inner })
            .collect())
    }

    pub fn data_quality(&self) -> PyDataQuality {
        PyDataQuality {
            inner: DataQuality::assess(&self.inner),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn __repr__(&self) -> String {
        format!(
            "Snapshot with {} streets, {} crossings, {} sidewalks and {} POIs",
            self.inner.streets().len(),
            self.inner.crossings().len(),
            self.inner.sidewalks().len(),
            self.inner.pois().len()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
