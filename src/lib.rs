use pyo3::prelude::*;

use scoring::{
    PyWalkabilityMetrics, assess_confidence, fuse_scores, score_air_quality, score_heat_island,
    score_slope, score_surface_temperature, score_vegetation, walkability_label,
};
use snapshot::{PyDataQuality, PySnapshot};

pub mod scoring;
pub mod snapshot;

/// A Python module implemented in Rust.
#[pymodule]
fn walkability(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(score_slope, m)?)?;
    m.add_function(wrap_pyfunction!(score_vegetation, m)?)?;
    m.add_function(wrap_pyfunction!(score_surface_temperature, m)?)?;
    m.add_function(wrap_pyfunction!(score_air_quality, m)?)?;
    m.add_function(wrap_pyfunction!(score_heat_island, m)?)?;

    m.add_class::<PyWalkabilityMetrics>()?;
    m.add_function(wrap_pyfunction!(fuse_scores, m)?)?;
    m.add_function(wrap_pyfunction!(walkability_label, m)?)?;
    m.add_function(wrap_pyfunction!(assess_confidence, m)?)?;

    m.add_class::<PySnapshot>()?;
    m.add_class::<PyDataQuality>()?;
    Ok(())
}

#[cfg(feature = "stubgen")]
pyo3_stub_gen::define_stub_info_gatherer!(stub_info);
