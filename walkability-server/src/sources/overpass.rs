use async_trait::async_trait;
use reqwest::Client;
use walkability_core::acquisition::InfrastructureSource;
use walkability_core::loading::snapshot_from_overpass;
use walkability_core::model::tags::{POI_LANDUSE, POI_NATURAL, POI_RAILWAY, STREET_HIGHWAYS};
use walkability_core::{InfrastructureSnapshot, Location, SourceError};

/// Server-side evaluation limit sent with every query, seconds
const QUERY_TIMEOUT: u32 = 25;

/// Overpass QL selecting every entity the snapshot classifier looks at
pub fn overpass_query(lat: f64, lon: f64, radius: f64) -> String {
    let around = format!("(around:{radius:.0},{lat:.6},{lon:.6})");

    format!(
        "[out:json][timeout:{QUERY_TIMEOUT}];\n(\n  \
         node[\"highway\"=\"crossing\"]{around};\n  \
         node[\"crossing\"]{around};\n  \
         way[\"footway\"=\"sidewalk\"]{around};\n  \
         way[\"highway\"~\"{streets}\"]{around};\n  \
         nwr[\"amenity\"]{around};\n  \
         nwr[\"shop\"]{around};\n  \
         nwr[\"leisure\"]{around};\n  \
         nwr[\"railway\"~\"{railway}\"]{around};\n  \
         nwr[\"landuse\"~\"{landuse}\"]{around};\n  \
         nwr[\"natural\"~\"{natural}\"]{around};\n\
         );\nout center;",
        streets = alternation(&STREET_HIGHWAYS),
        railway = alternation(&POI_RAILWAY),
        landuse = alternation(&POI_LANDUSE),
        natural = alternation(&POI_NATURAL),
    )
}

fn alternation(values: &[&str]) -> String {
    format!("^({})$", values.join("|"))
}

/// Infrastructure from a live Overpass API instance
#[derive(Debug, Clone)]
pub struct OverpassSource {
    client: Client,
    endpoint: String,
    radius: f64,
}

impl OverpassSource {
    pub fn new(client: Client, endpoint: String, radius: f64) -> Self {
        Self {
            client,
            endpoint,
            radius,
        }
    }
}

#[async_trait]
impl InfrastructureSource for OverpassSource {
    async fn fetch(&self, location: &Location) -> Result<InfrastructureSnapshot, SourceError> {
        let query = overpass_query(location.lat, location.lon, self.radius);
        tracing::debug!("Overpass query for {}: {} bytes", location.display_name, query.len());

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(request_error)?
            .error_for_status()
            .map_err(request_error)?;
        let body = response.text().await.map_err(request_error)?;

        snapshot_from_overpass(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

pub(super) fn request_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout
    } else if error.is_decode() {
        SourceError::Decode(error.to_string())
    } else {
        SourceError::Http(error.to_string())
    }
}
