//! HTTP endpoints
//!
//! - GET  /health               - liveness and configured signals
//! - GET  /walkability          - final settled update as JSON
//! - GET  /walkability/stream   - every update as a Server-Sent Event
//! - POST /imagery/assess       - sidewalk assessment of one image
//! - POST /imagery/assess-batch - up to ten images

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use walkability_core::scoring::{
    ImageryAssessment, ImageryRequest, assess_imagery, assess_imagery_batch,
};
use walkability_core::{
    AcquisitionConfig, Location, SignalKind, SourceSet, WalkabilityUpdate, compute_walkability,
};

use crate::config::HttpConfig;
use crate::error::{ErrorBody, ServerError};

#[derive(Clone)]
pub struct AppState {
    sources: SourceSet,
    acquisition: Arc<AcquisitionConfig>,
}

impl AppState {
    pub fn new(sources: SourceSet, acquisition: AcquisitionConfig) -> Self {
        Self {
            sources,
            acquisition: Arc::new(acquisition),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/walkability", get(walkability))
        .route("/walkability/stream", get(walkability_stream))
        .route("/imagery/assess", post(assess))
        .route("/imagery/assess-batch", post(assess_batch))
        .with_state(state)
}

/// Router with tracing, CORS, request timeout and concurrency limit
pub fn app(state: AppState, http: &HttpConfig) -> Router {
    router(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(http.request_timeout())
                .concurrency_limit(http.concurrency_limit),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn handle_middleware_error(error: BoxError) -> impl IntoResponse {
    let status = if error.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lon: f64,
    pub name: Option<String>,
    pub country: Option<String>,
}

impl LocationQuery {
    fn into_location(self) -> Result<Location, ServerError> {
        let name = self
            .name
            .unwrap_or_else(|| format!("{:.5}, {:.5}", self.lat, self.lon));
        let location = Location::new(self.lat, self.lon, name)?;
        Ok(match self.country {
            Some(country) => location.with_country_code(country),
            None => location,
        })
    }
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub signals: Vec<SignalKind>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        signals: state.sources.signal_kinds(),
    })
}

async fn walkability(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<WalkabilityUpdate>, ServerError> {
    let location = query.into_location()?;
    tracing::info!("Walkability requested for {}", location.display_name);

    let update = compute_walkability(&state.sources, &state.acquisition, location)?
        .settled()
        .await?
        .ok_or(ServerError::NoResult)?;
    Ok(Json(update))
}

async fn walkability_stream(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ServerError> {
    let location = query.into_location()?;
    tracing::info!("Walkability stream opened for {}", location.display_name);

    let updates = compute_walkability(&state.sources, &state.acquisition, location)?;
    Ok(Sse::new(updates.map(update_event))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn update_event(
    item: Result<WalkabilityUpdate, walkability_core::Error>,
) -> Result<Event, axum::Error> {
    match item {
        Ok(update) => Event::default().event("metrics").json_data(&update),
        Err(error) => Event::default().event("error").json_data(ErrorBody {
            error: error.to_string(),
        }),
    }
}

async fn assess(Json(request): Json<ImageryRequest>) -> Json<ImageryAssessment> {
    Json(assess_imagery(&request))
}

async fn assess_batch(Json(requests): Json<Vec<ImageryRequest>>) -> Json<Vec<ImageryAssessment>> {
    Json(assess_imagery_batch(&requests))
}
