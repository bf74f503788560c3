use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] walkability_core::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Query ended without a result")]
    NoResult,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        use walkability_core::Error as CoreError;

        match self {
            ServerError::Core(CoreError::InvalidLocation { .. } | CoreError::InvalidData(_))
            | ServerError::Config(_) => StatusCode::BAD_REQUEST,
            ServerError::Core(CoreError::InfrastructureUnavailable(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
