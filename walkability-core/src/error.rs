use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Infrastructure data unavailable: {0}")]
    InfrastructureUnavailable(String),
    #[error("Invalid location: lat={lat}, lon={lon}")]
    InvalidLocation { lat: f64, lon: f64 },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure reported by an external data collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}
