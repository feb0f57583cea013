use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("service registry unreachable: {detail}")]
    RegistryUnavailable { detail: String },

    #[error("no healthy instance of {service}")]
    ServiceUnavailable { service: String },

    #[error("{service} unavailable: {detail}")]
    Unavailable { service: String, detail: String },

    #[error("{service} rejected the request ({status}): {detail}")]
    UpstreamInvalid {
        service: String,
        status: u16,
        detail: String,
    },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("invalid booking window: {start} does not precede {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Configuration error in {field}: {message}")]
    ConfigError { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

/// Maps the taxonomy onto HTTP statuses. Degradable failures are absorbed
/// before they reach this point; whatever arrives here is meant for the end
/// client. 500-class details are logged server-side and replaced with a
/// generic message.
impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        match self {
            LinkError::RegistryUnavailable { detail } => {
                tracing::error!("service discovery unreachable: {}", detail);
                error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service discovery unavailable".to_string(),
                )
            }
            err @ LinkError::ServiceUnavailable { .. } => {
                error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            err @ LinkError::Unavailable { .. } => {
                error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            err @ LinkError::UpstreamInvalid { .. } => {
                error_response(StatusCode::BAD_REQUEST, err.to_string())
            }
            err @ LinkError::NotFound { .. } => {
                error_response(StatusCode::NOT_FOUND, err.to_string())
            }
            err @ LinkError::InvalidRange { .. } => {
                error_response(StatusCode::BAD_REQUEST, err.to_string())
            }
            err => {
                tracing::error!("internal error: {}", err);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        }
    }
}
