use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use clinic_types::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Appointment {0} not found")]
    NotFound(i64),

    #[error("Appointment {0} is already approved")]
    AlreadyApproved(i64),

    #[error("Token assignment failed: {0:#}")]
    TokenAssignment(#[source] anyhow::Error),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Appointment not found"),
            ApiError::AlreadyApproved(_) => (StatusCode::CONFLICT, "Appointment already approved"),
            ApiError::TokenAssignment(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Token assignment failed"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error"),
        };

        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: message.to_string(),
        });

        (status, body).into_response()
    }
}
