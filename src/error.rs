use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Request failures that cannot be reported back as a flash message.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("session error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),
    #[error("invalid header: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )
            .into_response()
    }
}
