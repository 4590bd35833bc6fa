//! Mapping of pipeline failures onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ExtractError;

use super::types::ErrorResponse;

/// Body of the 400 returned when `ranges` is absent.
pub const MISSING_RANGES_MESSAGE: &str = "Please provide page ranges using the \"ranges\" query parameter.";

/// `error` field of every 500 response.
pub const PROCESS_FAILED_MESSAGE: &str = "Failed to process PDF.";

/// Errors surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// `ranges` was not supplied (or was empty).
    MissingRanges,
    /// The query string could not be decoded.
    InvalidQuery(String),
    /// Any failure inside the pipeline.
    Pipeline(ExtractError),
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MissingRanges => ApiError::MissingRanges,
            other => ApiError::Pipeline(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingRanges | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::MissingRanges => ErrorResponse {
                error: MISSING_RANGES_MESSAGE.to_string(),
                details: None,
            },
            ApiError::InvalidQuery(reason) => ErrorResponse {
                error: reason,
                details: None,
            },
            ApiError::Pipeline(err) => ErrorResponse {
                error: PROCESS_FAILED_MESSAGE.to_string(),
                details: Some(err.to_string()),
            },
        };
        (status, Json(body)).into_response()
    }
}
