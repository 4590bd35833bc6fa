//! API request handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use super::{
    error::ApiError,
    types::{ApiState, ExtractQuery, HealthResponse},
};

/// Extract endpoint handler.
///
/// GET /extract?ranges=2-8
///
/// Runs the whole pipeline for the requested range and returns the page
/// sections as plain text. A missing or empty `ranges` is rejected before any
/// downstream work; every pipeline failure becomes a 500 carrying the
/// failure message in `details`.
pub async fn extract_handler(
    State(state): State<ApiState>,
    query: Result<Query<ExtractQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    let Some(ranges) = query.ranges.filter(|r| !r.is_empty()) else {
        return Err(ApiError::MissingRanges);
    };

    info!("Received request for ranges: {}", ranges);

    match state.extractor.extract(&ranges).await {
        Ok(output) => Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], output.text).into_response()),
        Err(e) => {
            error!("An error occurred during the process: {}", e);
            Err(e.into())
        }
    }
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
