//! API request and response types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Extractor;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub extractor: Arc<Extractor>,
}

/// Query string of `GET /extract`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractQuery {
    /// Page range passed verbatim to the splitting service, e.g. `2-8`.
    pub ranges: Option<String>,
}

/// JSON error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Underlying failure message; only present on 500 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
