//! HTTP front end for the extraction pipeline.
//!
//! # Endpoints
//!
//! - `GET /extract?ranges=<pages>` - Split, rasterise and extract text for the given page range
//! - `GET /health` - Health check endpoint
//!
//! # Responses
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | success | 200 | `text/plain` extracted text |
//! | `ranges` missing or empty | 400 | `{"error": "..."}` |
//! | any pipeline failure | 500 | `{"error": "Failed to process PDF.", "details": "..."}` |
//!
//! # cURL Examples
//!
//! ```bash
//! curl "http://localhost:3000/extract?ranges=2-8"
//! curl http://localhost:3000/health
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::{ApiError, MISSING_RANGES_MESSAGE, PROCESS_FAILED_MESSAGE};
pub use handlers::{extract_handler, health_handler};
pub use server::{create_router, serve};
pub use types::{ApiState, ErrorResponse, ExtractQuery, HealthResponse};
