//! API server setup.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{Extractor, error::ExtractError};

use super::{
    handlers::{extract_handler, health_handler},
    types::ApiState,
};

/// Create the API router.
///
/// Public so the routes can be nested inside a larger application or driven
/// directly with `tower::ServiceExt::oneshot` in tests.
pub fn create_router(extractor: Arc<Extractor>) -> Router {
    let state = ApiState { extractor };

    Router::new()
        .route("/extract", get(extract_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until the process is stopped.
///
/// # Examples
///
/// ```no_run
/// use rangescribe::{Extractor, ServiceConfig, api::serve};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), rangescribe::ExtractError> {
///     let extractor = Extractor::new(ServiceConfig::default())?;
///     serve("0.0.0.0", 3000, Arc::new(extractor)).await
/// }
/// ```
pub async fn serve(host: impl AsRef<str>, port: u16, extractor: Arc<Extractor>) -> Result<(), ExtractError> {
    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| ExtractError::InvalidConfig(format!("Invalid host address '{}': {}", host.as_ref(), e)))?;

    let addr = SocketAddr::new(ip, port);
    let app = create_router(extractor);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ExtractError::Bind { addr, source: e })?;

    tracing::info!("Server is running and listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ExtractError::Internal(e.to_string()))?;

    Ok(())
}
