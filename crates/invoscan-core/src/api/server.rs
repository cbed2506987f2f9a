//! API server setup.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::error::{InvoscanError, Result};
use crate::pipeline::Pipeline;

use super::{
    handlers::{health_handler, upload_handler},
    types::{ApiLimits, ApiState},
};

/// Create the API router with limits taken from the pipeline's configuration.
pub fn create_router(pipeline: Arc<Pipeline>) -> Router {
    let limits = ApiLimits::from_config(pipeline.config());
    create_router_with_limits(pipeline, limits)
}

/// Create the API router with explicit limits.
pub fn create_router_with_limits(pipeline: Arc<Pipeline>, limits: ApiLimits) -> Router {
    let state = ApiState { pipeline, limits };

    let cors_layer = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", post(upload_handler))
        .route("/extract", post(upload_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limits.max_request_body_bytes))
        .layer(RequestBodyLimitLayer::new(limits.max_request_body_bytes))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until the process stops.
pub async fn serve(pipeline: Arc<Pipeline>, host: &str, port: u16) -> Result<()> {
    let ip: IpAddr = host
        .parse()
        .map_err(|e| InvoscanError::Config(format!("invalid host address {:?}: {}", host, e)))?;
    let addr = SocketAddr::new(ip, port);

    let limits = ApiLimits::from_config(pipeline.config());
    info!(
        "Upload limit {} bytes, extraction timeout {:?}",
        limits.max_request_body_bytes, limits.extraction_timeout
    );
    let app = create_router_with_limits(pipeline, limits);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
