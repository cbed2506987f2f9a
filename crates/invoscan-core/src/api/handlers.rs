//! API request handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use tracing::{debug, warn};

use crate::error::InvoscanError;
use crate::pipeline::Stage;

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse, UploadResponse},
};

/// Upload endpoint handler.
///
/// POST / and POST /extract
///
/// Accepts multipart form data with one file part named `file`. Other parts
/// are ignored, as are further `file` parts after the first. Text extraction
/// runs on the blocking pool, bounded by the configured timeout.
pub async fn upload_handler(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if upload.is_some() || field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        debug!("Received {:?} ({} bytes)", file_name, data.len());
        upload = Some((file_name, data));
    }

    let (file_name, data) = upload.ok_or(InvoscanError::NoFile)?;

    let pipeline = state.pipeline.clone();
    let task = tokio::task::spawn_blocking(move || pipeline.run_upload(&file_name, &data));

    let joined = match state.limits.extraction_timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("Request {}: extraction still running after {}s", Stage::Failed, limit.as_secs());
                return Err(InvoscanError::Timeout(limit.as_secs()).into());
            }
        },
        None => task.await,
    };

    let result = joined.map_err(|e| {
        warn!("Request {}: extraction task failed: {}", Stage::Failed, e);
        ApiError::internal()
    })??;

    debug!("Request {} from {}", Stage::Responded, result.source);
    Ok(Json(UploadResponse::from_result(
        result,
        &state.pipeline.config().response,
    )))
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
