//! HTTP API for invoice extraction.
//!
//! # Endpoints
//!
//! - `POST /` and `POST /extract` - multipart upload with one `file` field
//! - `GET /health` - health check
//!
//! ```bash
//! curl -F "file=@invoice.pdf" http://localhost:3000/
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{create_router, create_router_with_limits, serve};
pub use types::{ApiLimits, ApiState, HealthResponse, ItemsBody, PaymentDetailsBody, UploadResponse};
