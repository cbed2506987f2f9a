//! API request state and response types.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::models::config::{InvoscanConfig, ResponseConfig};
use crate::models::invoice::{ExtractionResult, LineItem, PaymentDetails};
use crate::pipeline::Pipeline;

pub const SUCCESS_MESSAGE: &str = "Text extracted successfully";
pub const NO_PAYMENT_DETAILS: &str = "No payment details found";
pub const NO_ITEMS: &str = "No items found";

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub limits: ApiLimits,
}

/// Request size and time limits.
#[derive(Debug, Clone, Copy)]
pub struct ApiLimits {
    /// Maximum request body size in bytes.
    pub max_request_body_bytes: usize,
    /// How long to wait for text extraction, if bounded.
    pub extraction_timeout: Option<Duration>,
}

impl ApiLimits {
    pub fn from_config(config: &InvoscanConfig) -> Self {
        Self {
            max_request_body_bytes: config.server.max_upload_bytes(),
            extraction_timeout: config.server.extraction_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// `paymentDetails`: the field map, or a placeholder when no fields are configured.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PaymentDetailsBody {
    Fields(PaymentDetails),
    Placeholder(&'static str),
}

/// `items`: the rows, or a placeholder when enabled and none were found.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ItemsBody {
    Rows(Vec<LineItem>),
    Placeholder(&'static str),
}

/// Successful upload reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub payment_details: PaymentDetailsBody,
    pub items: ItemsBody,
    pub text: String,
}

impl UploadResponse {
    pub fn from_result(result: ExtractionResult, response: &ResponseConfig) -> Self {
        let payment_details = if result.payment_details.is_empty() {
            PaymentDetailsBody::Placeholder(NO_PAYMENT_DETAILS)
        } else {
            PaymentDetailsBody::Fields(result.payment_details)
        };

        let items = if result.items.is_empty() && response.empty_placeholders {
            ItemsBody::Placeholder(NO_ITEMS)
        } else {
            ItemsBody::Rows(result.items)
        };

        Self {
            message: SUCCESS_MESSAGE.to_string(),
            payment_details,
            items,
            text: result.raw_text,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::FieldValue;
    use serde_json::json;

    fn result(items: Vec<LineItem>, details: PaymentDetails) -> ExtractionResult {
        ExtractionResult {
            raw_text: "text".to_string(),
            items,
            payment_details: details,
            source: "test",
        }
    }

    #[test]
    fn test_response_shape() {
        let mut details = PaymentDetails::new();
        details.insert("total", FieldValue::Found("10.00".into()));
        details.insert("tax", FieldValue::NotFound);

        let response = UploadResponse::from_result(result(Vec::new(), details), &ResponseConfig::default());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "Text extracted successfully",
                "paymentDetails": {"total": "10.00", "tax": "Not found"},
                "items": [],
                "text": "text"
            })
        );
    }

    #[test]
    fn test_placeholders() {
        let config = ResponseConfig {
            empty_placeholders: true,
        };
        let response = UploadResponse::from_result(result(Vec::new(), PaymentDetails::new()), &config);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["paymentDetails"], "No payment details found");
        assert_eq!(value["items"], "No items found");
    }
}
