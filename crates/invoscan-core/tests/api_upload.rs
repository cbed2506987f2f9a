#![cfg(feature = "api")]
//! Upload endpoint tests driving the router with multipart bodies.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use image::DynamicImage;
use invoscan_core::api::{ApiLimits, create_router, create_router_with_limits};
use invoscan_core::error::OcrError;
use invoscan_core::{InvoscanConfig, OcrBackend, OcrResult, Pipeline, TextBox};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "X-INVOSCAN-BOUNDARY";

const INVOICE_TEXT: &str = "\
Invoice Date: 01/15/2024
Description Unit Cost Quantity Amount
Widget A 10.00 3 30.00
Subtotal: $30.00
Tax: $3.00
TOTAL: $33.00";

struct ScriptedOcr {
    text: &'static str,
    delay: Option<Duration>,
}

impl OcrBackend for ScriptedOcr {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let text_box = TextBox {
            bbox: [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0],
            text: self.text.to_string(),
            confidence: 1.0,
        };
        Ok(OcrResult::from_boxes(vec![text_box], (image.width(), image.height()), 0))
    }
}

fn pipeline(upload_dir: &Path, ocr: ScriptedOcr) -> Arc<Pipeline> {
    let mut config = InvoscanConfig::default();
    config.server.upload_dir = Some(upload_dir.to_path_buf());
    Arc::new(Pipeline::with_ocr(config, Arc::new(ocr)).unwrap())
}

fn router(upload_dir: &Path) -> Router {
    create_router(pipeline(
        upload_dir,
        ScriptedOcr {
            text: INVOICE_TEXT,
            delay: None,
        },
    ))
}

fn png_bytes() -> Vec<u8> {
    let mut data = Vec::new();
    DynamicImage::new_rgb8(16, 16)
        .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
        .unwrap();
    data
}

fn multipart_request(uri: &str, field: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), 1_000_000).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_image_upload_returns_fields() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(multipart_request("/", "file", Some("invoice.png"), &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = serde_json::from_str(&body_text(response).await).unwrap();

    assert_eq!(value["message"], "Text extracted successfully");
    assert_eq!(value["text"], INVOICE_TEXT);
    assert_eq!(value["paymentDetails"]["total"], "33.00");
    assert_eq!(value["paymentDetails"]["subtotal"], "30.00");
    assert_eq!(value["paymentDetails"]["tax"], "3.00");
    assert_eq!(value["paymentDetails"]["date"], "01/15/2024");
    assert_eq!(value["paymentDetails"]["accountNumber"], "Not found");
    assert_eq!(value["paymentDetails"].as_object().unwrap().len(), 8);

    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["description"], "Widget A");
    assert_eq!(items[0]["unitPrice"], "10.00");
    assert_eq!(items[0]["quantity"], "3");
    assert_eq!(items[0]["amount"], "30.00");

    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_extract_route_is_an_alias() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(multipart_request("/extract", "file", Some("scan.JPG.png"), &png_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(multipart_request("/", "document", Some("invoice.png"), &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "No file uploaded.");
}

#[tokio::test]
async fn test_file_field_without_filename_is_not_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(multipart_request("/", "file", None, b"just text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_extensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["notes.txt", "letter.docx"] {
        let response = router(dir.path())
            .oneshot(multipart_request("/", "file", Some(name), b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", name);
        assert_eq!(
            body_text(response).await,
            "Unsupported file type. Please upload a JPEG, PNG, or PDF."
        );
    }
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_undecodable_image_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["broken.png", "broken.jpg", "broken.jpeg"] {
        let response = router(dir.path())
            .oneshot(multipart_request("/", "file", Some(name), b"not really an image"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", name);
        assert_eq!(body_text(response).await, "An error occurred while processing the file.");
    }
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_broken_pdf_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let response = router(dir.path())
        .oneshot(multipart_request("/", "file", Some("invoice.pdf"), b"%PDF-1.4 truncated"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let limits = ApiLimits {
        max_request_body_bytes: 64,
        extraction_timeout: None,
    };
    let app = create_router_with_limits(
        pipeline(
            dir.path(),
            ScriptedOcr {
                text: INVOICE_TEXT,
                delay: None,
            },
        ),
        limits,
    );

    let response = app
        .oneshot(multipart_request("/", "file", Some("invoice.png"), &png_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_slow_extraction_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let limits = ApiLimits {
        max_request_body_bytes: 1024 * 1024,
        extraction_timeout: Some(Duration::from_millis(50)),
    };
    let app = create_router_with_limits(
        pipeline(
            dir.path(),
            ScriptedOcr {
                text: INVOICE_TEXT,
                delay: Some(Duration::from_millis(500)),
            },
        ),
        limits,
    );

    let response = app
        .oneshot(multipart_request("/", "file", Some("invoice.png"), &png_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}
