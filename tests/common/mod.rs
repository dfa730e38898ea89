//! Shared fixtures: a fake detector standing in for the ONNX engine,
//! in-memory images and hand-built multipart bodies.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};

use scan_inference::adapters::http::{router, state::HttpState};
use scan_inference::application::{ports::DetectorPort, services::InferenceService};
use scan_inference::domain::{
    auth::ApiKeyPolicy,
    class_index::ClassIndex,
    detection::Detection,
    errors::{DomainError, DomainResult},
};

pub const BOUNDARY: &str = "X-SCAN-INFERENCE-BOUNDARY";

/// Answers with boxes derived from the image size, or with a fixed failure.
pub struct FakeDetector {
    class_index: ClassIndex,
    /// `(class_id, confidence, fraction of the image covered)`
    hits: Vec<(usize, f32, f32)>,
    fail: bool,
}

impl FakeDetector {
    pub fn with_hits(hits: Vec<(usize, f32, f32)>) -> Self {
        Self {
            class_index: ClassIndex::from_labels(["scoliosis", "normal"]),
            hits,
            fail: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::empty() }
    }
}

#[async_trait]
impl DetectorPort for FakeDetector {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>> {
        if self.fail {
            return Err(DomainError::OperationFailed("session run failed".into()));
        }
        let (w, h) = (image.width() as f32, image.height() as f32);
        self.hits
            .iter()
            .map(|&(class_id, confidence, frac)| {
                Ok(Detection {
                    class_id,
                    class_name: self.class_index.resolve(class_id)?.to_string(),
                    confidence,
                    x1: 0.0,
                    y1: 0.0,
                    x2: w * frac,
                    y2: h * frac,
                })
            })
            .collect()
    }

    fn class_index(&self) -> &ClassIndex {
        &self.class_index
    }
}

pub fn state(detector: FakeDetector, auth: ApiKeyPolicy) -> HttpState {
    HttpState {
        inference: Arc::new(InferenceService::new(Arc::new(detector), auth)),
        body_limit: 10 * 1024 * 1024,
    }
}

pub fn app(detector: FakeDetector, auth: ApiKeyPolicy) -> axum::Router {
    router(state(detector, auth))
}

pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 255) as u8, (y * 13 % 255) as u8, 128])
    }));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// Single-part multipart body under `field`.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
