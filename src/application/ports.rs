use async_trait::async_trait;
use image::RgbImage;
use std::path::Path;

use crate::application::dto::PredictionResponse;
use crate::domain::{class_index::ClassIndex, detection::Detection, errors::DomainResult, model::ModelId};

/// Black-box detector: RGB image in, thresholded detections out.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>>;
    fn class_index(&self) -> &ClassIndex;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

/// Blocking client used by the dataset probe.
pub trait PredictClientPort {
    fn predict_file(&self, path: &Path) -> DomainResult<PredictionResponse>;
}
