use serde::{Deserialize, Serialize};

use crate::domain::detection::Detection;

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub num_detections: usize,
    pub detections: Vec<Detection>,
}

impl From<Vec<Detection>> for PredictionResponse {
    fn from(detections: Vec<Detection>) -> Self {
        Self {
            num_detections: detections.len(),
            detections,
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
