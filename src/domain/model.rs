use serde::{Deserialize, Serialize};

/// Minimum score for a detection to be reported. Fixed, not configurable.
pub const CONFIDENCE_THRESHOLD: f32 = 0.25;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,      // logical name, e.g. "best"
    pub onnx_path: String, // filesystem path
}

impl ModelId {
    pub fn from_path(onnx_path: impl Into<String>) -> Self {
        let onnx_path = onnx_path.into();
        let name = std::path::Path::new(&onnx_path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".into());
        Self { name, onnx_path }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoloParams {
    pub input_size: u32,       // 640 typical
    pub conf_threshold: f32,   // 0..1
    pub iou_threshold: f32,    // 0..1
    pub max_detections: usize, // e.g. 300
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: CONFIDENCE_THRESHOLD,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

impl YoloParams {
    pub fn with_input_size(input_size: u32) -> Self {
        Self { input_size, ..Self::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub model: ModelId,
    pub params: YoloParams,
    pub intra_threads: usize,
    /// Overrides the class names stored in the model metadata.
    pub labels_path: Option<String>,
}
