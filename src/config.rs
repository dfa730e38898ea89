//! Command-line and environment configuration for both binaries.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::auth::ApiKeyPolicy;
use crate::domain::model::{InferenceConfig, ModelId, YoloParams};

/// Serve a YOLO detection model over `POST /predict`.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "INFERENCE_BIND", default_value = "0.0.0.0:8001")]
    pub bind: String,

    /// ONNX model path, loaded once at startup
    #[arg(long, env = "INFERENCE_MODEL_PATH", default_value = "models/best.onnx")]
    pub model: String,

    /// Labels file (one class name per line) overriding the model metadata
    #[arg(long, env = "INFERENCE_LABELS_PATH")]
    pub labels: Option<String>,

    /// Shared secret expected in the x-api-key header; unset or empty leaves the endpoint open
    #[arg(long, env = "INFERENCE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Square model input size
    #[arg(long, env = "INFERENCE_IMGSZ", default_value_t = 640)]
    pub imgsz: u32,

    /// ONNX Runtime intra-op threads per forward pass
    #[arg(long, env = "INFERENCE_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Largest accepted upload, in MiB
    #[arg(long, env = "INFERENCE_MAX_UPLOAD_MB", default_value_t = 20)]
    pub max_upload_mb: usize,
}

impl ServerArgs {
    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            model: ModelId::from_path(self.model.clone()),
            params: YoloParams::with_input_size(self.imgsz),
            intra_threads: self.intra_threads,
            labels_path: self.labels.clone(),
        }
    }

    pub fn auth_policy(&self) -> ApiKeyPolicy {
        ApiKeyPolicy::from_secret(self.api_key.clone())
    }

    pub fn body_limit(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Send a random sample of a local dataset to the inference service and print detection stats.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ProbeArgs {
    /// Predict endpoint
    #[arg(long, env = "PROBE_URL", default_value = "http://localhost:8001/predict")]
    pub url: String,

    /// Directory holding the test images (*.jpg, *.png)
    #[arg(long, env = "PROBE_DATASET", default_value = "../../data/scoliosis-yolov5/test/images")]
    pub dataset: PathBuf,

    /// Number of images to sample
    #[arg(long, default_value_t = 30)]
    pub samples: usize,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Sent as x-api-key when the service is secured
    #[arg(long, env = "INFERENCE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl ProbeArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
