use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::{
    application::{
        dto::PredictionResponse,
        ports::{DetectorPort, PredictClientPort},
    },
    domain::{
        auth::ApiKeyPolicy,
        class_index::ClassIndex,
        errors::{DomainError, DomainResult},
        summary::{summarize_detections, ProbeSummary},
    },
};

/// Decodes any raster format the `image` crate understands and coerces it to RGB.
pub fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    let image = image::load_from_memory(bytes).map_err(|e| DomainError::InvalidImage(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Predict use case: auth gate, decode, one forward pass, response mapping.
#[derive(Clone)]
pub struct InferenceService {
    detector: Arc<dyn DetectorPort>,
    auth: ApiKeyPolicy,
}

impl InferenceService {
    pub fn new(detector: Arc<dyn DetectorPort>, auth: ApiKeyPolicy) -> Self {
        Self { detector, auth }
    }

    pub fn authorize(&self, provided: Option<&str>) -> DomainResult<()> {
        self.auth.check(provided)
    }

    pub fn class_index(&self) -> &ClassIndex {
        self.detector.class_index()
    }

    /// Decoding runs on the blocking pool like the forward pass: a 20 MiB
    /// upload must not hold an async worker.
    pub async fn predict<B>(&self, image_bytes: B) -> DomainResult<PredictionResponse>
    where
        B: AsRef<[u8]> + Send + 'static,
    {
        let image = tokio::task::spawn_blocking(move || decode_rgb(image_bytes.as_ref()))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("decode task failed: {e}")))??;
        let (width, height) = image.dimensions();

        let t = Instant::now();
        let detections = self.detector.detect(image).await?;
        debug!(
            width,
            height,
            infer_ms = t.elapsed().as_secs_f32() * 1000.0,
            "detected [{}]",
            summarize_detections(&detections)
        );

        Ok(detections.into())
    }
}

/// Sends each sampled file to the service and tallies the answers.
pub struct ProbeService {
    client: Box<dyn PredictClientPort>,
}

impl ProbeService {
    pub fn new(client: Box<dyn PredictClientPort>) -> Self {
        Self { client }
    }

    /// Runs the sample sequentially, writing one line per image and the
    /// summary to `out`. Failed requests are reported and skipped.
    pub fn run<W: Write>(&self, samples: &[PathBuf], out: &mut W) -> std::io::Result<ProbeSummary> {
        let mut summary = ProbeSummary::default();

        for path in samples {
            let name = file_name(path);
            match self.client.predict_file(path) {
                Ok(res) => {
                    summary.record(&res.detections);
                    writeln!(out, "{}: {} detections", name, res.num_detections)?;
                }
                Err(e) => {
                    warn!("request for {} failed: {}", path.display(), e);
                    writeln!(out, "❌ Error on {}", name)?;
                }
            }
        }

        info!(total = summary.total, with_detections = summary.with_detections, "probe finished");
        writeln!(out)?;
        writeln!(out, "{summary}")?;
        Ok(summary)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
