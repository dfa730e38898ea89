use async_trait::async_trait;
use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    class_index::ClassIndex,
    detection::Detection,
    errors::{DomainError, DomainResult},
};

/// Shares one loaded engine between requests.
///
/// Forward passes are serialized: the session sits behind a mutex and each
/// call runs on the blocking pool, so concurrent requests queue up instead of
/// stalling the async workers.
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
    class_index: ClassIndex,
}

impl OnnxDetector {
    pub fn new(engine: OnnxYoloEngine) -> Self {
        let class_index = engine.class_index().clone();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            class_index,
        }
    }
}

/// A panic inside one forward pass must not take the engine down for good;
/// the session keeps no state between runs.
fn lock_engine<T>(engine: &Mutex<T>) -> MutexGuard<'_, T> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<Detection>> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock_engine(&engine);
            guard.infer(&image).map_err(DomainError::from)
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("inference task failed: {e}")))?
    }

    fn class_index(&self) -> &ClassIndex {
        &self.class_index
    }
}
