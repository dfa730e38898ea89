use std::sync::Arc;
use crate::application::services::InferenceService;

/// Shared state for the axum handlers. Built once at startup, cloned per request.
#[derive(Clone)]
pub struct HttpState {
    /// Predict use case (auth gate + detector).
    pub inference: Arc<InferenceService>,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}
