use anyhow::{Context, Result};
use reqwest::blocking::{multipart::Form, Client};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::adapters::http::routes::FILE_FIELD;
use crate::application::dto::PredictionResponse;
use crate::application::ports::PredictClientPort;
use crate::domain::auth::API_KEY_HEADER;
use crate::domain::errors::{DomainError, DomainResult};

/// Blocking HTTP client for `POST /predict`, one request at a time.
pub struct ReqwestPredictClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl ReqwestPredictClient {
    pub fn new(url: impl Into<String>, timeout: Duration, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

impl PredictClientPort for ReqwestPredictClient {
    fn predict_file(&self, path: &Path) -> DomainResult<PredictionResponse> {
        let form = Form::new()
            .file(FILE_FIELD, path)
            .map_err(|e| DomainError::NotFound(format!("{}: {e}", path.display())))?;

        let mut req = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let res = req
            .send()
            .map_err(|e| DomainError::OperationFailed(format!("request to {} failed: {e}", self.url)))?;
        let status = res.status();
        debug!(%status, file = %path.display(), "predict answered");
        if !status.is_success() {
            return Err(DomainError::OperationFailed(format!("HTTP {status}")));
        }

        res.json::<PredictionResponse>()
            .map_err(|e| DomainError::OperationFailed(format!("invalid predict response: {e}")))
    }
}
