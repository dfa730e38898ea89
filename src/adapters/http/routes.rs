use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::HeaderMap,
    Json,
};

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::PredictionResponse;
use crate::domain::auth::API_KEY_HEADER;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// `POST /predict`: auth is checked before the upload is read.
pub async fn predict(
    State(st): State<HttpState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    st.inference.authorize(api_key)?;

    let mut multipart = multipart.map_err(|e| ApiError::unprocessable(e.body_text()))?;
    let image_bytes = read_file_field(&mut multipart).await?;

    let response = st.inference.predict(image_bytes).await?;
    Ok(Json(response))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()));
        }
    }
    Err(ApiError::unprocessable(format!("multipart field '{FILE_FIELD}' is required")))
}
