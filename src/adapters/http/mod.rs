pub mod error;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/predict", post(routes::predict))
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
