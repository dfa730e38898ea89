use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scan_inference::adapters::{
    http::{router, state::HttpState},
    onnx::{detector::OnnxDetector, model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
};
use scan_inference::application::{ports::ModelCatalogPort, services::InferenceService};
use scan_inference::config::ServerArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logs (RUST_LOG=info by default)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = ServerArgs::parse();
    let infer = args.inference_config();

    // 2. Load the model exactly once. Any failure here aborts startup.
    info!("🔧 Loading model {} ...", infer.model.onnx_path);
    OnnxModelCatalog::new().validate_model(&infer.model).await?;
    let engine = tokio::task::spawn_blocking(move || OnnxYoloEngine::load(&infer)).await??;
    let detector = Arc::new(OnnxDetector::new(engine));

    // 3. Use case + auth gate
    let auth = args.auth_policy();
    if auth.is_open() {
        warn!("INFERENCE_API_KEY not set, /predict accepts unauthenticated requests");
    }
    let inference = Arc::new(InferenceService::new(detector, auth));
    let classes: Vec<_> = inference.class_index().iter().map(|(id, name)| format!("{id}={name}")).collect();
    info!("classes: {}", classes.join(", "));

    // 4. Router
    let state = HttpState {
        inference,
        body_limit: args.body_limit(),
    };
    let app = router(state);

    // 5. Serve
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("🚀 Inference server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
