use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scan_inference::adapters::{
    client::predict_client::ReqwestPredictClient,
    fs::dataset::{list_images, sample_images, IMAGE_EXTENSIONS},
};
use scan_inference::application::services::ProbeService;
use scan_inference::config::ProbeArgs;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the report on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = ProbeArgs::parse();

    let pool = list_images(&args.dataset, IMAGE_EXTENSIONS)?;
    let samples = sample_images(&pool, args.samples, &mut rand::thread_rng());
    info!(pool = pool.len(), sampled = samples.len(), url = %args.url, "starting probe");

    let client = ReqwestPredictClient::new(args.url.clone(), args.timeout(), args.api_key.clone())?;
    let probe = ProbeService::new(Box::new(client));

    let stdout = std::io::stdout();
    probe.run(&samples, &mut stdout.lock())?;
    Ok(())
}
