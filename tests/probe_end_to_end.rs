//! Dataset probe against a live loopback server backed by the fake detector.

#![allow(clippy::unwrap_used)]

mod common;

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{png, state, FakeDetector};
use scan_inference::adapters::client::predict_client::ReqwestPredictClient;
use scan_inference::adapters::fs::dataset::{list_images, sample_images, IMAGE_EXTENSIONS};
use scan_inference::adapters::http::{router, state::HttpState};
use scan_inference::application::ports::PredictClientPort;
use scan_inference::application::services::ProbeService;
use scan_inference::domain::auth::ApiKeyPolicy;

/// Runs the router on its own runtime thread and returns the bound address.
fn spawn_server(state: HttpState) -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router(state)).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

fn write_dataset(dir: &Path, images: usize) {
    for i in 0..images {
        let name = if i % 2 == 0 { format!("img{i}.png") } else { format!("img{i}.jpg") };
        // PNG bytes under a .jpg name still decode: the format is sniffed.
        fs::write(dir.join(name), png(32, 32)).unwrap();
    }
    fs::write(dir.join("notes.txt"), b"ignored").unwrap();
}

fn client(addr: SocketAddr, api_key: Option<&str>) -> ReqwestPredictClient {
    ReqwestPredictClient::new(
        format!("http://{addr}/predict"),
        Duration::from_secs(30),
        api_key.map(str::to_string),
    )
    .unwrap()
}

#[test]
fn five_image_dataset_is_sampled_in_full() {
    let addr = spawn_server(state(FakeDetector::with_hits(vec![(0, 0.8, 0.5)]), ApiKeyPolicy::Open));
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), 5);

    let pool = list_images(dir.path(), IMAGE_EXTENSIONS).unwrap();
    let samples = sample_images(&pool, 30, &mut StdRng::seed_from_u64(1));
    assert_eq!(samples.len(), 5);

    let mut out = Vec::new();
    let summary = ProbeService::new(Box::new(client(addr, None))).run(&samples, &mut out).unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.with_detections, 5);
    assert_eq!(summary.class_counts.get("scoliosis"), Some(&5));

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().filter(|l| l.ends_with(": 1 detections")).count(), 5);
    assert!(text.contains("Images tested: 5"));
    assert!(text.contains("Detection rate: 100.00%"));
}

#[test]
fn secured_service_requires_the_client_key() {
    let addr = spawn_server(state(FakeDetector::empty(), ApiKeyPolicy::from_secret(Some("abc123".into()))));
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), 2);
    let samples = list_images(dir.path(), IMAGE_EXTENSIONS).unwrap();

    let mut out = Vec::new();
    let summary = ProbeService::new(Box::new(client(addr, Some("wrong")))).run(&samples, &mut out).unwrap();
    assert_eq!(summary.total, 0);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("❌ Error on").count(), 2);
    assert!(text.contains("Detection rate: 0.00%"));

    let ok = client(addr, Some("abc123")).predict_file(&samples[0]).unwrap();
    assert_eq!(ok.num_detections, 0);
    assert!(ok.detections.is_empty());
}

#[test]
fn unreachable_service_is_reported_and_skipped() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), 1);
    let samples = list_images(dir.path(), IMAGE_EXTENSIONS).unwrap();

    let mut out = Vec::new();
    let summary = ProbeService::new(Box::new(client(addr, None))).run(&samples, &mut out).unwrap();
    assert_eq!(summary.total, 0);
    assert!(String::from_utf8(out).unwrap().contains("❌ Error on img0.png"));
}

#[test]
fn missing_dataset_prints_an_empty_summary() {
    let dir = tempfile::tempdir().unwrap();
    let pool = list_images(&dir.path().join("test/images"), IMAGE_EXTENSIONS).unwrap();
    let samples = sample_images(&pool, 30, &mut StdRng::seed_from_u64(3));
    assert!(samples.is_empty());

    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let mut out = Vec::new();
    let summary = ProbeService::new(Box::new(client(addr, None))).run(&samples, &mut out).unwrap();
    assert_eq!(summary.total, 0);
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Images tested: 0"));
    assert!(text.contains("Detection rate: 0.00%"));
}
