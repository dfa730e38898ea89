//! Dataset listing and sampling for the probe.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions the probe picks up. Matching is exact, like a `*.jpg` glob.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Files directly inside `dir` whose extension is in `extensions`, sorted.
/// A missing directory yields an empty pool, like a glob that matches nothing.
pub fn list_images(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!("dataset directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read dataset directory {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));
        if ext_ok && path.is_file() {
            images.push(path);
        }
    }
    images.sort();
    debug!(dir = %dir.display(), found = images.len(), "listed dataset");
    Ok(images)
}

/// Up to `n` paths chosen without replacement.
pub fn sample_images<R: Rng + ?Sized>(pool: &[PathBuf], n: usize, rng: &mut R) -> Vec<PathBuf> {
    pool.choose_multiple(rng, n).cloned().collect()
}
