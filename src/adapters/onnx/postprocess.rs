//! Letterbox geometry, decoding of raw YOLO output, class-aware NMS.

use anyhow::{bail, Result};
use ndarray::{s, ArrayView2, ArrayViewD, Axis, Ix2};
use tracing::debug;

use crate::domain::class_index::ClassIndex;
use crate::domain::detection::Detection;
use crate::domain::model::YoloParams;

/// A candidate box in model-input coordinates, `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: [f32; 4],
}

/// Reads a `[4 + C, N]` prediction view (`cx, cy, w, h`, then class scores)
/// and keeps the candidates whose best class score is above `conf_threshold`.
pub fn decode_candidates(view: ArrayView2<'_, f32>, conf_threshold: f32) -> Vec<Candidate> {
    if view.shape()[0] <= 4 {
        return Vec::new();
    }
    let num_candidates = view.shape()[1];
    let mut out = Vec::new();

    for i in 0..num_candidates {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &max_score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_score > conf_threshold {
            let cx = view[[0, i]];
            let cy = view[[1, i]];
            let w = view[[2, i]];
            let h = view[[3, i]];
            out.push(Candidate {
                class_id,
                confidence: max_score,
                bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            });
        }
    }
    out
}

/// Intersection over union of two corner-form boxes.
pub fn compute_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let inter_x1 = a[0].max(b[0]);
    let inter_y1 = a[1].max(b[1]);
    let inter_x2 = a[2].min(b[2]);
    let inter_y2 = a[3].min(b[3]);

    let inter_area = (inter_x2 - inter_x1).max(0.0) * (inter_y2 - inter_y1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union_area = area_a + area_b - inter_area;
    if union_area <= 0.0 { 0.0 } else { inter_area / union_area }
}

/// Greedy per-class NMS. Output is sorted by descending confidence and
/// truncated to `max_detections`.
pub fn non_maximum_suppression(
    mut candidates: Vec<Candidate>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Candidate> = Vec::new();
    for cand in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == cand.class_id && compute_iou(&k.bbox, &cand.bbox) > iou_threshold);
        if !suppressed {
            kept.push(cand);
        }
    }
    kept
}

/// Aspect-preserving resize into a `size × size` canvas, content centred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub new_width: u32,
    pub new_height: u32,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl Letterbox {
    /// Padding colour the detector was trained with.
    pub const FILL: u8 = 114;

    pub fn fit(width: u32, height: u32, size: u32) -> Self {
        let scale = size as f32 / width.max(height).max(1) as f32;
        let new_width = ((width as f32 * scale).round() as u32).clamp(1, size);
        let new_height = ((height as f32 * scale).round() as u32).clamp(1, size);
        Self {
            scale,
            new_width,
            new_height,
            pad_x: (size - new_width) / 2,
            pad_y: (size - new_height) / 2,
        }
    }
}

/// Removes the letterbox padding and scale from a model-space box and clamps
/// it to the original image. Returns `None` when nothing of the box is left.
pub fn to_image_space(bbox: &[f32; 4], letterbox: &Letterbox, width: u32, height: u32) -> Option<[f32; 4]> {
    let (w, h) = (width as f32, height as f32);
    let (px, py, r) = (letterbox.pad_x as f32, letterbox.pad_y as f32, letterbox.scale);
    let x1 = ((bbox[0] - px) / r).clamp(0.0, w);
    let y1 = ((bbox[1] - py) / r).clamp(0.0, h);
    let x2 = ((bbox[2] - px) / r).clamp(0.0, w);
    let y2 = ((bbox[3] - py) / r).clamp(0.0, h);
    (x1 < x2 && y1 < y2).then_some([x1, y1, x2, y2])
}

/// Turns the raw `[1, 4 + C, N]` model output into detections on the
/// original `width × height` image: threshold, NMS, unpad, clamp, name.
pub fn detections_from_output(
    output: ArrayViewD<'_, f32>,
    params: &YoloParams,
    letterbox: &Letterbox,
    width: u32,
    height: u32,
    class_index: &ClassIndex,
) -> Result<Vec<Detection>> {
    let dims = output.shape();
    if dims.len() != 3 {
        bail!("unexpected model output rank {}: {:?}", dims.len(), dims);
    }
    if dims[0] == 0 || dims[1] <= 4 {
        bail!("unexpected model output shape {:?}", dims);
    }
    let view = output.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?;

    let num_classes = view.shape()[0] - 4;
    if num_classes != class_index.len() {
        debug!(num_classes, known = class_index.len(), "output class count differs from class index");
    }

    let candidates = decode_candidates(view, params.conf_threshold);
    let kept = non_maximum_suppression(candidates, params.iou_threshold, params.max_detections);

    let mut detections = Vec::with_capacity(kept.len());
    for cand in kept {
        let Some([x1, y1, x2, y2]) = to_image_space(&cand.bbox, letterbox, width, height) else {
            continue;
        };
        detections.push(Detection {
            class_id: cand.class_id,
            class_name: class_index.resolve(cand.class_id)?.to_string(),
            confidence: cand.confidence,
            x1,
            y1,
            x2,
            y2,
        });
    }
    Ok(detections)
}
