use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::detection::Detection;

/// "2 scoliosis, 1 normal" style one-liner, used in logs.
pub fn summarize_detections(detections: &[Detection]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for det in detections {
        *counts.entry(det.class_name.as_str()).or_insert(0) += 1;
    }
    let mut parts: Vec<_> = counts.into_iter().collect();
    parts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    parts
        .iter()
        .map(|(label, count)| format!("{} {}", count, label))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Aggregate of one probe run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeSummary {
    pub total: usize,
    pub with_detections: usize,
    pub class_counts: BTreeMap<String, usize>,
}

impl ProbeSummary {
    pub fn record(&mut self, detections: &[Detection]) {
        self.total += 1;
        if !detections.is_empty() {
            self.with_detections += 1;
        }
        for d in detections {
            *self.class_counts.entry(d.class_name.clone()).or_insert(0) += 1;
        }
    }

    /// Fraction of tested images with at least one detection; 0 when nothing was tested.
    pub fn detection_rate(&self) -> f64 {
        self.with_detections as f64 / self.total.max(1) as f64
    }
}

impl fmt::Display for ProbeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==== SUMMARY ====")?;
        writeln!(f, "Images tested: {}", self.total)?;
        writeln!(f, "Images with ≥1 detection: {}", self.with_detections)?;
        writeln!(f, "Detection rate: {:.2}%", self.detection_rate() * 100.0)?;
        write!(f, "Class counts: {:?}", self.class_counts)
    }
}
