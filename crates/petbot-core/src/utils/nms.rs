//! Non-maximum suppression utilities

use crate::bbox::Detection;
use serde::{Deserialize, Serialize};

/// Offset between the configured confidence threshold and the overlap
/// threshold when the two are left coupled.
pub const COUPLED_OVERLAP_MARGIN: f32 = 0.1;

/// Thresholds for one suppression pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NmsParams {
    /// Candidates must score strictly above this.
    pub score_threshold: f32,
    /// A candidate is dropped when its IoU with a kept box is above this.
    pub nms_threshold: f32,
}

impl NmsParams {
    pub fn new(score_threshold: f32, nms_threshold: f32) -> Self {
        Self {
            score_threshold,
            nms_threshold,
        }
    }

    /// Derive both thresholds from one confidence value, the overlap
    /// threshold being `confidence - 0.1`.
    pub fn coupled(confidence_threshold: f32) -> Self {
        Self::new(
            confidence_threshold,
            confidence_threshold - COUPLED_OVERLAP_MARGIN,
        )
    }
}

/// Non-maximum suppression utility functions
pub struct NonMaxSuppressionUtils;

impl NonMaxSuppressionUtils {
    /// Greedy class-agnostic NMS.
    ///
    /// Candidates are visited by descending confidence (ties keep their input
    /// order) and each survivor suppresses every later candidate it overlaps.
    /// The returned detections are in visiting order.
    pub fn apply_nms(candidates: Vec<Detection>, params: &NmsParams) -> Vec<Detection> {
        let mut boxes: Vec<Detection> = candidates
            .into_iter()
            .filter(|d| d.confidence > params.score_threshold)
            .collect();

        if boxes.is_empty() {
            return boxes;
        }

        // Stable sort so equal scores stay in anchor order
        boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let threshold = f64::from(params.nms_threshold);
        let mut keep = Vec::new();
        let mut suppressed = vec![false; boxes.len()];

        for i in 0..boxes.len() {
            if suppressed[i] {
                continue;
            }

            for j in (i + 1)..boxes.len() {
                if !suppressed[j] && boxes[i].bbox.overlaps(&boxes[j].bbox, threshold) {
                    suppressed[j] = true;
                }
            }

            keep.push(boxes[i].clone());
        }

        keep
    }
}
