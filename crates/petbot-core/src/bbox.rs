//! Bounding boxes and per-frame detection results
//!
//! Core abstraction for representing and manipulating detector output.

use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in the pixel grid of the image it was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> f64 {
        f64::from(self.width.max(0)) * f64::from(self.height.max(0))
    }

    /// Center point with floor division, `(x + w / 2, y + h / 2)`.
    pub fn center(&self) -> (i32, i32) {
        (
            self.x.saturating_add(self.width.div_euclid(2)),
            self.y.saturating_add(self.height.div_euclid(2)),
        )
    }

    /// Intersection over union with another box.
    ///
    /// Two degenerate boxes with no area count as a full overlap.
    pub fn iou(&self, other: &BBox) -> f64 {
        let total = self.area() + other.area();
        if total <= f64::EPSILON {
            return 1.0;
        }

        let (ax, ay, aw, ah) = self.extent();
        let (bx, by, bw, bh) = other.extent();
        let x1 = ax.max(bx);
        let y1 = ay.max(by);
        let x2 = (ax + aw).min(bx + bw);
        let y2 = (ay + ah).min(by + bh);

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = (x2 - x1) as f64 * (y2 - y1) as f64;
        intersection / (total - intersection)
    }

    /// Position and size widened so edges never overflow
    fn extent(&self) -> (i64, i64, i64, i64) {
        (
            i64::from(self.x),
            i64::from(self.y),
            i64::from(self.width.max(0)),
            i64::from(self.height.max(0)),
        )
    }

    /// Check if this box overlaps with another by more than `threshold`
    pub fn overlaps(&self, other: &BBox, threshold: f64) -> bool {
        self.iou(other) > threshold
    }
}

/// A single accepted detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(class_id: usize, confidence: f32, bbox: BBox) -> Self {
        Self {
            class_id,
            class_name: String::new(),
            confidence,
            bbox,
        }
    }

    /// Set class name
    pub fn with_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }
}

/// Ordered detections for one frame, with the size of the image their boxes
/// are expressed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    detections: Vec<Detection>,
    /// Width and height of the detector-space image.
    pub space: Size,
}

impl DetectionSet {
    /// Create new empty set for an image of the given size
    pub fn new(space: Size) -> Self {
        Self {
            detections: Vec::new(),
            space,
        }
    }

    /// Create from vector of detections
    pub fn from_vec(detections: Vec<Detection>, space: Size) -> Self {
        Self { detections, space }
    }

    /// Add a detection to the set
    pub fn push(&mut self, detection: Detection) {
        self.detections.push(detection);
    }

    /// Get number of detections
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// The detection the control loop acts on: the first one in output order.
    pub fn first(&self) -> Option<&Detection> {
        self.detections.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }
}

impl IntoIterator for DetectionSet {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}
