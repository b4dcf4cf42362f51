//! Raw anchor rows to candidate detections.
//!
//! Each row is `[cx, cy, w, h, objectness, class scores...]` with the box
//! given as fractions of the image. The objectness column is not used.

use crate::bbox::{BBox, Detection};
use crate::geometry::Size;
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Index of the first class score in an anchor row.
pub const CLASS_SCORES_OFFSET: usize = 5;

/// Decode one anchor row, scaling it to `space`.
///
/// Returns `None` when the best class score is not strictly above
/// `confidence_threshold`.
pub fn decode_row(row: &[f32], space: Size, confidence_threshold: f32) -> Option<Detection> {
    if row.len() <= CLASS_SCORES_OFFSET {
        trace!(len = row.len(), "skipping short anchor row");
        return None;
    }

    let (class_id, confidence) = argmax(&row[CLASS_SCORES_OFFSET..])?;
    if confidence <= confidence_threshold {
        return None;
    }

    let width = f64::from(space.width);
    let height = f64::from(space.height);
    let cx = f64::from(row[0]) * width;
    let cy = f64::from(row[1]) * height;
    let w = f64::from(row[2]) * width;
    let h = f64::from(row[3]) * height;
    if ![cx, cy, w, h].iter().all(|v| v.is_finite()) {
        trace!("skipping anchor row with non-finite box");
        return None;
    }

    let bbox = BBox::new(
        (cx - (w / 2.0).floor()) as i32,
        (cy - (h / 2.0).floor()) as i32,
        w as i32,
        h as i32,
    );
    Some(Detection::new(class_id, confidence, bbox))
}

/// Decode all rows, keeping row order.
pub fn decode_outputs(rows: &[Vec<f32>], space: Size, confidence_threshold: f32) -> Vec<Detection> {
    #[cfg(feature = "parallel")]
    {
        rows.par_iter()
            .filter_map(|row| decode_row(row, space, confidence_threshold))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        rows.iter()
            .filter_map(|row| decode_row(row, space, confidence_threshold))
            .collect()
    }
}

/// First index of the maximum score
fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}
