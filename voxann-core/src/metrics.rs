//! Mask overlap metrics

use crate::mask::BinaryMask;

const IOU_EPS: f32 = 1e-7;

/// Intersection over union of two binary masks of identical shape.
///
/// The epsilon in the denominator keeps two empty masks at ~0 instead
/// of dividing by zero; identical non-empty masks come out at
/// 1 / (1 + eps), just below 1. No resizing is performed.
pub fn compute_iou(a: &BinaryMask, b: &BinaryMask) -> f32 {
    debug_assert_eq!(a.shape(), b.shape(), "iou requires same-shape masks");
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (&x, &y) in a.data().iter().zip(b.data().iter()) {
        if x && y {
            intersection += 1;
        }
        if x || y {
            union += 1;
        }
    }
    intersection as f32 / (union as f32 + IOU_EPS)
}
