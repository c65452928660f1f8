//! Slice preprocessing helpers

use ndarray::{Array3, ArrayView2};

/// Normalize a float slice to uint8 and replicate it into the three
/// channel layout the encoder expects.
///
/// Values are min/max scaled to [0, 255]; a constant-valued (or empty)
/// slice maps to all zeros rather than dividing by zero.
pub fn to_rgb_image(plane: ArrayView2<'_, f32>) -> Array3<u8> {
    let (rows, cols) = plane.dim();
    let mut image = Array3::<u8>::zeros((rows, cols, 3));

    let min = plane.iter().copied().fold(f32::INFINITY, f32::min);
    let max = plane.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return image;
    }

    for ((row, col), &value) in plane.indexed_iter() {
        let scaled = ((value - min) / range * 255.0).round().clamp(0.0, 255.0) as u8;
        for channel in 0..3 {
            image[[row, col, channel]] = scaled;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_to_rgb_image_scales_to_full_range() {
        let plane = Array2::from_shape_fn((2, 2), |(r, c)| (r * 2 + c) as f32);
        let image = to_rgb_image(plane.view());
        assert_eq!(image[[0, 0, 0]], 0);
        assert_eq!(image[[1, 1, 0]], 255);
    }

    #[test]
    fn test_to_rgb_image_replicates_channels() {
        let plane = Array2::from_shape_fn((3, 4), |(r, c)| (r + c) as f32);
        let image = to_rgb_image(plane.view());
        for ((r, c, _), _) in image.indexed_iter() {
            assert_eq!(image[[r, c, 0]], image[[r, c, 1]]);
            assert_eq!(image[[r, c, 1]], image[[r, c, 2]]);
        }
    }

    #[test]
    fn test_to_rgb_image_constant_slice() {
        let plane = Array2::from_elem((4, 4), 7.5f32);
        let image = to_rgb_image(plane.view());
        assert!(image.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_to_rgb_image_empty_slice() {
        let plane = Array2::<f32>::zeros((0, 5));
        let image = to_rgb_image(plane.view());
        assert_eq!(image.dim(), (0, 5, 3));
    }
}
