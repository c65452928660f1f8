//! Binary masks and bounding boxes

use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box over a slice, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_row: self.min_row.min(other.min_row),
            min_col: self.min_col.min(other.min_col),
            max_row: self.max_row.max(other.max_row),
            max_col: self.max_col.max(other.max_col),
        }
    }
}

/// Single-object binary label map over one slice.
///
/// Foreground pixels are `true`. Multi-instance label maps are a caller
/// concern; everything below the propagation engine works on strictly
/// binary masks.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    data: Array2<bool>,
}

impl BinaryMask {
    /// All-background mask of the given (rows, cols) shape.
    pub fn zeros(shape: (usize, usize)) -> Self {
        Self {
            data: Array2::from_elem(shape, false),
        }
    }

    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array2<bool> {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.data[[row, col]]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        self.data[[row, col]] = value;
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Logical OR of two masks of identical shape.
    pub fn union(&self, other: &BinaryMask) -> Result<BinaryMask> {
        if self.shape() != other.shape() {
            return Err(Error::DimensionMismatch(format!(
                "cannot union masks of shapes {:?} and {:?}",
                self.shape(),
                other.shape()
            )));
        }
        let mut data = self.data.clone();
        data.zip_mut_with(&other.data, |a, &b| *a = *a || b);
        Ok(BinaryMask { data })
    }

    /// Tight bounding box of the foreground, `None` for an empty mask.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for ((row, col), &value) in self.data.indexed_iter() {
            if !value {
                continue;
            }
            bbox = Some(match bbox {
                None => BoundingBox {
                    min_row: row,
                    min_col: col,
                    max_row: row,
                    max_col: col,
                },
                Some(b) => BoundingBox {
                    min_row: b.min_row.min(row),
                    min_col: b.min_col.min(col),
                    max_row: b.max_row.max(row),
                    max_col: b.max_col.max(col),
                },
            });
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(shape: (usize, usize), points: &[(usize, usize)]) -> BinaryMask {
        let mut mask = BinaryMask::zeros(shape);
        for &(r, c) in points {
            mask.set(r, c, true);
        }
        mask
    }

    #[test]
    fn test_zeros_is_empty() {
        let mask = BinaryMask::zeros((4, 6));
        assert!(mask.is_empty());
        assert_eq!(mask.count(), 0);
        assert_eq!(mask.shape(), (4, 6));
        assert!(mask.bounding_box().is_none());
    }

    #[test]
    fn test_union_combines_foreground() {
        let a = mask_with((4, 4), &[(1, 1)]);
        let b = mask_with((4, 4), &[(2, 2)]);
        let u = a.union(&b).unwrap();
        assert!(u.get(1, 1));
        assert!(u.get(2, 2));
        assert_eq!(u.count(), 2);
    }

    #[test]
    fn test_union_shape_mismatch() {
        let a = BinaryMask::zeros((4, 4));
        let b = BinaryMask::zeros((4, 5));
        assert!(matches!(
            a.union(&b),
            Err(crate::error::Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_bounding_box() {
        let mask = mask_with((8, 8), &[(2, 3), (5, 1), (4, 6)]);
        let bbox = mask.bounding_box().unwrap();
        assert_eq!(bbox.min_row, 2);
        assert_eq!(bbox.max_row, 5);
        assert_eq!(bbox.min_col, 1);
        assert_eq!(bbox.max_col, 6);
        assert_eq!(bbox.height(), 4);
        assert_eq!(bbox.width(), 6);
        assert!(bbox.contains(4, 6));
        assert!(!bbox.contains(1, 1));
    }

    #[test]
    fn test_bounding_box_union() {
        let a = mask_with((8, 8), &[(1, 1)]).bounding_box().unwrap();
        let b = mask_with((8, 8), &[(5, 3)]).bounding_box().unwrap();
        let u = a.union(&b);
        assert_eq!(u.min_row, 1);
        assert_eq!(u.max_row, 5);
        assert_eq!(u.min_col, 1);
        assert_eq!(u.max_col, 3);
    }
}
