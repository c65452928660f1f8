//! Mask volumes and annotation sets

use crate::error::{Error, Result};
use crate::mask::BinaryMask;
use ndarray::{Array3, Axis};

/// Output volume of the propagation engine: one binary mask per slice,
/// mutated in place slice by slice. Starts all-background.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskVolume {
    data: Array3<bool>,
}

impl MaskVolume {
    pub fn zeros(depth: usize, rows: usize, cols: usize) -> Self {
        Self {
            data: Array3::from_elem((depth, rows, cols), false),
        }
    }

    pub fn depth(&self) -> usize {
        self.data.shape()[0]
    }

    /// Shape of a single slice as (rows, cols).
    pub fn slice_shape(&self) -> (usize, usize) {
        (self.data.shape()[1], self.data.shape()[2])
    }

    pub fn data(&self) -> &Array3<bool> {
        &self.data
    }

    /// Committed mask at slice `z`.
    pub fn slice_mask(&self, z: usize) -> BinaryMask {
        BinaryMask::from_array(self.data.index_axis(Axis(0), z).to_owned())
    }

    /// Commit a mask at slice `z`, replacing whatever was there.
    pub fn set_slice(&mut self, z: usize, mask: &BinaryMask) -> Result<()> {
        if z >= self.depth() {
            return Err(Error::Annotation(format!(
                "slice index {} out of range for volume of depth {}",
                z,
                self.depth()
            )));
        }
        if mask.shape() != self.slice_shape() {
            return Err(Error::DimensionMismatch(format!(
                "mask shape {:?} does not match volume slice shape {:?}",
                mask.shape(),
                self.slice_shape()
            )));
        }
        self.data.index_axis_mut(Axis(0), z).assign(mask.data());
        Ok(())
    }
}

/// One user-committed mask at a given slice index.
#[derive(Debug, Clone)]
pub struct AnnotatedSlice {
    pub index: usize,
    pub mask: BinaryMask,
}

/// Validated set of annotated slices: non-empty, sorted ascending by
/// index, indices unique, all masks of one shape.
#[derive(Debug, Clone)]
pub struct AnnotationSet {
    slices: Vec<AnnotatedSlice>,
}

impl AnnotationSet {
    pub fn new(mut slices: Vec<AnnotatedSlice>) -> Result<Self> {
        if slices.is_empty() {
            return Err(Error::EmptyAnnotationSet);
        }
        slices.sort_by_key(|s| s.index);
        for pair in slices.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(Error::Annotation(format!(
                    "duplicate annotation at slice {}",
                    pair[0].index
                )));
            }
        }
        let shape = slices[0].mask.shape();
        for slice in &slices {
            if slice.mask.shape() != shape {
                return Err(Error::Annotation(format!(
                    "annotation at slice {} has shape {:?}, expected {:?}",
                    slice.index,
                    slice.mask.shape(),
                    shape
                )));
            }
        }
        Ok(Self { slices })
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedSlice> {
        self.slices.iter()
    }

    /// Annotated slice indices, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.slices.iter().map(|s| s.index).collect()
    }

    pub fn first_index(&self) -> usize {
        self.slices[0].index
    }

    pub fn last_index(&self) -> usize {
        self.slices[self.slices.len() - 1].index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(index: usize, point: (usize, usize)) -> AnnotatedSlice {
        let mut mask = BinaryMask::zeros((4, 4));
        mask.set(point.0, point.1, true);
        AnnotatedSlice { index, mask }
    }

    #[test]
    fn test_volume_set_and_get() {
        let mut volume = MaskVolume::zeros(3, 4, 4);
        let mut mask = BinaryMask::zeros((4, 4));
        mask.set(1, 2, true);
        volume.set_slice(1, &mask).unwrap();
        assert_eq!(volume.slice_mask(1), mask);
        assert!(volume.slice_mask(0).is_empty());
        assert!(volume.slice_mask(2).is_empty());
    }

    #[test]
    fn test_volume_rejects_wrong_shape() {
        let mut volume = MaskVolume::zeros(3, 4, 4);
        let mask = BinaryMask::zeros((5, 4));
        assert!(matches!(
            volume.set_slice(0, &mask),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_volume_rejects_out_of_range() {
        let mut volume = MaskVolume::zeros(3, 4, 4);
        let mask = BinaryMask::zeros((4, 4));
        assert!(matches!(
            volume.set_slice(3, &mask),
            Err(Error::Annotation(_))
        ));
    }

    #[test]
    fn test_annotation_set_sorts_indices() {
        let set = AnnotationSet::new(vec![annotation(7, (0, 0)), annotation(2, (1, 1))]).unwrap();
        assert_eq!(set.indices(), vec![2, 7]);
        assert_eq!(set.first_index(), 2);
        assert_eq!(set.last_index(), 7);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_annotation_set_rejects_empty() {
        assert!(matches!(
            AnnotationSet::new(vec![]),
            Err(Error::EmptyAnnotationSet)
        ));
    }

    #[test]
    fn test_annotation_set_rejects_duplicates() {
        let result = AnnotationSet::new(vec![annotation(3, (0, 0)), annotation(3, (1, 1))]);
        assert!(matches!(result, Err(Error::Annotation(_))));
    }

    #[test]
    fn test_annotation_set_rejects_mixed_shapes() {
        let small = AnnotatedSlice {
            index: 1,
            mask: BinaryMask::zeros((2, 2)),
        };
        let result = AnnotationSet::new(vec![annotation(0, (0, 0)), small]);
        assert!(matches!(result, Err(Error::Annotation(_))));
    }
}
