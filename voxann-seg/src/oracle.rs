//! External encoder and segmentation oracle contracts

use ndarray::{Array3, ArrayD, CowArray, IxDyn};
use voxann_core::{BinaryMask, BoundingBox, Result};

/// Feature embedding of one slice as returned by the encoder, plus the
/// two scalar metadata fields every downstream oracle call needs.
#[derive(Debug, Clone)]
pub struct EncodedSlice {
    pub features: ArrayD<f32>,
    /// Spatial extent of the slice before encoder preprocessing.
    pub original_size: (usize, usize),
    /// Spatial extent after resizing to the encoder input resolution.
    pub input_size: (usize, usize),
}

/// Encoder half of the external predictor: one H x W x 3 uint8 image
/// in, one feature embedding out.
pub trait SliceEncoder {
    fn encode(&self, image: &Array3<u8>) -> Result<EncodedSlice>;
}

/// Prompt handed to the oracle for one slice, derived from a prior
/// committed mask by the projection mode. In mask projection both
/// fields are populated; in bounding-box projection only the box.
#[derive(Debug, Clone, Copy)]
pub struct OraclePrompt<'a> {
    pub mask: Option<&'a BinaryMask>,
    pub bbox: Option<BoundingBox>,
}

/// Immutable per-call context: the feature embedding for the slice
/// being segmented plus the encoder metadata.
///
/// This value is built fresh for every oracle call instead of being
/// installed into shared predictor state, so repeated or concurrent
/// calls cannot observe each other.
#[derive(Debug)]
pub struct EmbeddingContext<'a> {
    pub features: CowArray<'a, f32, IxDyn>,
    pub original_size: (usize, usize),
    pub input_size: (usize, usize),
    /// Index of the slice within the stack; `None` for 2d embeddings.
    pub slice_index: Option<usize>,
}

/// Decoder half of the external predictor: prior mask and/or box in,
/// new binary mask for the context slice out.
///
/// Failures are propagated to the caller unchanged; the engine never
/// retries an oracle call.
pub trait SegmentationOracle {
    fn segment(
        &self,
        prompt: &OraclePrompt<'_>,
        context: &EmbeddingContext<'_>,
    ) -> Result<BinaryMask>;
}
