//! Shared stubs for the integration tests
#![allow(dead_code)]

use ndarray::{Array3, ArrayD, IxDyn};
use std::cell::Cell;
use voxann_core::{BinaryMask, Error, Result};
use voxann_seg::{EmbeddingContext, EncodedSlice, OraclePrompt, SegmentationOracle, SliceEncoder};

/// Encoder deriving a small deterministic, never-all-zero embedding
/// from the image content, counting its invocations.
pub struct StubEncoder {
    pub calls: Cell<usize>,
}

impl StubEncoder {
    pub fn new() -> Self {
        Self {
            calls: Cell::new(0),
        }
    }
}

impl SliceEncoder for StubEncoder {
    fn encode(&self, image: &Array3<u8>) -> Result<EncodedSlice> {
        self.calls.set(self.calls.get() + 1);
        let (rows, cols, _) = image.dim();
        let sum: f32 = image.iter().map(|&v| v as f32).sum();
        let features = ArrayD::from_shape_fn(IxDyn(&[1, 2, 2]), |ix| {
            sum + (ix[1] * 2 + ix[2]) as f32 + 1.0
        });
        Ok(EncodedSlice {
            features,
            original_size: (rows, cols),
            input_size: (1024, 1024),
        })
    }
}

/// Encoder that crashes after a fixed number of successful calls, to
/// simulate a killed computation.
pub struct FailingEncoder {
    pub inner: StubEncoder,
    pub fail_after: usize,
}

impl FailingEncoder {
    pub fn new(fail_after: usize) -> Self {
        Self {
            inner: StubEncoder::new(),
            fail_after,
        }
    }
}

impl SliceEncoder for FailingEncoder {
    fn encode(&self, image: &Array3<u8>) -> Result<EncodedSlice> {
        if self.inner.calls.get() >= self.fail_after {
            return Err(Error::Store("encoder interrupted".to_string()));
        }
        self.inner.encode(image)
    }
}

/// Encoder whose reported metadata drifts between calls.
pub struct DriftingEncoder {
    pub inner: StubEncoder,
}

impl SliceEncoder for DriftingEncoder {
    fn encode(&self, image: &Array3<u8>) -> Result<EncodedSlice> {
        let call = self.inner.calls.get();
        let mut encoded = self.inner.encode(image)?;
        encoded.input_size = (1024 + call, 1024);
        Ok(encoded)
    }
}

/// Oracle that returns the prompt mask unchanged. With bounding-box
/// projection (no mask in the prompt) it fills the prompt box instead,
/// using the slice extent from the embedding context.
pub struct EchoOracle {
    pub calls: Cell<usize>,
    pub saw_mask_prompt: Cell<bool>,
}

impl EchoOracle {
    pub fn new() -> Self {
        Self {
            calls: Cell::new(0),
            saw_mask_prompt: Cell::new(false),
        }
    }
}

impl SegmentationOracle for EchoOracle {
    fn segment(
        &self,
        prompt: &OraclePrompt<'_>,
        context: &EmbeddingContext<'_>,
    ) -> Result<BinaryMask> {
        self.calls.set(self.calls.get() + 1);
        if prompt.mask.is_some() {
            self.saw_mask_prompt.set(true);
        }
        if let Some(mask) = prompt.mask {
            return Ok(mask.clone());
        }
        let mut mask = BinaryMask::zeros(context.original_size);
        if let Some(bbox) = prompt.bbox {
            for row in bbox.min_row..=bbox.max_row {
                for col in bbox.min_col..=bbox.max_col {
                    mask.set(row, col, true);
                }
            }
        }
        Ok(mask)
    }
}

/// Oracle that echoes the prompt only for slices adjacent to `anchor`
/// and returns an empty mask everywhere else, driving the IOU stop.
pub struct NeighborOnlyOracle {
    pub anchor: usize,
}

impl SegmentationOracle for NeighborOnlyOracle {
    fn segment(
        &self,
        prompt: &OraclePrompt<'_>,
        context: &EmbeddingContext<'_>,
    ) -> Result<BinaryMask> {
        let slice = context.slice_index.expect("stack oracle needs a slice index");
        let adjacent = slice.abs_diff(self.anchor) == 1;
        match prompt.mask {
            Some(mask) if adjacent => Ok(mask.clone()),
            Some(mask) => Ok(BinaryMask::zeros(mask.shape())),
            None => Ok(BinaryMask::zeros(context.original_size)),
        }
    }
}

/// Oracle that fails for one specific slice index.
pub struct FailingOracle {
    pub fail_at: usize,
}

impl SegmentationOracle for FailingOracle {
    fn segment(
        &self,
        prompt: &OraclePrompt<'_>,
        context: &EmbeddingContext<'_>,
    ) -> Result<BinaryMask> {
        let slice = context.slice_index.expect("stack oracle needs a slice index");
        if slice == self.fail_at {
            return Err(Error::oracle(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "malformed prompt",
            )));
        }
        match prompt.mask {
            Some(mask) => Ok(mask.clone()),
            None => Ok(BinaryMask::zeros(context.original_size)),
        }
    }
}

/// A raw volume whose slices all differ, so every slice embeds to a
/// distinct feature vector.
pub fn graded_volume(depth: usize, rows: usize, cols: usize) -> ArrayD<f32> {
    ndarray::Array3::from_shape_fn((depth, rows, cols), |(z, r, c)| {
        (z * rows * cols + r * cols + c) as f32
    })
    .into_dyn()
}

/// Mask of the given shape with a single foreground pixel.
pub fn point_mask(shape: (usize, usize), point: (usize, usize)) -> BinaryMask {
    let mut mask = BinaryMask::zeros(shape);
    mask.set(point.0, point.1, true);
    mask
}
