//! Embedding records and per-call binding

use crate::embeddings::container::{ContainerAttrs, EmbeddingContainer};
use crate::oracle::EmbeddingContext;
use ndarray::{ArrayD, Axis, CowArray};
use voxann_core::{Error, Result};

/// Where the feature data lives.
#[derive(Debug)]
enum FeatureData {
    /// Fully materialized in memory (eager load, or no persistence).
    Memory(ArrayD<f32>),
    /// Chunks stay on disk and are read per slice on demand.
    Lazy(EmbeddingContainer),
}

/// Per-slice feature embeddings for one image or stack, plus the
/// encoder metadata captured once at computation time and read-only
/// afterward.
#[derive(Debug)]
pub struct EmbeddingRecord {
    features: FeatureData,
    input_size: (usize, usize),
    original_size: (usize, usize),
    /// `Some(depth)` for a stack, `None` for a single 2d image.
    stack_depth: Option<usize>,
}

impl EmbeddingRecord {
    pub(crate) fn new_plane(
        features: ArrayD<f32>,
        input_size: (usize, usize),
        original_size: (usize, usize),
    ) -> Self {
        Self {
            features: FeatureData::Memory(features),
            input_size,
            original_size,
            stack_depth: None,
        }
    }

    /// Eager stack record; `features` has shape `[depth, ...]`.
    pub(crate) fn new_stack(
        features: ArrayD<f32>,
        input_size: (usize, usize),
        original_size: (usize, usize),
    ) -> Self {
        let depth = features.shape()[0];
        Self {
            features: FeatureData::Memory(features),
            input_size,
            original_size,
            stack_depth: Some(depth),
        }
    }

    /// Lazy stack record over a completed container.
    pub(crate) fn new_lazy(container: EmbeddingContainer, attrs: &ContainerAttrs) -> Self {
        Self {
            features: FeatureData::Lazy(container),
            input_size: attrs.input_size,
            original_size: attrs.original_size,
            stack_depth: Some(attrs.shape[0]),
        }
    }

    pub fn is_stack(&self) -> bool {
        self.stack_depth.is_some()
    }

    /// Number of slices for a stack record, `None` for 2d.
    pub fn depth(&self) -> Option<usize> {
        self.stack_depth
    }

    pub fn input_size(&self) -> (usize, usize) {
        self.input_size
    }

    pub fn original_size(&self) -> (usize, usize) {
        self.original_size
    }

    /// Build the immutable oracle-call context for one slice.
    ///
    /// A slice index is required iff the record is a stack, and
    /// forbidden for a 2d record.
    pub fn bind(&self, slice_index: Option<usize>) -> Result<EmbeddingContext<'_>> {
        let features = match (self.stack_depth, slice_index) {
            (Some(_), None) => {
                return Err(Error::DimensionMismatch(
                    "the embeddings are 3d, a slice index is needed".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(Error::DimensionMismatch(
                    "the embeddings are 2d, a slice index must not be passed".to_string(),
                ))
            }
            (None, None) => match &self.features {
                FeatureData::Memory(features) => CowArray::from(features.view()),
                // lazy loading only applies to stacks
                FeatureData::Lazy(_) => {
                    return Err(Error::Store(
                        "2d embedding record with lazy feature data".to_string(),
                    ))
                }
            },
            (Some(depth), Some(z)) => {
                if z >= depth {
                    return Err(Error::DimensionMismatch(format!(
                        "slice index {z} out of range for stack of depth {depth}"
                    )));
                }
                match &self.features {
                    FeatureData::Memory(features) => {
                        CowArray::from(features.index_axis(Axis(0), z))
                    }
                    FeatureData::Lazy(container) => {
                        let chunk = container.read_chunk(z)?.ok_or_else(|| {
                            Error::Store(format!("missing feature chunk for slice {z}"))
                        })?;
                        CowArray::from(chunk)
                    }
                }
            }
        };

        Ok(EmbeddingContext {
            features,
            original_size: self.original_size,
            input_size: self.input_size,
            slice_index,
        })
    }
}
