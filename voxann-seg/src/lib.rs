//! voxann-seg: prompt-based segmentation core for 2d images and 3d stacks
//!
//! Two pieces with real depth live here. The embedding store computes
//! per-slice feature embeddings exactly once and persists them in a
//! resumable chunked container, so a killed run restarts from the first
//! incomplete chunk. The volume propagation engine extends a sparse set
//! of user-annotated slices into a full 3d segmentation by walking
//! outward from the annotated range and interpolating between annotated
//! pairs, prompting an external segmentation oracle slice by slice.
//!
//! The oracle itself (a neural encoder/decoder) is consumed as a black
//! box through the [`oracle::SliceEncoder`] and
//! [`oracle::SegmentationOracle`] traits.

pub mod embeddings;
pub mod oracle;
pub mod progress;
pub mod propagation;
mod utils;

pub use embeddings::{precompute_embeddings, EmbeddingOptions, EmbeddingRecord};
pub use oracle::{EmbeddingContext, EncodedSlice, OraclePrompt, SegmentationOracle, SliceEncoder};
pub use progress::{NoProgress, ProgressCounter, ProgressSink};
pub use propagation::{ProjectionMode, PropagationOptions, VolumePropagationEngine};
