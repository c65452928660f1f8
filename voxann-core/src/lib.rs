//! voxann-core: data model for interactive volumetric annotation
//!
//! Binary masks, mask volumes and annotation sets shared by the
//! embedding store and the volume propagation engine, together with
//! the workspace-wide error taxonomy and the mask overlap metric.

pub mod error;
pub mod mask;
pub mod metrics;
pub mod volume;

pub use error::{Error, Result};
pub use mask::{BinaryMask, BoundingBox};
pub use metrics::compute_iou;
pub use volume::{AnnotatedSlice, AnnotationSet, MaskVolume};
