//! Embedding computation and loading
//!
//! `precompute_embeddings` is the single entry point: it dispatches on
//! the dimensionality of the input and on whether a persistence path
//! was given, and always returns an [`EmbeddingRecord`]. Re-running it
//! on a completed container loads instead of recomputing; re-running
//! it on a partially computed 3d container resumes from the first
//! incomplete chunk.

use crate::embeddings::container::{ContainerAttrs, EmbeddingContainer};
use crate::embeddings::record::EmbeddingRecord;
use crate::oracle::{EncodedSlice, SliceEncoder};
use crate::utils::to_rgb_image;
use ndarray::{ArrayD, ArrayView2, ArrayView3, Axis, Ix2, Ix3, IxDyn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use voxann_core::{Error, Result};

/// Options for embedding computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingOptions {
    /// Return a record that reads feature chunks from disk on demand
    /// instead of materializing the whole array. Only has an effect
    /// for a persisted 3d input.
    pub lazy: bool,
}

/// Encoder metadata plus the per-slice feature shape, captured from the
/// first slice actually computed and validated against every slice
/// computed after it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SliceMeta {
    input_size: (usize, usize),
    original_size: (usize, usize),
    feature_shape: Vec<usize>,
}

impl SliceMeta {
    fn from_encoded(encoded: &EncodedSlice) -> Self {
        Self {
            input_size: encoded.input_size,
            original_size: encoded.original_size,
            feature_shape: encoded.features.shape().to_vec(),
        }
    }

    /// Capture on first use, reject drift afterwards.
    fn capture_or_check(slot: &mut Option<SliceMeta>, encoded: &EncodedSlice, z: usize) -> Result<()> {
        let meta = Self::from_encoded(encoded);
        match slot {
            None => {
                *slot = Some(meta);
                Ok(())
            }
            Some(existing) if *existing == meta => Ok(()),
            Some(existing) => Err(Error::Store(format!(
                "encoder metadata drifted at slice {z}: expected input_size {:?}, \
                 original_size {:?}, feature shape {:?}",
                existing.input_size, existing.original_size, existing.feature_shape
            ))),
        }
    }
}

/// Compute (or load) the per-slice feature embeddings for a 2d image
/// or a 3d stack.
///
/// With a `save_path` the embeddings are persisted in a chunked
/// container and never recomputed once complete. Without one they only
/// live in memory. Anything that is neither 2d nor 3d fails with
/// [`Error::InvalidDimensionality`].
pub fn precompute_embeddings<E: SliceEncoder>(
    encoder: &E,
    image: &ArrayD<f32>,
    save_path: Option<&Path>,
    options: &EmbeddingOptions,
) -> Result<EmbeddingRecord> {
    match image.ndim() {
        2 => {
            let plane = image
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|e| Error::Store(e.to_string()))?;
            match save_path {
                None => compute_2d(encoder, plane),
                Some(path) => precompute_2d(encoder, plane, path),
            }
        }
        3 => {
            let stack = image
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|e| Error::Store(e.to_string()))?;
            if stack.shape()[0] == 0 {
                return Err(Error::Store("cannot embed a stack with no slices".to_string()));
            }
            match save_path {
                None => compute_3d(encoder, stack),
                Some(path) => precompute_3d(encoder, stack, path, options.lazy),
            }
        }
        ndim => Err(Error::InvalidDimensionality { ndim }),
    }
}

fn encode_slice<E: SliceEncoder>(encoder: &E, plane: ArrayView2<'_, f32>) -> Result<EncodedSlice> {
    let image = to_rgb_image(plane);
    encoder.encode(&image)
}

fn compute_2d<E: SliceEncoder>(encoder: &E, plane: ArrayView2<'_, f32>) -> Result<EmbeddingRecord> {
    let encoded = encode_slice(encoder, plane)?;
    Ok(EmbeddingRecord::new_plane(
        encoded.features,
        encoded.input_size,
        encoded.original_size,
    ))
}

fn precompute_2d<E: SliceEncoder>(
    encoder: &E,
    plane: ArrayView2<'_, f32>,
    path: &Path,
) -> Result<EmbeddingRecord> {
    let container = EmbeddingContainer::open(path)?;
    if let Some(attrs) = container.attrs()? {
        let features = container.read_block()?.ok_or_else(|| {
            Error::Store("container marked complete but feature block is missing".to_string())
        })?;
        info!(path = %path.display(), "loaded 2d embeddings from container");
        return Ok(EmbeddingRecord::new_plane(
            features,
            attrs.input_size,
            attrs.original_size,
        ));
    }

    let encoded = encode_slice(encoder, plane)?;
    container.write_block(&encoded.features)?;
    container.write_attrs(&ContainerAttrs {
        input_size: encoded.input_size,
        original_size: encoded.original_size,
        shape: encoded.features.shape().to_vec(),
    })?;
    info!(path = %path.display(), "computed and persisted 2d embeddings");
    Ok(EmbeddingRecord::new_plane(
        encoded.features,
        encoded.input_size,
        encoded.original_size,
    ))
}

fn compute_3d<E: SliceEncoder>(encoder: &E, stack: ArrayView3<'_, f32>) -> Result<EmbeddingRecord> {
    let depth = stack.shape()[0];
    let mut meta: Option<SliceMeta> = None;
    let mut features: Option<ArrayD<f32>> = None;

    for (z, plane) in stack.outer_iter().enumerate() {
        let encoded = encode_slice(encoder, plane)?;
        SliceMeta::capture_or_check(&mut meta, &encoded, z)?;

        let features = features.get_or_insert_with(|| {
            let mut shape = vec![depth];
            shape.extend_from_slice(encoded.features.shape());
            ArrayD::zeros(IxDyn(&shape))
        });
        features
            .index_axis_mut(Axis(0), z)
            .assign(&encoded.features);
        debug!(slice = z, "computed embedding");
    }

    // depth >= 1 here, so both are set
    let meta = meta
        .ok_or_else(|| Error::Store("cannot embed a stack with no slices".to_string()))?;
    let features = features
        .ok_or_else(|| Error::Store("cannot embed a stack with no slices".to_string()))?;
    Ok(EmbeddingRecord::new_stack(
        features,
        meta.input_size,
        meta.original_size,
    ))
}

fn precompute_3d<E: SliceEncoder>(
    encoder: &E,
    stack: ArrayView3<'_, f32>,
    path: &Path,
    lazy: bool,
) -> Result<EmbeddingRecord> {
    let container = EmbeddingContainer::open(path)?;
    if let Some(attrs) = container.attrs()? {
        info!(path = %path.display(), "container complete, skipping embedding computation");
        return finish_3d(container, attrs, lazy);
    }

    let depth = stack.shape()[0];
    let mut meta: Option<SliceMeta> = None;
    let mut computed = 0usize;

    for z in 0..depth {
        if container.chunk_is_computed(z)? {
            debug!(slice = z, "chunk already computed, skipping");
            continue;
        }
        let encoded = encode_slice(encoder, stack.index_axis(Axis(0), z))?;
        SliceMeta::capture_or_check(&mut meta, &encoded, z)?;
        container.write_chunk(z, &encoded.features)?;
        computed += 1;
        debug!(slice = z, "computed and persisted embedding");
    }

    let meta = match meta {
        Some(meta) => meta,
        None => {
            // Every chunk was already on disk but the attributes were
            // never written: the previous run was killed between the
            // last chunk and the metadata write. One extra encoder
            // pass recovers the metadata.
            let encoded = encode_slice(encoder, stack.index_axis(Axis(0), 0))?;
            SliceMeta::from_encoded(&encoded)
        }
    };

    let mut shape = vec![depth];
    shape.extend_from_slice(&meta.feature_shape);
    let attrs = ContainerAttrs {
        input_size: meta.input_size,
        original_size: meta.original_size,
        shape,
    };
    container.write_attrs(&attrs)?;
    info!(
        path = %path.display(),
        slices = depth,
        computed,
        "embedding container complete"
    );
    finish_3d(container, attrs, lazy)
}

fn finish_3d(
    container: EmbeddingContainer,
    attrs: ContainerAttrs,
    lazy: bool,
) -> Result<EmbeddingRecord> {
    if lazy {
        return Ok(EmbeddingRecord::new_lazy(container, &attrs));
    }
    let features = load_stack(&container, &attrs)?;
    Ok(EmbeddingRecord::new_stack(
        features,
        attrs.input_size,
        attrs.original_size,
    ))
}

/// Materialize the full `[Z, ...]` feature array from a completed
/// container.
fn load_stack(container: &EmbeddingContainer, attrs: &ContainerAttrs) -> Result<ArrayD<f32>> {
    let depth = attrs.shape[0];
    let mut features = ArrayD::<f32>::zeros(IxDyn(&attrs.shape));
    for z in 0..depth {
        let chunk = container
            .read_chunk(z)?
            .ok_or_else(|| Error::Store(format!("missing feature chunk for slice {z}")))?;
        if chunk.shape() != &attrs.shape[1..] {
            return Err(Error::Store(format!(
                "chunk for slice {z} has shape {:?}, expected {:?}",
                chunk.shape(),
                &attrs.shape[1..]
            )));
        }
        features.index_axis_mut(Axis(0), z).assign(&chunk);
    }
    Ok(features)
}
