//! On-disk chunked embedding container
//!
//! Directory layout:
//!
//! ```text
//! <root>/attrs.json        # metadata, written once on completion
//! <root>/features/
//!     features.bin         # 2d: a single feature block
//!     z00000.bin ...       # 3d: one chunk per slice
//! ```
//!
//! A container is complete iff `attrs.json` exists. A 3d container may
//! be partially complete: attributes absent but a subset of slice
//! chunks present, which is exactly the state a killed computation
//! leaves behind and the state the store resumes from.

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use voxann_core::{Error, Result};

/// Container metadata. Presence of this file marks completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerAttrs {
    pub input_size: (usize, usize),
    pub original_size: (usize, usize),
    /// Full feature array shape: `[Z, ...]` for a stack, the plain
    /// block shape for 2d.
    pub shape: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FeatureChunk {
    shape: Vec<usize>,
    data: Vec<f32>,
}

#[derive(Debug)]
pub struct EmbeddingContainer {
    root: PathBuf,
}

impl EmbeddingContainer {
    const ATTRS_FILE: &'static str = "attrs.json";
    const FEATURES_DIR: &'static str = "features";
    const BLOCK_FILE: &'static str = "features.bin";

    /// Open (creating if necessary) the container directory.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join(Self::FEATURES_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn attrs(&self) -> Result<Option<ContainerAttrs>> {
        let path = self.root.join(Self::ATTRS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let attrs = serde_json::from_str(&raw)
            .map_err(|e| Error::Serialization(format!("corrupt container attributes: {e}")))?;
        Ok(Some(attrs))
    }

    /// Write the metadata, marking the container complete. Called once
    /// after all chunks are on disk.
    pub fn write_attrs(&self, attrs: &ContainerAttrs) -> Result<()> {
        let raw = serde_json::to_string_pretty(attrs)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(self.root.join(Self::ATTRS_FILE), raw)?;
        Ok(())
    }

    pub fn is_complete(&self) -> Result<bool> {
        Ok(self.attrs()?.is_some())
    }

    fn chunk_path(&self, z: usize) -> PathBuf {
        self.root
            .join(Self::FEATURES_DIR)
            .join(format!("z{z:05}.bin"))
    }

    fn block_path(&self) -> PathBuf {
        self.root.join(Self::FEATURES_DIR).join(Self::BLOCK_FILE)
    }

    fn read_features(path: &Path) -> Result<Option<ArrayD<f32>>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read(path)?;
        let chunk: FeatureChunk = bincode::deserialize(&raw)
            .map_err(|e| Error::Serialization(format!("corrupt feature chunk: {e}")))?;
        let array = ArrayD::from_shape_vec(IxDyn(&chunk.shape), chunk.data)
            .map_err(|e| Error::Store(format!("feature chunk shape mismatch: {e}")))?;
        Ok(Some(array))
    }

    fn write_features(path: &Path, features: &ArrayD<f32>) -> Result<()> {
        let chunk = FeatureChunk {
            shape: features.shape().to_vec(),
            data: features.iter().copied().collect(),
        };
        let raw = bincode::serialize(&chunk).map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// 2d feature block.
    pub fn read_block(&self) -> Result<Option<ArrayD<f32>>> {
        Self::read_features(&self.block_path())
    }

    pub fn write_block(&self, features: &ArrayD<f32>) -> Result<()> {
        Self::write_features(&self.block_path(), features)
    }

    /// Per-slice chunk of a 3d container.
    pub fn read_chunk(&self, z: usize) -> Result<Option<ArrayD<f32>>> {
        Self::read_features(&self.chunk_path(z))
    }

    pub fn write_chunk(&self, z: usize, features: &ArrayD<f32>) -> Result<()> {
        Self::write_features(&self.chunk_path(z), features)
    }

    /// Whether the chunk for slice `z` is already computed.
    ///
    /// A chunk counts as computed iff it is on disk and not all-zero.
    /// This makes a legitimately all-background embedding
    /// indistinguishable from "not yet computed"; a documented
    /// limitation inherited from the container format, not fixed here.
    pub fn chunk_is_computed(&self, z: usize) -> Result<bool> {
        match self.read_chunk(z)? {
            None => Ok(false),
            Some(features) => Ok(features.iter().any(|&v| v != 0.0)),
        }
    }
}
