//! Propagation options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use voxann_core::{Error, Result};

/// How a prior slice's mask is turned into the next slice's prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Pass the prior mask and its bounding box.
    Mask,
    /// Pass only the bounding box.
    BoundingBox,
}

impl ProjectionMode {
    /// Whether the prior mask itself is included in the prompt.
    pub fn use_mask(&self) -> bool {
        matches!(self, ProjectionMode::Mask)
    }

    /// Mask projection only behaves for square slices; pick the box
    /// projection otherwise. The engine does not auto-correct, this is
    /// a helper for callers.
    pub fn default_for(slice_shape: (usize, usize)) -> Self {
        if slice_shape.0 == slice_shape.1 {
            ProjectionMode::Mask
        } else {
            ProjectionMode::BoundingBox
        }
    }
}

impl FromStr for ProjectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mask" => Ok(ProjectionMode::Mask),
            "bounding_box" => Ok(ProjectionMode::BoundingBox),
            other => Err(Error::InvalidProjection(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionMode::Mask => write!(f, "mask"),
            ProjectionMode::BoundingBox => write!(f, "bounding_box"),
        }
    }
}

/// Options controlling one propagation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationOptions {
    /// Do not extend below the lowest annotated slice.
    pub stop_lower: bool,
    /// Do not extend above the highest annotated slice.
    pub stop_upper: bool,
    /// Outward extension stops once the IOU between a new mask and the
    /// mask it was derived from drops below this value. Applies only
    /// outside the annotated range.
    pub iou_threshold: f32,
    pub projection: ProjectionMode,
}

impl Default for PropagationOptions {
    fn default() -> Self {
        Self {
            stop_lower: false,
            stop_upper: false,
            iou_threshold: 0.8,
            projection: ProjectionMode::Mask,
        }
    }
}

impl PropagationOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.iou_threshold.is_finite() || !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::Config(format!(
                "iou threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }
        Ok(())
    }
}
