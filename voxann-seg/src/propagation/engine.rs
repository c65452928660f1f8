//! The volume propagation engine

use crate::embeddings::EmbeddingRecord;
use crate::oracle::{OraclePrompt, SegmentationOracle};
use crate::progress::ProgressSink;
use crate::propagation::config::PropagationOptions;
use crate::propagation::plan::{gap_plan, outward_plan, PlanStep, StepPrompt};
use tracing::{debug, info};
use voxann_core::{compute_iou, AnnotationSet, BinaryMask, Error, MaskVolume, Result};

/// Fills a [`MaskVolume`] from a sparse annotation set by prompting the
/// segmentation oracle slice by slice.
///
/// Execution is intrinsically sequential: each slice's prompt is the
/// mask committed for its already-segmented neighbor.
pub struct VolumePropagationEngine<'a, O: SegmentationOracle> {
    oracle: &'a O,
    embeddings: &'a EmbeddingRecord,
    options: PropagationOptions,
}

impl<'a, O: SegmentationOracle> VolumePropagationEngine<'a, O> {
    pub fn new(
        oracle: &'a O,
        embeddings: &'a EmbeddingRecord,
        options: PropagationOptions,
    ) -> Result<Self> {
        options.validate()?;
        if !embeddings.is_stack() {
            return Err(Error::DimensionMismatch(
                "volume propagation requires stack embeddings".to_string(),
            ));
        }
        Ok(Self {
            oracle,
            embeddings,
            options,
        })
    }

    /// Propagate the annotated masks through the whole volume.
    ///
    /// Annotated slices are committed first, then the volume is
    /// extended outward below the lowest and above the highest
    /// annotation (with the IOU stop rule), then every gap between
    /// consecutive annotations is interpolated. The volume is mutated
    /// in place; on an oracle failure, slices already written stay
    /// written and the error is returned unchanged.
    pub fn propagate(
        &self,
        annotations: &AnnotationSet,
        volume: &mut MaskVolume,
        progress: &mut dyn ProgressSink,
    ) -> Result<()> {
        let depth = volume.depth();
        if self.embeddings.depth() != Some(depth) {
            return Err(Error::DimensionMismatch(format!(
                "embedding stack depth {:?} does not match volume depth {}",
                self.embeddings.depth(),
                depth
            )));
        }
        for annotated in annotations.iter() {
            volume.set_slice(annotated.index, &annotated.mask)?;
        }

        let first = annotations.first_index();
        let last = annotations.last_index();
        info!(
            annotated = annotations.len(),
            first, last, depth, "propagating annotations through volume"
        );

        if first > 0 && !self.options.stop_lower {
            self.extend_outward(volume, outward_plan(first, 0), progress)?;
        }
        if last < depth - 1 && !self.options.stop_upper {
            self.extend_outward(volume, outward_plan(last, depth - 1), progress)?;
        }

        let indices = annotations.indices();
        for pair in indices.windows(2) {
            let (z_start, z_stop) = (pair[0], pair[1]);
            let lower_pinned = z_start == first && self.options.stop_lower;
            let upper_pinned = z_stop == last && self.options.stop_upper;
            for plan_step in gap_plan(z_start, z_stop, lower_pinned, upper_pinned) {
                let mask = self.segment_step(volume, &plan_step)?;
                volume.set_slice(plan_step.target, &mask)?;
                progress.advance(1);
            }
        }
        Ok(())
    }

    /// Walk past the annotated range, stopping early once the new mask
    /// diverges too far from the mask it was derived from. Early
    /// termination is success, not an error; the remaining slices stay
    /// unsegmented.
    fn extend_outward(
        &self,
        volume: &mut MaskVolume,
        steps: Vec<PlanStep>,
        progress: &mut dyn ProgressSink,
    ) -> Result<()> {
        for plan_step in steps {
            let source = Self::resolve_prompt(volume, plan_step.prompt)?;
            let candidate = self.segment_from(&source, plan_step.target)?;
            let iou = compute_iou(&source, &candidate);
            if iou < self.options.iou_threshold {
                info!(
                    slice = plan_step.target,
                    iou,
                    threshold = self.options.iou_threshold,
                    "stopping outward extension, overlap below threshold"
                );
                break;
            }
            volume.set_slice(plan_step.target, &candidate)?;
            progress.advance(1);
        }
        Ok(())
    }

    /// Prompt source mask, always read from the most recently written
    /// neighboring slices.
    fn resolve_prompt(volume: &MaskVolume, prompt: StepPrompt) -> Result<BinaryMask> {
        match prompt {
            StepPrompt::Previous(z) => Ok(volume.slice_mask(z)),
            StepPrompt::Combined(low, high) => {
                volume.slice_mask(low).union(&volume.slice_mask(high))
            }
        }
    }

    /// Segment one planned slice.
    fn segment_step(&self, volume: &MaskVolume, plan_step: &PlanStep) -> Result<BinaryMask> {
        let prompt_mask = Self::resolve_prompt(volume, plan_step.prompt)?;
        self.segment_from(&prompt_mask, plan_step.target)
    }

    fn segment_from(&self, source: &BinaryMask, target: usize) -> Result<BinaryMask> {
        let context = self.embeddings.bind(Some(target))?;
        let prompt = OraclePrompt {
            mask: self.options.projection.use_mask().then_some(source),
            bbox: source.bounding_box(),
        };
        debug!(
            slice = target,
            projection = %self.options.projection,
            "segmenting slice from prior mask"
        );
        self.oracle.segment(&prompt, &context)
    }
}
