//! Slice-order planning
//!
//! Pure functions deciding, for each slice to be filled, where its
//! prompt comes from. Keeping this separate from the oracle loop makes
//! the even/odd gap handling testable without any oracle.

/// Prompt source for one planned step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPrompt {
    /// The committed mask at this slice.
    Previous(usize),
    /// Logical OR of the committed masks at these two slices.
    Combined(usize, usize),
}

/// One slice to segment and where its prompt comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub target: usize,
    pub prompt: StepPrompt,
}

fn step(target: usize, source: usize) -> PlanStep {
    PlanStep {
        target,
        prompt: StepPrompt::Previous(source),
    }
}

/// Walk order for extending from `anchor` to `bound` (inclusive), one
/// slice at a time, each step prompted by the previously written
/// neighbor. `bound < anchor` walks downward, `bound > anchor` upward.
pub fn outward_plan(anchor: usize, bound: usize) -> Vec<PlanStep> {
    if bound < anchor {
        (bound..anchor).rev().map(|z| step(z, z + 1)).collect()
    } else if bound > anchor {
        (anchor + 1..=bound).map(|z| step(z, z - 1)).collect()
    } else {
        Vec::new()
    }
}

/// Fill order for the gap between two annotated slices
/// `z_start < z_stop`.
///
/// * gap of 1: nothing to fill.
/// * `lower_pinned` (the range must not grow past `z_start`): fill from
///   `z_stop` downward only. `upper_pinned` is symmetric. Lower wins
///   when both are set.
/// * gap of 2: the single middle slice is prompted by the union of both
///   bounding masks.
/// * larger gaps: walk forward from `z_start` and backward from
///   `z_stop` toward the midpoint. For an even gap the two walks stop
///   one short of the midpoint on the forward side, and the midpoint is
///   filled last from the union of its two freshly written neighbors;
///   for an odd gap the forward walk includes the midpoint and no union
///   step is needed.
pub fn gap_plan(
    z_start: usize,
    z_stop: usize,
    lower_pinned: bool,
    upper_pinned: bool,
) -> Vec<PlanStep> {
    debug_assert!(z_start < z_stop);
    let gap = z_stop - z_start;
    if gap == 1 {
        return Vec::new();
    }

    if lower_pinned {
        return (z_start + 1..z_stop).rev().map(|z| step(z, z + 1)).collect();
    }
    if upper_pinned {
        return (z_start + 1..z_stop).map(|z| step(z, z - 1)).collect();
    }

    if gap == 2 {
        return vec![PlanStep {
            target: z_start + 1,
            prompt: StepPrompt::Combined(z_start, z_stop),
        }];
    }

    let mid = (z_start + z_stop) / 2;
    let forward_end = if gap % 2 == 0 { mid - 1 } else { mid };

    let mut steps: Vec<PlanStep> = (z_start + 1..=forward_end).map(|z| step(z, z - 1)).collect();
    steps.extend((mid + 1..z_stop).rev().map(|z| step(z, z + 1)));
    if gap % 2 == 0 {
        steps.push(PlanStep {
            target: mid,
            prompt: StepPrompt::Combined(mid - 1, mid + 1),
        });
    }
    steps
}
