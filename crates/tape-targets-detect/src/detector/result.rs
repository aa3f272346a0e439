use serde::Serialize;
use tape_targets_core::{GoalTarget, Measurement, MeasurementArrays, RotatedRect};

/// How many items survived each stage of one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub mask_pixels: usize,
    pub contours: usize,
    pub filtered: usize,
    pub rects: usize,
    pub targets: usize,
}

/// Output of one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FrameResult {
    pub counts: StageCounts,
    /// Fitted strips, sorted by `center.x`.
    pub rects: Vec<RotatedRect>,
    pub targets: Vec<GoalTarget>,
    /// One entry per target, same order as `targets`.
    pub measurements: Vec<Measurement>,
}

impl FrameResult {
    /// Column-wise view for the output table.
    pub fn arrays(&self) -> MeasurementArrays {
        self.measurements.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
