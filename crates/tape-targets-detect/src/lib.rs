//! Image stages that turn a camera frame into tape target measurements.
//!
//! Pipeline, one call per frame:
//! - box/gaussian/median/bilateral blur, then an HLS range threshold,
//! - border following on the binary mask and geometric contour filtering,
//! - minimal-area rectangle fitting,
//! - sorting by `center.x` and pairing of left/right leaning strips,
//! - conversion to offset, distance and bearing through [`CameraCalibration`].
//!
//! [`TapeTargetDetector`] wires the stages together; each stage is also
//! exposed as a free function for tuning and tests.
//!
//! [`CameraCalibration`]: tape_targets_core::CameraCalibration

mod blur;
mod contour_filter;
mod contours;
mod detector;
mod fitter;
mod frame;
mod mask;
mod pairing;
mod threshold;

pub use blur::{blur_frame, BlurKind, BlurParams, MAX_KERNEL_RADIUS};
pub use contour_filter::{filter_contours, ContourFilterParams, ContourMetrics, Rejection};
pub use contours::{compress_runs, extract_contours, ChainApprox, ContourParams};
pub use detector::{
    filter_frame, FrameResult, PipelineParams, StageCounts, TapeDetectError, TapeTargetDetector,
};
pub use fitter::fit_rects;
pub use frame::frame_from_rgb_slice;
pub use mask::BinaryMask;
pub use pairing::{assign_sides, order_and_pair, pair_targets, sort_by_center_x, PairingParams};
pub use threshold::{hls_threshold, rgb_to_hls, HlsRange};

pub use tape_targets_core::{
    CameraCalibration, GoalTarget, Measurement, MeasurementArrays, RotatedRect,
};
