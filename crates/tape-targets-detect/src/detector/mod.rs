//! Frame-to-measurement pipeline.
//!
//! This module chains the image stages (blur, HLS threshold, contour
//! extraction and filtering), rectangle fitting, strip pairing and the
//! camera model into one per-frame call.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::TapeDetectError;
pub use params::PipelineParams;
pub use pipeline::{filter_frame, TapeTargetDetector};
pub use result::{FrameResult, StageCounts};
