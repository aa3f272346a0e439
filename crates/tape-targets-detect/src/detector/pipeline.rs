use image::RgbImage;
use tape_targets_core::{CameraCalibration, Measurement};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{FrameResult, PipelineParams, StageCounts, TapeDetectError};
use crate::blur::{blur_frame, BlurParams};
use crate::contour_filter::filter_contours;
use crate::contours::extract_contours;
use crate::fitter::fit_rects;
use crate::mask::BinaryMask;
use crate::pairing::order_and_pair;
use crate::threshold::{hls_threshold, HlsRange};

/// Blur a frame and threshold it in HLS space.
pub fn filter_frame(frame: &RgbImage, blur: &BlurParams, hls: &HlsRange) -> BinaryMask {
    let blurred = blur_frame(frame, blur);
    hls_threshold(&blurred, hls)
}

/// Per-frame tape target detector.
///
/// Holds only immutable configuration; every call to [`process`](Self::process)
/// is independent of the previous ones.
#[derive(Clone, Debug)]
pub struct TapeTargetDetector {
    params: PipelineParams,
    calibration: CameraCalibration,
}

impl TapeTargetDetector {
    /// Create a detector, rejecting unusable calibration constants and
    /// parameters that cannot run on the calibrated frame size.
    pub fn new(
        params: PipelineParams,
        calibration: CameraCalibration,
    ) -> Result<Self, TapeDetectError> {
        calibration.validate()?;
        params.validate(calibration.frame_size())?;
        Ok(Self {
            params,
            calibration,
        })
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    #[inline]
    pub fn calibration(&self) -> &CameraCalibration {
        &self.calibration
    }

    /// Frame size the calibration was made for.
    pub fn expected_size(&self) -> (u32, u32) {
        self.calibration.frame_size()
    }

    /// Run every stage on one frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width(), height = frame.height()))
    )]
    pub fn process(&self, frame: &RgbImage) -> Result<FrameResult, TapeDetectError> {
        let expected = self.expected_size();
        if frame.dimensions() != expected {
            return Err(TapeDetectError::FrameSizeMismatch {
                expected,
                got: frame.dimensions(),
            });
        }

        let mask = filter_frame(frame, &self.params.blur, &self.params.hls);
        let contours = extract_contours(&mask, &self.params.contours);
        let n_contours = contours.len();
        let filtered = filter_contours(contours, &self.params.filter);
        let mut rects = fit_rects(&filtered);
        let targets = order_and_pair(&mut rects, &self.params.pairing);
        let measurements: Vec<Measurement> = targets
            .iter()
            .filter_map(|t| self.calibration.measure(t))
            .collect();

        let counts = StageCounts {
            mask_pixels: mask.count_set(),
            contours: n_contours,
            filtered: filtered.len(),
            rects: rects.len(),
            targets: targets.len(),
        };
        log::debug!(
            "frame: {} px, {} contours, {} kept, {} rects, {} targets",
            counts.mask_pixels,
            counts.contours,
            counts.filtered,
            counts.rects,
            counts.targets
        );

        Ok(FrameResult {
            counts,
            rects,
            targets,
            measurements,
        })
    }
}
