use serde::{Deserialize, Serialize};

use super::TapeDetectError;
use crate::blur::BlurParams;
use crate::contour_filter::ContourFilterParams;
use crate::contours::ContourParams;
use crate::pairing::PairingParams;
use crate::threshold::HlsRange;

/// Tuning of every image stage. Missing sections fall back to the tuned
/// defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub blur: BlurParams,
    pub hls: HlsRange,
    pub contours: ContourParams,
    pub filter: ContourFilterParams,
    pub pairing: PairingParams,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TapeDetectError {
    TapeDetectError::InvalidParams {
        field,
        reason: reason.into(),
    }
}

fn check_range(field: &'static str, lo: f64, hi: f64) -> Result<(), TapeDetectError> {
    if lo.is_nan() || hi.is_nan() {
        return Err(invalid(field, "bound is NaN"));
    }
    if lo > hi {
        return Err(invalid(field, format!("min {lo} exceeds max {hi}")));
    }
    Ok(())
}

impl PipelineParams {
    /// Check the parameters against the frame size they will run on.
    ///
    /// The blur radius must be finite, non-negative and no larger than the
    /// longer frame side. Every `[min, max]` pair must satisfy `min <= max`,
    /// and the pairing angles must lie in `[0, 360]`.
    pub fn validate(&self, frame_size: (u32, u32)) -> Result<(), TapeDetectError> {
        let radius = self.blur.radius;
        if !radius.is_finite() || radius < 0.0 {
            return Err(invalid(
                "blur.radius",
                format!("{radius} is not a finite non-negative value"),
            ));
        }
        let longest = frame_size.0.max(frame_size.1);
        if self.blur.kernel_radius() > longest {
            return Err(invalid(
                "blur.radius",
                format!("{radius} exceeds the {longest} px frame side"),
            ));
        }

        let hls = &self.hls;
        check_range("hls.hue", hls.hue[0], hls.hue[1])?;
        check_range("hls.saturation", hls.saturation[0], hls.saturation[1])?;
        check_range("hls.luminance", hls.luminance[0], hls.luminance[1])?;

        let f = &self.filter;
        check_range("filter.width", f.min_width, f.max_width)?;
        check_range("filter.height", f.min_height, f.max_height)?;
        check_range("filter.solidity", f.solidity[0], f.solidity[1])?;
        check_range("filter.vertices", f.min_vertices, f.max_vertices)?;
        check_range("filter.ratio", f.min_ratio, f.max_ratio)?;
        for (field, v) in [
            ("filter.min_area", f.min_area),
            ("filter.min_perimeter", f.min_perimeter),
        ] {
            if v.is_nan() {
                return Err(invalid(field, "bound is NaN"));
            }
        }

        for (field, v) in [
            ("pairing.upper_angle_deg", self.pairing.upper_angle_deg),
            ("pairing.lower_angle_deg", self.pairing.lower_angle_deg),
        ] {
            if !(0.0..=360.0).contains(&v) {
                return Err(invalid(field, format!("{v} is outside [0, 360]")));
            }
        }
        Ok(())
    }
}
