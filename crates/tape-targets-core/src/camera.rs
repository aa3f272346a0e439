//! Pinhole camera model used to turn target pixel geometry into physical
//! offset, distance and bearing.

use serde::{Deserialize, Serialize};

use crate::measurement::Measurement;
use crate::GoalTarget;

/// How the field of view enters the focal-length tangent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleModel {
    /// Convert the FOV from degrees to radians before taking the tangent.
    #[default]
    Radians,
    /// Feed the degree value straight into the tangent, reproducing the
    /// constants the robot was originally tuned against.
    LegacyDegreesAsRadians,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f64),
    #[error("frame size must be positive (width={width}, height={height})")]
    InvalidFrameSize { width: f64, height: f64 },
    #[error("tape separation must be positive and finite, got {0}")]
    InvalidTapeSeparation(f64),
    #[error("focal length is not positive and finite ({0}); check the angle model")]
    DegenerateFocalLength(f64),
}

/// Immutable calibration constants for one camera deployment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraCalibration {
    /// Horizontal field of view in degrees.
    pub fov_horizontal_deg: f64,
    /// Frame width in pixels.
    pub width_px: f64,
    /// Frame height in pixels.
    pub height_px: f64,
    /// Physical distance between the two tape strips of one target, meters.
    pub tape_separation_m: f64,
    #[serde(default)]
    pub angle_model: AngleModel,
}

impl Default for CameraCalibration {
    fn default() -> Self {
        Self {
            fov_horizontal_deg: 61.0,
            width_px: 320.0,
            height_px: 240.0,
            tape_separation_m: 1.1,
            angle_model: AngleModel::Radians,
        }
    }
}

impl CameraCalibration {
    /// Check that every constant is usable.
    ///
    /// The legacy angle model skips the FOV range check (the literal formula
    /// accepts any value) but still rejects a non-finite focal length.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let fov = self.fov_horizontal_deg;
        if self.angle_model == AngleModel::Radians && !(fov > 0.0 && fov < 180.0) {
            return Err(CalibrationError::InvalidFov(fov));
        }
        let size_ok = |v: f64| v.is_finite() && v > 0.0;
        if !size_ok(self.width_px) || !size_ok(self.height_px) {
            return Err(CalibrationError::InvalidFrameSize {
                width: self.width_px,
                height: self.height_px,
            });
        }
        if !size_ok(self.tape_separation_m) {
            return Err(CalibrationError::InvalidTapeSeparation(
                self.tape_separation_m,
            ));
        }
        let f = self.focal_length();
        if !f.is_finite() || f == 0.0 {
            return Err(CalibrationError::DegenerateFocalLength(f));
        }
        if self.angle_model == AngleModel::Radians && f < 0.0 {
            return Err(CalibrationError::DegenerateFocalLength(f));
        }
        Ok(())
    }

    /// Frame size in whole pixels, `(width, height)`.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.width_px.round() as u32, self.height_px.round() as u32)
    }

    #[inline]
    pub fn center_px_horizontal(&self) -> f64 {
        0.5 * self.width_px
    }

    #[inline]
    pub fn center_px_vertical(&self) -> f64 {
        0.5 * self.height_px
    }

    /// Half-FOV argument of the tangent, in the units the angle model dictates.
    fn half_fov(&self) -> f64 {
        let half = 0.5 * self.fov_horizontal_deg;
        match self.angle_model {
            AngleModel::Radians => half.to_radians(),
            AngleModel::LegacyDegreesAsRadians => half,
        }
    }

    /// Focal length in pixels.
    pub fn focal_length(&self) -> f64 {
        self.width_px / (2.0 * self.half_fov().tan())
    }

    /// Bearing of a pixel column in radians; columns left of center are positive.
    pub fn horizontal_angle(&self, px: f64) -> f64 {
        -((px - self.center_px_horizontal()) / self.focal_length()).atan()
    }

    /// Elevation of a pixel row in radians; rows below center are positive.
    pub fn vertical_angle(&self, py: f64) -> f64 {
        ((py - self.center_px_vertical()) / self.focal_length()).atan()
    }

    /// Meters per pixel at the target's depth, from the known tape separation.
    ///
    /// `None` for a non-positive or non-finite pixel width.
    pub fn meters_per_pixel(&self, target_width_px: f64) -> Option<f64> {
        (target_width_px.is_finite() && target_width_px > 0.0)
            .then(|| self.tape_separation_m / target_width_px)
    }

    /// Sideways offset of the target from the optical axis, meters.
    pub fn x_offset(&self, target_width_px: f64, center_x_px: f64) -> Option<f64> {
        let mpp = self.meters_per_pixel(target_width_px)?;
        Some(mpp * (self.center_px_horizontal() - center_x_px))
    }

    /// Straight-line distance to the target, meters.
    ///
    /// `None` when the target sits on the optical axis, where the offset and
    /// the bearing tangent are both zero.
    pub fn distance(&self, target_width_px: f64, center_x_px: f64) -> Option<f64> {
        let offset = self.x_offset(target_width_px, center_x_px)?;
        let tan = self.horizontal_angle(center_x_px).tan();
        if tan.abs() < f64::EPSILON {
            return None;
        }
        let d = offset / tan;
        d.is_finite().then_some(d)
    }

    /// Measure one paired target.
    pub fn measure(&self, target: &GoalTarget) -> Option<Measurement> {
        let width = target.width();
        let center_x = target.center_x();
        Some(Measurement {
            x_offset: self.x_offset(width, center_x)?,
            distance: self.distance(width, center_x),
            angle: self.horizontal_angle(center_x),
            vertical_angle: self.vertical_angle(target.center_y()),
        })
    }
}
