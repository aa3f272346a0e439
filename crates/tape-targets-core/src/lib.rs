//! Core types for retro-reflective tape target tracking.
//!
//! This crate is purely geometric: contours and their polygon measures,
//! minimal-area rotated rectangles, paired goal targets, and the camera
//! model that converts target pixels into meters and radians. Polygon
//! measures come from `imageproc::geometry`; no image buffer appears in the
//! API. See `tape-targets-detect` for the image stages.

mod camera;
mod contour;
mod logger;
mod measurement;
mod rotated_rect;
mod target;

pub use camera::{AngleModel, CalibrationError, CameraCalibration};
pub use contour::{arc_length, convex_hull, polygon_area, BoundaryKind, BoundingBox, Contour};
pub use measurement::{Measurement, MeasurementArrays};
pub use rotated_rect::{min_area_rect, RotatedRect};
pub use target::GoalTarget;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_str, init_with_level};
