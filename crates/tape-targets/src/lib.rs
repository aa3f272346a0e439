//! Facade crate for the `tape-targets-*` workspace.
//!
//! This crate provides:
//! - re-exports of the geometry crate (`core`) and the image stages (`detect`),
//! - the JSON configuration file and per-image reports ([`io`]),
//! - a debug overlay that draws fitted strips and targets on a frame
//!   ([`overlay`]),
//! - the frame worker that feeds a detector from a frame source and publishes
//!   measurement arrays to a table ([`worker`]),
//! - the `tape-targets` command-line tool (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use tape_targets::io::TapeTargetsConfig;
//! use tape_targets::worker::load_rgb;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = TapeTargetsConfig::default().build_detector()?;
//! let frame = load_rgb("frame.png")?;
//! let result = detector.process(&frame)?;
//! for m in &result.measurements {
//!     println!("offset {:.3} m, bearing {:.3} rad", m.x_offset, m.angle);
//! }
//! # Ok(())
//! # }
//! ```

pub use tape_targets_core as core;
pub use tape_targets_detect as detect;

pub use tape_targets_core::{CameraCalibration, GoalTarget, Measurement, MeasurementArrays};
pub use tape_targets_detect::{FrameResult, PipelineParams, TapeDetectError, TapeTargetDetector};

pub mod io;
pub mod logging;
pub mod overlay;
pub mod worker;
