use tape_targets_core::CalibrationError;

/// Errors returned by the tape target detector.
#[derive(thiserror::Error, Debug)]
pub enum TapeDetectError {
    #[error("frame is {got:?} but calibration expects {expected:?}")]
    FrameSizeMismatch {
        expected: (u32, u32),
        got: (u32, u32),
    },
    #[error("frame buffer holds {got} bytes, {width}x{height} RGB needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
    #[error("invalid pipeline parameter {field}: {reason}")]
    InvalidParams { field: &'static str, reason: String },
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
