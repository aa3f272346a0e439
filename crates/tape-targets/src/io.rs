//! JSON configuration and report helpers.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use tape_targets_core::{CalibrationError, CameraCalibration};
use tape_targets_detect::{FrameResult, PipelineParams, TapeDetectError, TapeTargetDetector};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid calibration: {0}")]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Detector(#[from] TapeDetectError),
}

pub const DEFAULT_TABLE_NAME: &str = "VisionTarget";

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

/// Start-up configuration of a tape target tracker.
///
/// `calibration` is required in the JSON file; `pipeline` and `table_name`
/// fall back to the tuned defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeTargetsConfig {
    pub calibration: CameraCalibration,
    #[serde(default)]
    pub pipeline: PipelineParams,
    /// Name under which measurement arrays are published.
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

impl Default for TapeTargetsConfig {
    fn default() -> Self {
        Self {
            calibration: CameraCalibration::default(),
            pipeline: PipelineParams::default(),
            table_name: default_table_name(),
        }
    }
}

impl TapeTargetsConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.calibration.validate()?;
        cfg.pipeline.validate(cfg.calibration.frame_size())?;
        Ok(cfg)
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a detector from this config.
    pub fn build_detector(&self) -> Result<TapeTargetDetector, ConfigError> {
        Ok(TapeTargetDetector::new(self.pipeline, self.calibration)?)
    }
}

/// Detection report for one image file.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub image_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<FrameResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameReport {
    pub fn new(image_path: &Path) -> Self {
        Self {
            image_path: image_path.to_string_lossy().into_owned(),
            result: None,
            error: None,
        }
    }

    pub fn set_result(&mut self, result: FrameResult) {
        self.result = Some(result);
        self.error = None;
    }

    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Write a list of reports to disk as a pretty JSON array.
pub fn write_reports(path: impl AsRef<Path>, reports: &[FrameReport]) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(path, json)?;
    Ok(())
}
