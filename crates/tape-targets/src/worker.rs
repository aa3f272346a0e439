//! Single-threaded frame loop: pull a frame, detect, publish.
//!
//! The loop is driven by two seams. A [`FrameSource`] hands out frames until
//! it is exhausted; a [`MeasurementTable`] receives the `xOffset`,
//! `distance` and `angle` arrays of every processed frame. A shared
//! [`AtomicBool`] stops the loop between frames; the frame in progress is
//! always finished and published whole.

use image::RgbImage;
use serde::Serialize;
use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "tracing")]
use tracing::instrument;

use tape_targets_core::MeasurementArrays;
use tape_targets_detect::TapeTargetDetector;

/// Extensions picked up by [`DirectoryFrameSource`].
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "ppm", "tif", "tiff", "webp"];

#[derive(thiserror::Error, Debug)]
pub enum FrameSourceError {
    #[error("failed to decode frame {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("frame source failed: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameSourceError {
    /// Whether the source can go on with the next frame.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Source(#[from] FrameSourceError),
}

/// One frame with a label for log messages (file name, sequence number).
#[derive(Clone, Debug)]
pub struct LabeledFrame {
    pub label: String,
    pub image: RgbImage,
}

/// Blocking supplier of frames. `Ok(None)` means the source is exhausted.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<LabeledFrame>, FrameSourceError>;
}

/// Receiver of the per-frame measurement arrays.
pub trait MeasurementTable {
    fn publish(&mut self, arrays: &MeasurementArrays) -> Result<(), TableError>;
}

/// Decode any `image`-readable file into an RGB frame.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, image::ImageError> {
    Ok(image::open(path)?.to_rgb8())
}

/// Frames from the image files of one directory, in file name order.
#[derive(Debug)]
pub struct DirectoryFrameSource {
    pending: VecDeque<PathBuf>,
}

impl DirectoryFrameSource {
    /// List the image files of `dir`. Subdirectories are not visited.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, FrameSourceError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_frame_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        log::info!("frame directory holds {} images", paths.len());
        Ok(Self {
            pending: paths.into(),
        })
    }

    /// Frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for DirectoryFrameSource {
    fn next_frame(&mut self) -> Result<Option<LabeledFrame>, FrameSourceError> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        let label = path.display().to_string();
        match load_rgb(&path) {
            Ok(image) => Ok(Some(LabeledFrame { label, image })),
            Err(source) => Err(FrameSourceError::Decode { label, source }),
        }
    }
}

/// Frames held in memory, labelled by their index.
#[derive(Debug, Default)]
pub struct MemoryFrameSource {
    frames: VecDeque<RgbImage>,
    next_index: usize,
}

impl MemoryFrameSource {
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            next_index: 0,
        }
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> Result<Option<LabeledFrame>, FrameSourceError> {
        let Some(image) = self.frames.pop_front() else {
            return Ok(None);
        };
        let label = format!("frame {}", self.next_index);
        self.next_index += 1;
        Ok(Some(LabeledFrame { label, image }))
    }
}

/// Table kept in memory; each publish replaces the three entries.
#[derive(Debug, Default)]
pub struct MemoryTable {
    latest: MeasurementArrays,
    publish_count: usize,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `xOffset`, `distance` or `angle`.
    pub fn entry(&self, key: &str) -> Option<Vec<Option<f64>>> {
        let defined = |v: &[f64]| -> Vec<Option<f64>> { v.iter().copied().map(Some).collect() };
        match key {
            MeasurementArrays::X_OFFSET_KEY => Some(defined(&self.latest.x_offset)),
            MeasurementArrays::DISTANCE_KEY => Some(self.latest.distance.clone()),
            MeasurementArrays::ANGLE_KEY => Some(defined(&self.latest.angle)),
            _ => None,
        }
    }

    pub fn latest(&self) -> &MeasurementArrays {
        &self.latest
    }

    pub fn publish_count(&self) -> usize {
        self.publish_count
    }
}

impl MeasurementTable for MemoryTable {
    fn publish(&mut self, arrays: &MeasurementArrays) -> Result<(), TableError> {
        self.latest = arrays.clone();
        self.publish_count += 1;
        Ok(())
    }
}

#[derive(Serialize)]
struct TableRecord<'a> {
    table: &'a str,
    seq: u64,
    #[serde(flatten)]
    arrays: &'a MeasurementArrays,
}

/// Appends one JSON object per publish, one per line. Undefined distances
/// are written as `null`.
pub struct JsonLinesTable<W: Write> {
    name: String,
    writer: W,
    seq: u64,
}

impl<W: Write> JsonLinesTable<W> {
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
            seq: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MeasurementTable for JsonLinesTable<W> {
    fn publish(&mut self, arrays: &MeasurementArrays) -> Result<(), TableError> {
        let record = TableRecord {
            table: &self.name,
            seq: self.seq,
            arrays,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.seq += 1;
        Ok(())
    }
}

/// Counters of one worker run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Frames detected and published.
    pub frames_processed: usize,
    /// Frames skipped because decoding, detection or publishing failed.
    pub frames_failed: usize,
    /// Sum of the published array lengths.
    pub targets_published: usize,
}

/// Drives a detector from a frame source into a measurement table.
pub struct FrameWorker<'a, S, T> {
    detector: &'a TapeTargetDetector,
    source: S,
    table: T,
}

impl<'a, S: FrameSource, T: MeasurementTable> FrameWorker<'a, S, T> {
    pub fn new(detector: &'a TapeTargetDetector, source: S, table: T) -> Self {
        Self {
            detector,
            source,
            table,
        }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn into_parts(self) -> (S, T) {
        (self.source, self.table)
    }

    /// Process frames until the source is exhausted or `stop` is set.
    ///
    /// Per-frame failures are logged and counted; only an unrecoverable
    /// source error ends the run early.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
    pub fn run(&mut self, stop: &AtomicBool) -> Result<WorkerStats, WorkerError> {
        let mut stats = WorkerStats::default();
        while !stop.load(Ordering::Acquire) {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(err) if err.is_recoverable() => {
                    log::warn!("{err}");
                    stats.frames_failed += 1;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let result = match self.detector.process(&frame.image) {
                Ok(result) => result,
                Err(err) => {
                    log::warn!("{}: {err}", frame.label);
                    stats.frames_failed += 1;
                    continue;
                }
            };

            let arrays = result.arrays();
            match self.table.publish(&arrays) {
                Ok(()) => {
                    log::debug!("{}: published {} targets", frame.label, arrays.len());
                    stats.frames_processed += 1;
                    stats.targets_published += arrays.len();
                }
                Err(err) => {
                    log::warn!("{}: table write failed: {err}", frame.label);
                    stats.frames_failed += 1;
                }
            }
        }
        log::info!(
            "worker done: {} processed, {} failed, {} targets",
            stats.frames_processed,
            stats.frames_failed,
            stats.targets_published
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tape_targets_core::{CameraCalibration, Measurement};
    use tape_targets_detect::PipelineParams;

    fn detector() -> TapeTargetDetector {
        TapeTargetDetector::new(PipelineParams::default(), CameraCalibration::default())
            .expect("detector")
    }

    fn black_frames(n: usize) -> MemoryFrameSource {
        MemoryFrameSource::new((0..n).map(|_| RgbImage::new(320, 240)))
    }

    /// Sets the stop flag on its first publish.
    struct StopAfterFirst {
        inner: MemoryTable,
        stop: Arc<AtomicBool>,
    }

    impl MeasurementTable for StopAfterFirst {
        fn publish(&mut self, arrays: &MeasurementArrays) -> Result<(), TableError> {
            self.stop.store(true, Ordering::Release);
            self.inner.publish(arrays)
        }
    }

    struct FailingTable;

    impl MeasurementTable for FailingTable {
        fn publish(&mut self, _: &MeasurementArrays) -> Result<(), TableError> {
            Err(TableError::Io(std::io::Error::other("disconnected")))
        }
    }

    #[test]
    fn runs_until_source_is_exhausted() {
        let det = detector();
        let mut worker = FrameWorker::new(&det, black_frames(3), MemoryTable::new());
        let stats = worker.run(&AtomicBool::new(false)).expect("run");
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.frames_failed, 0);
        assert_eq!(worker.table().publish_count(), 3);
        assert!(worker.table().latest().is_empty());
    }

    #[test]
    fn preset_stop_flag_processes_nothing() {
        let det = detector();
        let mut worker = FrameWorker::new(&det, black_frames(3), MemoryTable::new());
        let stats = worker.run(&AtomicBool::new(true)).expect("run");
        assert_eq!(stats, WorkerStats::default());
    }

    #[test]
    fn stop_during_frame_finishes_that_frame() {
        let det = detector();
        let stop = Arc::new(AtomicBool::new(false));
        let table = StopAfterFirst {
            inner: MemoryTable::new(),
            stop: Arc::clone(&stop),
        };
        let mut worker = FrameWorker::new(&det, black_frames(5), table);
        let stats = worker.run(&stop).expect("run");
        assert_eq!(stats.frames_processed, 1);
        let (mut source, table) = worker.into_parts();
        assert_eq!(table.inner.publish_count(), 1);
        assert!(source.next_frame().expect("next").is_some());
    }

    #[test]
    fn mismatched_frames_are_skipped() {
        let det = detector();
        let source = MemoryFrameSource::new([
            RgbImage::new(320, 240),
            RgbImage::new(64, 48),
            RgbImage::new(320, 240),
        ]);
        let mut worker = FrameWorker::new(&det, source, MemoryTable::new());
        let stats = worker.run(&AtomicBool::new(false)).expect("run");
        assert_eq!(stats.frames_processed, 2);
        assert_eq!(stats.frames_failed, 1);
    }

    #[test]
    fn table_errors_do_not_stop_the_loop() {
        let det = detector();
        let mut worker = FrameWorker::new(&det, black_frames(2), FailingTable);
        let stats = worker.run(&AtomicBool::new(false)).expect("run");
        assert_eq!(stats.frames_processed, 0);
        assert_eq!(stats.frames_failed, 2);
    }

    #[test]
    fn memory_table_exposes_named_entries() {
        let mut table = MemoryTable::new();
        let arrays: MeasurementArrays = [Measurement {
            x_offset: 0.25,
            distance: None,
            angle: -0.1,
            vertical_angle: 0.0,
        }]
        .iter()
        .collect();
        table.publish(&arrays).expect("publish");
        assert_eq!(table.entry("xOffset"), Some(vec![Some(0.25)]));
        assert_eq!(table.entry("distance"), Some(vec![None]));
        assert_eq!(table.entry("angle"), Some(vec![Some(-0.1)]));
        assert_eq!(table.entry("yOffset"), None);
    }

    #[test]
    fn json_lines_table_writes_null_distance() {
        let mut table = JsonLinesTable::new("VisionTarget", Vec::new());
        let arrays: MeasurementArrays = [Measurement {
            x_offset: 0.0,
            distance: None,
            angle: 0.0,
            vertical_angle: 0.0,
        }]
        .iter()
        .collect();
        table.publish(&arrays).expect("publish");
        table.publish(&MeasurementArrays::default()).expect("publish");
        let text = String::from_utf8(table.into_inner()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
        assert_eq!(first["table"], "VisionTarget");
        assert_eq!(first["seq"], 0);
        assert!(first["distance"][0].is_null());
        assert_eq!(first["xOffset"][0], 0.0);
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("json");
        assert_eq!(second["seq"], 1);
        assert_eq!(second["angle"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn directory_source_skips_undecodable_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbImage::new(320, 240)
            .save(dir.path().join("b.png"))
            .expect("save");
        fs::write(dir.path().join("a.png"), b"not a png").expect("write");
        fs::write(dir.path().join("notes.txt"), b"ignored").expect("write");

        let source = DirectoryFrameSource::open(dir.path()).expect("open");
        assert_eq!(source.remaining(), 2);

        let det = detector();
        let mut worker = FrameWorker::new(&det, source, MemoryTable::new());
        let stats = worker.run(&AtomicBool::new(false)).expect("run");
        assert_eq!(stats.frames_failed, 1);
        assert_eq!(stats.frames_processed, 1);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let err = DirectoryFrameSource::open("/nonexistent/tape-frames").expect_err("missing");
        assert!(!err.is_recoverable());
    }
}
