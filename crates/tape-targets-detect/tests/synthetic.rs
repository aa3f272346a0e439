use approx::assert_relative_eq;
use image::{Rgb, RgbImage};
use tape_targets_core::CameraCalibration;
use tape_targets_detect::{
    frame_from_rgb_slice, BlurKind, PipelineParams, TapeDetectError, TapeTargetDetector,
};

const TAPE_GREEN: Rgb<u8> = Rgb([60, 255, 60]);

/// Paint a filled strip of `width x height` px centered at `(cx, cy)` whose
/// long axis leans `tilt_deg` to the right of vertical.
fn paint_strip(frame: &mut RgbImage, cx: f64, cy: f64, width: f64, height: f64, tilt_deg: f64) {
    let t = tilt_deg.to_radians();
    let (s, c) = t.sin_cos();
    let (w, h) = frame.dimensions();
    for y in 0..h {
        for x in 0..w {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let along = dx * s - dy * c;
            let across = dx * c + dy * s;
            if along.abs() <= 0.5 * height && across.abs() <= 0.5 * width {
                frame.put_pixel(x, y, TAPE_GREEN);
            }
        }
    }
}

fn detector() -> TapeTargetDetector {
    let _ = env_logger::builder().is_test(true).try_init();
    TapeTargetDetector::new(PipelineParams::default(), CameraCalibration::default())
        .expect("default detector")
}

#[test]
fn black_frame_yields_empty_arrays() {
    let result = detector().process(&RgbImage::new(320, 240)).expect("frame");
    assert_eq!(result.counts.mask_pixels, 0);
    assert_eq!(result.counts.contours, 0);
    let arrays = result.arrays();
    assert!(arrays.x_offset.is_empty());
    assert!(arrays.distance.is_empty());
    assert!(arrays.angle.is_empty());
}

#[test]
fn tilted_pair_left_of_center_is_measured() {
    let mut frame = RgbImage::new(320, 240);
    paint_strip(&mut frame, 60.0, 120.0, 10.0, 50.0, 15.0);
    paint_strip(&mut frame, 140.0, 120.0, 10.0, 50.0, -15.0);

    let result = detector().process(&frame).expect("frame");
    assert_eq!(result.counts.rects, 2);
    assert_eq!(result.targets.len(), 1);

    let target = &result.targets[0];
    assert!(target.left_tape().angle < 40.0);
    assert!(target.right_tape().angle > 320.0);
    assert_relative_eq!(target.center_x(), 100.0, epsilon = 1.0);

    let m = &result.measurements[0];
    // target left of the optical axis: positive offset and bearing
    assert!(m.x_offset > 0.0);
    assert!(m.angle > 0.0);
    assert_relative_eq!(m.x_offset, 1.1 / 80.0 * 60.0, max_relative = 0.05);
    let d = m.distance.expect("off-axis distance");
    assert!(d > 0.0);

    let arrays = result.arrays();
    assert_eq!(arrays.len(), 1);
    assert_eq!(arrays.x_offset[0], m.x_offset);
}

#[test]
fn tilted_pair_right_of_center_has_negative_offset() {
    let mut frame = RgbImage::new(320, 240);
    paint_strip(&mut frame, 200.0, 100.0, 8.0, 40.0, 14.5);
    paint_strip(&mut frame, 260.0, 100.0, 8.0, 40.0, -14.5);

    let result = detector().process(&frame).expect("frame");
    assert_eq!(result.measurements.len(), 1);
    let m = &result.measurements[0];
    assert!(m.x_offset < 0.0);
    assert!(m.angle < 0.0);
    assert!(m.distance.expect("distance") > 0.0);
}

#[test]
fn strips_leaning_apart_do_not_pair() {
    let mut frame = RgbImage::new(320, 240);
    paint_strip(&mut frame, 60.0, 120.0, 10.0, 50.0, -15.0);
    paint_strip(&mut frame, 140.0, 120.0, 10.0, 50.0, 15.0);

    let result = detector().process(&frame).expect("frame");
    assert_eq!(result.counts.rects, 2);
    assert!(result.targets.is_empty());
    assert!(result.measurements.is_empty());
}

#[test]
fn single_strip_gives_rect_but_no_target() {
    let mut frame = RgbImage::new(320, 240);
    paint_strip(&mut frame, 160.0, 120.0, 10.0, 50.0, 15.0);
    let result = detector().process(&frame).expect("frame");
    assert_eq!(result.counts.rects, 1);
    assert!(result.targets.is_empty());
}

#[test]
fn raw_buffers_go_through_the_same_pipeline() {
    let mut frame = RgbImage::new(320, 240);
    paint_strip(&mut frame, 60.0, 120.0, 10.0, 50.0, 15.0);
    paint_strip(&mut frame, 140.0, 120.0, 10.0, 50.0, -15.0);
    let raw = frame.clone().into_raw();

    let rebuilt = frame_from_rgb_slice(320, 240, &raw).expect("buffer");
    let a = detector().process(&frame).expect("frame");
    let b = detector().process(&rebuilt).expect("buffer frame");
    assert_eq!(a, b);
}

#[test]
fn wrong_size_frame_is_an_error() {
    let err = detector()
        .process(&RgbImage::new(160, 120))
        .expect_err("mismatch");
    assert!(matches!(err, TapeDetectError::FrameSizeMismatch { .. }));
}

#[test]
fn partial_pipeline_json_keeps_other_defaults() {
    let params: PipelineParams =
        serde_json::from_str(r#"{ "blur": { "kind": "Median Filter", "radius": 1.0 } }"#)
            .expect("params");
    assert_eq!(params.blur.kind, BlurKind::Median);
    assert_eq!(params.filter, PipelineParams::default().filter);

    let detector =
        TapeTargetDetector::new(params, CameraCalibration::default()).expect("detector");
    let mut frame = RgbImage::new(320, 240);
    paint_strip(&mut frame, 60.0, 120.0, 10.0, 50.0, 15.0);
    paint_strip(&mut frame, 140.0, 120.0, 10.0, 50.0, -15.0);
    assert_eq!(detector.process(&frame).expect("frame").targets.len(), 1);
}
