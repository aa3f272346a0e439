//! Debug drawing of a frame result on top of its frame.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_polygon_mut, draw_line_segment_mut};
use imageproc::point::Point;

use tape_targets_core::RotatedRect;
use tape_targets_detect::FrameResult;

/// Outline of every fitted strip.
pub const RECT_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
/// Line joining the two strips of a target, and its center mark.
pub const TARGET_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

fn outline(rect: &RotatedRect) -> [Point<f32>; 4] {
    rect.corners().map(|c| Point::new(c.x as f32, c.y as f32))
}

/// Copy of `frame` with the fitted rectangles outlined and each paired
/// target marked by a line between its strips and a cross at its center.
pub fn draw_overlay(frame: &RgbImage, result: &FrameResult) -> RgbImage {
    let mut canvas = frame.clone();
    for rect in &result.rects {
        draw_hollow_polygon_mut(&mut canvas, &outline(rect), RECT_COLOR);
    }
    for target in &result.targets {
        let (l, r) = (target.left_tape().center, target.right_tape().center);
        draw_line_segment_mut(
            &mut canvas,
            (l.x as f32, l.y as f32),
            (r.x as f32, r.y as f32),
            TARGET_COLOR,
        );
        draw_cross_mut(
            &mut canvas,
            TARGET_COLOR,
            target.center_x().round() as i32,
            target.center_y().round() as i32,
        );
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use tape_targets_core::GoalTarget;
    use tape_targets_detect::StageCounts;

    fn strip(x: f64, angle: f64) -> RotatedRect {
        RotatedRect {
            center: Point2::new(x, 30.0),
            width: 6.0,
            height: 30.0,
            angle,
        }
    }

    #[test]
    fn empty_result_leaves_frame_untouched() {
        let frame = RgbImage::from_pixel(40, 30, Rgb([10, 20, 30]));
        let out = draw_overlay(&frame, &FrameResult::default());
        assert_eq!(out, frame);
    }

    #[test]
    fn rects_and_targets_are_drawn() {
        let (left, right) = (strip(20.0, 15.0), strip(60.0, 345.0));
        let target = GoalTarget::new(left, right).expect("ordered pair");
        let result = FrameResult {
            counts: StageCounts::default(),
            rects: vec![left, right],
            targets: vec![target],
            measurements: Vec::new(),
        };
        let out = draw_overlay(&RgbImage::new(80, 60), &result);

        let top = left.corners()[0];
        let (x, y) = (top.x.round() as u32, top.y.round() as u32);
        let near_corner = (x - 1..=x + 1)
            .flat_map(|px| (y - 1..=y + 1).map(move |py| (px, py)))
            .any(|(px, py)| *out.get_pixel(px, py) == RECT_COLOR);
        assert!(near_corner, "no outline near ({x}, {y})");
        assert_eq!(*out.get_pixel(40, 30), TARGET_COLOR);
    }
}
