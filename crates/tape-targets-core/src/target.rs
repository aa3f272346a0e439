use serde::Serialize;

use crate::RotatedRect;

/// One physical target: a left and a right tape strip.
///
/// The left tape is always strictly left of the right tape in the image,
/// which keeps `width()` positive and the measurement signs meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GoalTarget {
    left_tape: RotatedRect,
    right_tape: RotatedRect,
}

impl GoalTarget {
    /// Build a target, or `None` if `left_tape` is not strictly left of `right_tape`.
    pub fn new(left_tape: RotatedRect, right_tape: RotatedRect) -> Option<Self> {
        (left_tape.center.x < right_tape.center.x).then_some(Self {
            left_tape,
            right_tape,
        })
    }

    #[inline]
    pub fn left_tape(&self) -> &RotatedRect {
        &self.left_tape
    }

    #[inline]
    pub fn right_tape(&self) -> &RotatedRect {
        &self.right_tape
    }

    pub fn center_x(&self) -> f64 {
        0.5 * (self.left_tape.center.x + self.right_tape.center.x)
    }

    pub fn center_y(&self) -> f64 {
        0.5 * (self.left_tape.center.y + self.right_tape.center.y)
    }

    /// Horizontal pixel distance between the tape centers.
    pub fn width(&self) -> f64 {
        self.right_tape.center.x - self.left_tape.center.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn tape(x: f64, y: f64) -> RotatedRect {
        RotatedRect {
            center: Point2::new(x, y),
            width: 5.0,
            height: 20.0,
            angle: 0.0,
        }
    }

    #[test]
    fn derived_geometry() {
        let t = GoalTarget::new(tape(100.0, 50.0), tape(140.0, 54.0)).expect("ordered");
        assert_eq!(t.center_x(), 120.0);
        assert_eq!(t.center_y(), 52.0);
        assert_eq!(t.width(), 40.0);
    }

    #[test]
    fn rejects_unordered_tapes() {
        assert!(GoalTarget::new(tape(140.0, 0.0), tape(100.0, 0.0)).is_none());
        assert!(GoalTarget::new(tape(100.0, 0.0), tape(100.0, 0.0)).is_none());
    }
}
