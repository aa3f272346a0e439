//! Minimal-area rotated rectangles.
//!
//! Angle convention: `height` runs along the rectangle's long axis and
//! `width` across it, so `width <= height`. `angle` is the tilt of the long
//! axis away from image vertical in degrees, positive when the top of the
//! axis leans to the right on screen (image y grows downwards), wrapped into
//! `[0, 360)`. A strip leaning right (`/`) reports a small angle, a strip
//! leaning left (`\`) reports an angle just below 360.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::contour::convex_hull;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f64>,
    /// Extent across the long axis.
    pub width: f64,
    /// Extent along the long axis.
    pub height: f64,
    /// Long-axis tilt in degrees, `[0, 360)`.
    pub angle: f64,
}

impl RotatedRect {
    /// Corner points, starting at the top end of the long axis and going
    /// around the rectangle.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let t = self.angle.to_radians();
        // unit vector pointing "up" the long axis, and its right-hand normal
        let up = Vector2::new(t.sin(), -t.cos());
        let across = Vector2::new(t.cos(), t.sin());
        let h = up * (0.5 * self.height);
        let w = across * (0.5 * self.width);
        [
            self.center + h - w,
            self.center + h + w,
            self.center - h + w,
            self.center - h - w,
        ]
    }
}

/// Tilt of an undirected axis from image vertical, wrapped into `[0, 360)`.
fn axis_angle_deg(axis: Vector2<f64>) -> f64 {
    // orient the axis upwards (negative y); a horizontal axis points right
    let dir = if axis.y > 0.0 || (axis.y == 0.0 && axis.x < 0.0) {
        -axis
    } else {
        axis
    };
    let mut tilt = dir.x.atan2(-dir.y).to_degrees();
    if tilt <= -90.0 {
        tilt += 180.0;
    }
    if tilt < 0.0 {
        tilt += 360.0;
    }
    if tilt >= 360.0 {
        tilt -= 360.0;
    }
    tilt
}

/// Fit the minimal-area enclosing rectangle of a point set.
///
/// Returns `None` when the convex hull has fewer than three vertices
/// (empty, single-point or collinear input).
pub fn min_area_rect(points: &[Point2<i32>]) -> Option<RotatedRect> {
    let hull: Vec<Point2<f64>> = convex_hull(points)
        .into_iter()
        .map(|p| Point2::new(p.x as f64, p.y as f64))
        .collect();
    if hull.len() < 3 {
        return None;
    }

    // (area, u-axis, u-range, v-range)
    let mut best: Option<(f64, Vector2<f64>, (f64, f64), (f64, f64))> = None;
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let edge = b - a;
        let len = edge.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut u_min, mut u_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut v_min, mut v_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let d = p.coords;
            let pu = d.dot(&u);
            let pv = d.dot(&v);
            u_min = u_min.min(pu);
            u_max = u_max.max(pu);
            v_min = v_min.min(pv);
            v_max = v_max.max(pv);
        }
        let area = (u_max - u_min) * (v_max - v_min);
        if best.map(|cur| area < cur.0).unwrap_or(true) {
            best = Some((area, u, (u_min, u_max), (v_min, v_max)));
        }
    }

    let (_, u, (u_min, u_max), (v_min, v_max)) = best?;
    let v = Vector2::new(-u.y, u.x);
    let extent_u = u_max - u_min;
    let extent_v = v_max - v_min;
    let center = Point2::from(u * (0.5 * (u_min + u_max)) + v * (0.5 * (v_min + v_max)));

    let (long_axis, width, height) = if extent_u >= extent_v {
        (u, extent_v, extent_u)
    } else {
        (v, extent_u, extent_v)
    };

    Some(RotatedRect {
        center,
        width,
        height,
        angle: axis_angle_deg(long_axis),
    })
}
