//! Contour type and the polygon measures used to accept or reject it.
//!
//! All measures treat the contour as a closed polygon through its points in
//! order. Points are integer pixel coordinates (x right, y down).

use imageproc::geometry;
use imageproc::point::Point;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Whether a boundary encloses a foreground region or a hole inside one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    Outer,
    Hole,
}

/// Closed boundary traced in a binary mask.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
    pub kind: BoundaryKind,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>, kind: BoundaryKind) -> Self {
        Self { points, kind }
    }

    /// Number of stored vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area (absolute shoelace sum).
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.points)
    }

    pub fn convex_hull(&self) -> Vec<Point2<i32>> {
        convex_hull(&self.points)
    }
}

/// Upright integer bounding box. `width`/`height` count pixels, so a single
/// point has a 1x1 box.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn of(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Width over height.
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

fn to_imageproc(points: &[Point2<i32>]) -> Vec<Point<i32>> {
    points.iter().map(|p| Point::new(p.x, p.y)).collect()
}

/// Absolute polygon area via the shoelace formula.
pub fn polygon_area(points: &[Point2<i32>]) -> f64 {
    geometry::contour_area(&to_imageproc(points))
}

/// Polyline length; `closed` adds the segment from the last point back to
/// the first when there are at least three points.
pub fn arc_length(points: &[Point2<i32>], closed: bool) -> f64 {
    geometry::arc_length(&to_imageproc(points), closed)
}

/// Convex hull. Collinear points are dropped and duplicates collapse.
pub fn convex_hull(points: &[Point2<i32>]) -> Vec<Point2<i32>> {
    let mut pts = to_imageproc(points);
    // the angular sort needs distinct points
    pts.sort_unstable_by_key(|p| (p.x, p.y));
    pts.dedup();
    geometry::convex_hull(pts)
        .into_iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point2<i32>> {
        raw.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn square_measures() {
        let c = Contour::new(
            pts(&[(0, 0), (0, 9), (9, 9), (9, 0)]),
            BoundaryKind::Outer,
        );
        assert_relative_eq!(c.area(), 81.0);
        assert_relative_eq!(c.perimeter(), 36.0);
        let bb = c.bounding_box().expect("bbox");
        assert_eq!((bb.x, bb.y, bb.width, bb.height), (0, 0, 10, 10));
    }

    #[test]
    fn area_ignores_winding() {
        let cw = pts(&[(0, 0), (4, 0), (4, 3), (0, 3)]);
        let mut ccw = cw.clone();
        ccw.reverse();
        assert_relative_eq!(polygon_area(&cw), 12.0);
        assert_relative_eq!(polygon_area(&ccw), 12.0);
    }

    #[test]
    fn hull_of_concave_shape_fills_notch() {
        // "U" shape: hull is the outer rectangle.
        let u = pts(&[(0, 0), (0, 6), (6, 6), (6, 0), (4, 0), (4, 4), (2, 4), (2, 0)]);
        let hull = convex_hull(&u);
        assert_eq!(hull.len(), 4);
        assert_relative_eq!(polygon_area(&hull), 36.0);
        assert!(polygon_area(&u) < polygon_area(&hull));
    }

    #[test]
    fn hull_of_collinear_points_is_degenerate() {
        let line = pts(&[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let hull = convex_hull(&line);
        assert_eq!(hull.len(), 2);
        assert_relative_eq!(polygon_area(&hull), 0.0);
    }

    #[test]
    fn hull_ignores_repeated_points() {
        let traced = pts(&[(0, 0), (0, 0), (5, 0), (5, 4), (5, 4), (0, 4), (0, 0)]);
        let hull = convex_hull(&traced);
        assert_eq!(hull.len(), 4);
        assert_relative_eq!(polygon_area(&hull), 20.0);
    }

    #[test]
    fn single_point_box_is_one_pixel() {
        let bb = BoundingBox::of(&pts(&[(3, 7)])).expect("bbox");
        assert_eq!((bb.width, bb.height), (1, 1));
        assert!(BoundingBox::of(&[]).is_none());
    }
}
