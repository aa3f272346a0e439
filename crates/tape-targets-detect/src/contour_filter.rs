//! Geometric acceptance of candidate contours.
//!
//! Every criterion is checked on its own; a contour survives only if none of
//! them fails. Survivors keep their input order.

use serde::{Deserialize, Serialize};
use tape_targets_core::{polygon_area, Contour};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Acceptance bounds. All ranges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourFilterParams {
    pub min_area: f64,
    pub min_perimeter: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
    /// `[min, max]` of `100 * area / hull_area`.
    pub solidity: [f64; 2],
    pub min_vertices: f64,
    pub max_vertices: f64,
    /// Bounding box width over height.
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl Default for ContourFilterParams {
    fn default() -> Self {
        Self {
            min_area: 20.0,
            min_perimeter: 0.0,
            min_width: 0.0,
            max_width: 1000.0,
            min_height: 0.0,
            max_height: 1000.0,
            solidity: [60.251798561151084, 100.0],
            min_vertices: 0.0,
            max_vertices: 1_000_000.0,
            min_ratio: 0.0,
            max_ratio: 1000.0,
        }
    }
}

/// Why a contour was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Empty,
    Width,
    Height,
    Area,
    Perimeter,
    /// Convex hull has no area, so solidity is undefined.
    DegenerateHull,
    Solidity,
    Vertices,
    Ratio,
}

/// Shape measures of one contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourMetrics {
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub perimeter: f64,
    /// `None` when the hull area is zero.
    pub solidity: Option<f64>,
    pub vertices: usize,
    pub ratio: f64,
}

impl ContourMetrics {
    /// Measure a contour; `None` for an empty one.
    pub fn measure(contour: &Contour) -> Option<Self> {
        let bb = contour.bounding_box()?;
        let area = contour.area();
        let hull_area = polygon_area(&contour.convex_hull());
        let solidity = (hull_area > 0.0).then(|| 100.0 * area / hull_area);
        Some(Self {
            width: bb.width as f64,
            height: bb.height as f64,
            area,
            perimeter: contour.perimeter(),
            solidity,
            vertices: contour.len(),
            ratio: bb.aspect_ratio(),
        })
    }
}

impl ContourFilterParams {
    /// Every failed criterion for `metrics`; empty means accepted.
    pub fn check(&self, metrics: &ContourMetrics) -> Vec<Rejection> {
        let within = |v: f64, lo: f64, hi: f64| v >= lo && v <= hi;
        let mut failed = Vec::new();
        if !within(metrics.width, self.min_width, self.max_width) {
            failed.push(Rejection::Width);
        }
        if !within(metrics.height, self.min_height, self.max_height) {
            failed.push(Rejection::Height);
        }
        if metrics.area < self.min_area {
            failed.push(Rejection::Area);
        }
        if metrics.perimeter < self.min_perimeter {
            failed.push(Rejection::Perimeter);
        }
        match metrics.solidity {
            None => failed.push(Rejection::DegenerateHull),
            Some(s) if !within(s, self.solidity[0], self.solidity[1]) => {
                failed.push(Rejection::Solidity)
            }
            Some(_) => {}
        }
        if !within(metrics.vertices as f64, self.min_vertices, self.max_vertices) {
            failed.push(Rejection::Vertices);
        }
        if !within(metrics.ratio, self.min_ratio, self.max_ratio) {
            failed.push(Rejection::Ratio);
        }
        failed
    }

    /// Accept or reject a single contour.
    pub fn accepts(&self, contour: &Contour) -> bool {
        match ContourMetrics::measure(contour) {
            Some(m) => self.check(&m).is_empty(),
            None => false,
        }
    }

    /// Check a contour and report what failed.
    pub fn evaluate(&self, contour: &Contour) -> Result<ContourMetrics, Vec<Rejection>> {
        let metrics = ContourMetrics::measure(contour).ok_or_else(|| vec![Rejection::Empty])?;
        let failed = self.check(&metrics);
        if failed.is_empty() {
            Ok(metrics)
        } else {
            Err(failed)
        }
    }
}

/// Keep the contours that pass every criterion, in input order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(contours, params), fields(n = contours.len()))
)]
pub fn filter_contours(contours: Vec<Contour>, params: &ContourFilterParams) -> Vec<Contour> {
    let total = contours.len();
    let kept: Vec<Contour> = contours
        .into_iter()
        .filter(|c| match params.evaluate(c) {
            Ok(_) => true,
            Err(failed) => {
                log::trace!("rejected contour ({} pts): {:?}", c.len(), failed);
                false
            }
        })
        .collect();
    log::debug!("contour filter kept {}/{}", kept.len(), total);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use tape_targets_core::BoundaryKind;

    fn poly(raw: &[(i32, i32)]) -> Contour {
        Contour::new(
            raw.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
            BoundaryKind::Outer,
        )
    }

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Contour {
        poly(&[(x, y), (x, y + h), (x + w, y + h), (x + w, y)])
    }

    fn sample_contours() -> Vec<Contour> {
        vec![
            rect(0, 0, 10, 30),
            rect(50, 0, 2, 2),
            // deep "U": low solidity
            poly(&[(0, 0), (0, 20), (20, 20), (20, 0), (18, 0), (18, 18), (2, 18), (2, 0)]),
            rect(100, 10, 40, 8),
            poly(&[(0, 0), (5, 5), (10, 10)]),
            rect(200, 50, 6, 25),
        ]
    }

    #[test]
    fn defaults_reject_small_and_concave() {
        let kept = filter_contours(sample_contours(), &ContourFilterParams::default());
        let firsts: Vec<Point2<i32>> = kept.iter().map(|c| c.points[0]).collect();
        assert_eq!(
            firsts,
            vec![Point2::new(0, 0), Point2::new(100, 10), Point2::new(200, 50)]
        );
    }

    #[test]
    fn metrics_of_rectangle() {
        let m = ContourMetrics::measure(&rect(0, 0, 10, 30)).expect("metrics");
        assert_eq!(m.area, 300.0);
        assert_eq!(m.width, 11.0);
        assert_eq!(m.height, 31.0);
        assert_eq!(m.vertices, 4);
        assert_eq!(m.solidity, Some(100.0));
        assert_eq!(m.perimeter, 80.0);
    }

    #[test]
    fn collinear_contour_reports_degenerate_hull() {
        let params = ContourFilterParams {
            min_area: 0.0,
            ..ContourFilterParams::default()
        };
        let failed = params
            .evaluate(&poly(&[(0, 0), (5, 5), (10, 10)]))
            .expect_err("degenerate");
        assert!(failed.contains(&Rejection::DegenerateHull));
    }

    #[test]
    fn every_failed_criterion_is_reported() {
        let params = ContourFilterParams {
            max_width: 5.0,
            max_vertices: 3.0,
            ..ContourFilterParams::default()
        };
        let failed = params.evaluate(&rect(0, 0, 10, 30)).expect_err("rejected");
        assert_eq!(failed, vec![Rejection::Width, Rejection::Vertices]);
    }

    #[test]
    fn empty_contour_is_rejected() {
        let empty = Contour::new(Vec::new(), BoundaryKind::Outer);
        assert!(!ContourFilterParams::default().accepts(&empty));
        assert_eq!(
            ContourFilterParams::default().evaluate(&empty),
            Err(vec![Rejection::Empty])
        );
    }

    #[test]
    fn output_is_ordered_subset_of_input() {
        let input = sample_contours();
        let kept = filter_contours(input.clone(), &ContourFilterParams::default());
        let mut cursor = 0;
        for c in &kept {
            let pos = input[cursor..]
                .iter()
                .position(|i| i == c)
                .expect("kept contour comes from input");
            cursor += pos + 1;
        }
    }

    #[test]
    fn relaxing_any_bound_never_drops_accepted_contours() {
        let strict = ContourFilterParams {
            min_area: 50.0,
            min_perimeter: 30.0,
            min_width: 3.0,
            max_width: 45.0,
            min_height: 3.0,
            max_height: 40.0,
            solidity: [80.0, 100.0],
            min_vertices: 4.0,
            max_vertices: 10.0,
            min_ratio: 0.2,
            max_ratio: 6.0,
        };
        let relaxations: [fn(&mut ContourFilterParams); 11] = [
            |p: &mut ContourFilterParams| p.min_area = 0.0,
            |p: &mut ContourFilterParams| p.min_perimeter = 0.0,
            |p: &mut ContourFilterParams| p.min_width = 0.0,
            |p: &mut ContourFilterParams| p.max_width = f64::INFINITY,
            |p: &mut ContourFilterParams| p.min_height = 0.0,
            |p: &mut ContourFilterParams| p.max_height = f64::INFINITY,
            |p: &mut ContourFilterParams| p.solidity = [0.0, f64::INFINITY],
            |p: &mut ContourFilterParams| p.min_vertices = 0.0,
            |p: &mut ContourFilterParams| p.max_vertices = f64::INFINITY,
            |p: &mut ContourFilterParams| p.min_ratio = 0.0,
            |p: &mut ContourFilterParams| p.max_ratio = f64::INFINITY,
        ];

        let input = sample_contours();
        let baseline: Vec<bool> = input.iter().map(|c| strict.accepts(c)).collect();
        assert!(baseline.iter().any(|&b| b));
        for relax in relaxations {
            let mut loose = strict;
            relax(&mut loose);
            for (c, &was) in input.iter().zip(&baseline) {
                if was {
                    assert!(loose.accepts(c));
                }
            }
        }
    }
}
