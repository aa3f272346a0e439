//! Boundary extraction from binary masks.

use imageproc::contours::{find_contours, BorderType};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use tape_targets_core::{BoundaryKind, Contour};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::mask::BinaryMask;

/// How many boundary points to keep per contour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainApprox {
    /// Every boundary pixel.
    None,
    /// Only the end points of straight horizontal, vertical and diagonal runs.
    #[default]
    Simple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourParams {
    /// Keep only outermost boundaries (no holes, nothing nested in a hole).
    pub external_only: bool,
    pub approximation: ChainApprox,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            external_only: true,
            approximation: ChainApprox::Simple,
        }
    }
}

/// Trace the boundaries of the foreground regions of `mask`.
///
/// The order of the result follows the raster scan that discovered each
/// boundary; it carries no spatial meaning.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask), fields(width = mask.width(), height = mask.height()))
)]
pub fn extract_contours(mask: &BinaryMask, params: &ContourParams) -> Vec<Contour> {
    if mask.is_empty() {
        return Vec::new();
    }

    find_contours::<i32>(mask.as_gray())
        .into_iter()
        .filter(|c| {
            !params.external_only || (c.border_type == BorderType::Outer && c.parent.is_none())
        })
        .map(|c| {
            let kind = match c.border_type {
                BorderType::Outer => BoundaryKind::Outer,
                BorderType::Hole => BoundaryKind::Hole,
            };
            let mut points: Vec<Point2<i32>> =
                c.points.iter().map(|p| Point2::new(p.x, p.y)).collect();
            points.dedup();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            let points = match params.approximation {
                ChainApprox::None => points,
                ChainApprox::Simple => compress_runs(&points),
            };
            Contour::new(points, kind)
        })
        .collect()
}

/// Drop the interior points of straight runs of a closed 8-connected chain.
pub fn compress_runs(points: &[Point2<i32>]) -> Vec<Point2<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let step = |a: Point2<i32>, b: Point2<i32>| -> Vector2<i32> { b - a };
    let kept: Vec<Point2<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();
    if kept.is_empty() {
        points[..1].to_vec()
    } else {
        kept
    }
}
