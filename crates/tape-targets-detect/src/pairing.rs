//! Ordering of fitted strips and pairing into goal targets.

use serde::{Deserialize, Serialize};
use tape_targets_core::{GoalTarget, RotatedRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Angle thresholds (degrees, `[0, 360)`) that tell the two strips apart.
///
/// A strip leaning left reports an angle above `upper_angle_deg`; a strip
/// leaning right reports one below `lower_angle_deg`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingParams {
    pub upper_angle_deg: f64,
    pub lower_angle_deg: f64,
}

impl Default for PairingParams {
    fn default() -> Self {
        Self {
            upper_angle_deg: 320.0,
            lower_angle_deg: 40.0,
        }
    }
}

/// Stable ascending sort by `center.x`. NaN centers sort last.
pub fn sort_by_center_x(rects: &mut [RotatedRect]) {
    rects.sort_by(|a, b| a.center.x.total_cmp(&b.center.x));
}

/// Decide which strip of a chunk is the left tape.
///
/// Returns `(left, right)` or `None` when the angles do not form a pair. The
/// horizontal order is not checked here.
pub fn assign_sides(
    first: &RotatedRect,
    second: &RotatedRect,
    params: &PairingParams,
) -> Option<(RotatedRect, RotatedRect)> {
    let leans_left = |r: &RotatedRect| r.angle > params.upper_angle_deg;
    let leans_right = |r: &RotatedRect| r.angle < params.lower_angle_deg;

    if leans_left(first) && leans_right(second) {
        Some((*second, *first))
    } else if leans_right(first) && leans_left(second) {
        Some((*first, *second))
    } else {
        None
    }
}

/// Pair consecutive strips of an x-sorted slice (0&1, 2&3, ...).
///
/// A trailing odd strip is ignored. Chunks whose angle-assigned sides
/// contradict their horizontal order are dropped.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(sorted, params), fields(n = sorted.len()))
)]
pub fn pair_targets(sorted: &[RotatedRect], params: &PairingParams) -> Vec<GoalTarget> {
    let targets: Vec<GoalTarget> = sorted
        .chunks_exact(2)
        .filter_map(|chunk| {
            let (left, right) = assign_sides(&chunk[0], &chunk[1], params)?;
            let target = GoalTarget::new(left, right);
            if target.is_none() {
                log::trace!(
                    "dropping chunk at x={:.1}/{:.1}: sides contradict order",
                    chunk[0].center.x,
                    chunk[1].center.x
                );
            }
            target
        })
        .collect();
    log::debug!("paired {} targets from {} strips", targets.len(), sorted.len());
    targets
}

/// Sort `rects` in place, then pair them.
pub fn order_and_pair(rects: &mut [RotatedRect], params: &PairingParams) -> Vec<GoalTarget> {
    sort_by_center_x(rects);
    pair_targets(rects, params)
}
