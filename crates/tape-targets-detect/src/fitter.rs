use tape_targets_core::{min_area_rect, Contour, RotatedRect};

/// Fit a minimal-area rotated rectangle to every contour.
///
/// Degenerate contours (fewer than three distinct hull points) are skipped,
/// so the output may be shorter than the input.
pub fn fit_rects(contours: &[Contour]) -> Vec<RotatedRect> {
    contours
        .iter()
        .filter_map(|c| {
            let rect = min_area_rect(&c.points);
            if rect.is_none() {
                log::trace!("skipping degenerate contour ({} pts)", c.len());
            }
            rect
        })
        .collect()
}
