//! Frame smoothing ahead of color thresholding.

use image::{Rgb, RgbImage};
use imageproc::filter::{median_filter, separable_filter_equal};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurKind {
    #[default]
    #[serde(alias = "Box Blur")]
    Box,
    #[serde(alias = "Gaussian Blur")]
    Gaussian,
    #[serde(alias = "Median Filter")]
    Median,
    #[serde(alias = "Bilateral Filter")]
    Bilateral,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurParams {
    pub kind: BlurKind,
    /// Blur radius in pixels; rounded to the nearest integer before use.
    pub radius: f64,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kind: BlurKind::Box,
            radius: 2.7451980282168957,
        }
    }
}

/// Largest radius the filters accept; bigger values are clamped to it.
pub const MAX_KERNEL_RADIUS: u32 = 4096;

impl BlurParams {
    /// Integer radius actually used by the filters, at most
    /// [`MAX_KERNEL_RADIUS`].
    pub fn kernel_radius(&self) -> u32 {
        if self.radius.is_finite() && self.radius > 0.0 {
            (self.radius + 0.5).floor().min(MAX_KERNEL_RADIUS as f64) as u32
        } else {
            0
        }
    }

    /// Side length of the square kernel. Bilateral filtering has no fixed
    /// kernel; it uses the radius as both sigmas instead.
    pub fn kernel_size(&self) -> Option<u32> {
        let r = self.kernel_radius();
        match self.kind {
            BlurKind::Box | BlurKind::Median => Some(2 * r + 1),
            BlurKind::Gaussian => Some(6 * r + 1),
            BlurKind::Bilateral => None,
        }
    }
}

/// Smooth a frame with the configured filter. A zero radius returns a copy.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame), fields(width = frame.width(), height = frame.height()))
)]
pub fn blur_frame(frame: &RgbImage, params: &BlurParams) -> RgbImage {
    let r = params.kernel_radius();
    if r == 0 {
        return frame.clone();
    }
    match params.kind {
        BlurKind::Box => {
            let n = 2 * r + 1;
            let kernel = vec![1.0f32 / n as f32; n as usize];
            separable_filter_equal(frame, &kernel)
        }
        BlurKind::Gaussian => separable_filter_equal(frame, &gaussian_kernel(r)),
        BlurKind::Median => median_filter(frame, r, r),
        BlurKind::Bilateral => bilateral_filter(frame, r as f32, r as f32),
    }
}

/// Normalized 1-D gaussian of length `6r + 1` with sigma `r`.
fn gaussian_kernel(r: u32) -> Vec<f32> {
    let sigma = r as f32;
    let half = 3 * r as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Edge-preserving bilateral filter.
///
/// The window radius is `round(1.5 * sigma_space)`; the color distance is the
/// sum of absolute channel differences. Borders are clamped.
fn bilateral_filter(frame: &RgbImage, sigma_color: f32, sigma_space: f32) -> RgbImage {
    let (w, h) = frame.dimensions();
    let radius = (1.5 * sigma_space).round() as i32;
    let color_coeff = -0.5 / (sigma_color * sigma_color);
    let space_coeff = -0.5 / (sigma_space * sigma_space);

    // distance LUTs: color distances span 0..=3*255
    let color_lut: Vec<f32> = (0..=3 * 255)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();
    let mut offsets = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d2 = (dx * dx + dy * dy) as f32;
            if d2.sqrt() > radius as f32 {
                continue;
            }
            offsets.push((dx, dy, (d2 * space_coeff).exp()));
        }
    }

    let max_x = w as i32 - 1;
    let max_y = h as i32 - 1;
    RgbImage::from_fn(w, h, |x, y| {
        let center = frame.get_pixel(x, y).0;
        let mut acc = [0.0f32; 3];
        let mut wsum = 0.0f32;
        for &(dx, dy, ws) in &offsets {
            let sx = (x as i32 + dx).clamp(0, max_x) as u32;
            let sy = (y as i32 + dy).clamp(0, max_y) as u32;
            let p = frame.get_pixel(sx, sy).0;
            let dist = (0..3)
                .map(|c| (p[c] as i32 - center[c] as i32).unsigned_abs() as usize)
                .sum::<usize>();
            let weight = ws * color_lut[dist];
            for c in 0..3 {
                acc[c] += weight * p[c] as f32;
            }
            wsum += weight;
        }
        let out = acc.map(|v| (v / wsum).round().clamp(0.0, 255.0) as u8);
        Rgb(out)
    })
}
