//! HLS color thresholding into a binary mask.
//!
//! Colors are converted to the 8-bit HLS layout: hue in `[0, 180)` (degrees
//! halved), lightness and saturation in `[0, 255]`.

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::mask::BinaryMask;

/// Inclusive acceptance range per HLS channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsRange {
    pub hue: [f64; 2],
    pub saturation: [f64; 2],
    pub luminance: [f64; 2],
}

impl Default for HlsRange {
    /// Range tuned for green-lit retro-reflective tape.
    fn default() -> Self {
        Self {
            hue: [59.89208633093525, 121.63822525597269],
            saturation: [91.72661870503596, 255.0],
            luminance: [123.83093525179856, 239.76962457337885],
        }
    }
}

impl HlsRange {
    /// Test one pixel given as `[hue, lightness, saturation]`.
    #[inline]
    pub fn contains(&self, hls: [u8; 3]) -> bool {
        let within = |v: u8, [lo, hi]: [f64; 2]| {
            let v = v as f64;
            v >= lo && v <= hi
        };
        within(hls[0], self.hue) && within(hls[1], self.luminance) && within(hls[2], self.saturation)
    }
}

/// Convert one RGB pixel to `[hue, lightness, saturation]`.
pub fn rgb_to_hls(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let vmax = r.max(g).max(b);
    let vmin = r.min(g).min(b);
    let diff = vmax - vmin;
    let l = 0.5 * (vmax + vmin);

    let (mut h, s) = if diff > f32::EPSILON {
        let s = if l < 0.5 {
            diff / (vmax + vmin)
        } else {
            diff / (2.0 - vmax - vmin)
        };
        let scale = 60.0 / diff;
        let h = if vmax == r {
            (g - b) * scale
        } else if vmax == g {
            (b - r) * scale + 120.0
        } else {
            (r - g) * scale + 240.0
        };
        (h, s)
    } else {
        (0.0, 0.0)
    };
    if h < 0.0 {
        h += 360.0;
    }

    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    [to_u8(h * 0.5), to_u8(l * 255.0), to_u8(s * 255.0)]
}

/// Mark every pixel whose HLS value falls inside `range`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame), fields(width = frame.width(), height = frame.height()))
)]
pub fn hls_threshold(frame: &RgbImage, range: &HlsRange) -> BinaryMask {
    let mut out = GrayImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(out.pixels_mut()) {
        if range.contains(rgb_to_hls(src.0)) {
            *dst = Luma([BinaryMask::SET]);
        }
    }
    BinaryMask::from_gray(out)
}
