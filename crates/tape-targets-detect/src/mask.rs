use image::{GrayImage, Luma};

/// Binary mask: one sample per frame pixel, `0` for background and
/// `BinaryMask::SET` for foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask(GrayImage);

impl BinaryMask {
    pub const SET: u8 = 255;

    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self(GrayImage::new(width, height))
    }

    /// Wrap a gray image, treating every non-zero sample as foreground.
    pub fn from_gray(mut gray: GrayImage) -> Self {
        for p in gray.pixels_mut() {
            if p.0[0] != 0 {
                *p = Luma([Self::SET]);
            }
        }
        Self(gray)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    #[inline]
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        let v = if on { Self::SET } else { 0 };
        self.0.put_pixel(x, y, Luma([v]));
    }

    /// Number of foreground pixels.
    pub fn count_set(&self) -> usize {
        self.0.as_raw().iter().filter(|&&v| v != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_raw().iter().all(|&v| v == 0)
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    pub fn into_gray(self) -> GrayImage {
        self.0
    }
}
