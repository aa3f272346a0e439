use image::RgbImage;

use crate::TapeDetectError;

/// Copy a packed RGB8 buffer (row-major, no padding) into a frame.
pub fn frame_from_rgb_slice(
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<RgbImage, TapeDetectError> {
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return Err(TapeDetectError::BufferSize {
            width,
            height,
            expected,
            got: data.len(),
        });
    }
    RgbImage::from_raw(width, height, data.to_vec()).ok_or(TapeDetectError::BufferSize {
        width,
        height,
        expected,
        got: data.len(),
    })
}
