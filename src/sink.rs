//! Writes a finished image to disk as 8-bit grayscale.

use image::ColorType;
use std::convert::TryFrom;
use std::path::Path;

use crate::error::RenderError;

/// Write the buffer `pixels`, whose dimensions are given by `width`
/// and `height`, to `path`.  The file format follows the extension.
pub fn write_image(
    path: &Path,
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Result<(), RenderError> {
    let dimension = |side: usize| {
        u32::try_from(side).map_err(|_| {
            RenderError::InvalidConfiguration(format!(
                "{}x{} is too large to encode",
                width, height
            ))
        })
    };
    let (w, h) = (dimension(width)?, dimension(height)?);
    if pixels.len() != width * height {
        return Err(RenderError::UnfittingBuffer {
            expected: width * height,
            actual: pixels.len(),
        });
    }
    image::save_buffer(path, pixels, w, h, ColorType::L8).map_err(|cause| {
        RenderError::PersistenceFailure {
            path: path.display().to_string(),
            cause,
        }
    })
}
