//! Renders one band into the slice of the image it owns.

use itertools::iproduct;

use crate::bands::Band;
use crate::escape::{escape_time, intensity};
use crate::planes::{Pixel, PlaneMapper};

/// Fill `pixels`, the band's rows of the image laid out row-major,
/// with grayscale escape times.  Points are computed from the whole
/// image's mapping, not the band's sub-viewport, so a pixel comes out
/// the same no matter how the image was cut into bands.
pub fn render_band(plane: &PlaneMapper, band: &Band, pixels: &mut [u8]) {
    debug_assert_eq!(pixels.len(), band.row_count * plane.width());
    let coordinates = iproduct!(band.start_row..band.end_row(), 0..plane.width());
    for (pixel, (row, column)) in pixels.iter_mut().zip(coordinates) {
        let point = plane.pixel_to_point(&Pixel(column, row));
        *pixel = intensity(escape_time(point));
    }
}
