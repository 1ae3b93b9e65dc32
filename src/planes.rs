//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0
//! in the upper-left corner, and a rectangle on the complex plane
//! defined by its upper-left and lower-right corners.
use num::Complex;

use crate::error::RenderError;

/// Describes the width and height of the image.  The integral plane
/// is assumed to start at 0,0, with rows growing downward.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageSpec {
    /// Pixels per row.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl ImageSpec {
    /// Both sides must be positive, and the whole image must be
    /// addressable as a single buffer.
    pub fn new(width: usize, height: usize) -> Result<ImageSpec, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidConfiguration(format!(
                "image size {}x{} has an empty side",
                width, height
            )));
        }
        if width.checked_mul(height).is_none() {
            return Err(RenderError::InvalidConfiguration(format!(
                "image size {}x{} does not fit in memory",
                width, height
            )));
        }
        Ok(ImageSpec { width, height })
    }

    /// The total number of pixels.  Used to calculate memory needs.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the image is of a size.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The rectangle of the complex plane that is mapped onto the image,
/// treating the real part of each value as the x-component and the
/// imaginary part as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Maps to pixel (0, 0).
    pub upper_left: Complex<f64>,
    /// Maps to pixel (width, height).
    pub lower_right: Complex<f64>,
}

impl Viewport {
    /// Rejects rectangles that are empty or flipped on either axis.
    pub fn new(
        upper_left: Complex<f64>,
        lower_right: Complex<f64>,
    ) -> Result<Viewport, RenderError> {
        if !(lower_right.re > upper_left.re) {
            return Err(RenderError::InvalidConfiguration(
                "The upper left corner is not to the left of the lower right corner.".to_string(),
            ));
        }

        if !(upper_left.im > lower_right.im) {
            return Err(RenderError::InvalidConfiguration(
                "The upper left corner is not above the lower right corner.".to_string(),
            ));
        }

        Ok(Viewport {
            upper_left,
            lower_right,
        })
    }
}

/// Describes the x, y of a pixel in the image.  Column first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Given the image bounds, a pixel, and the corners of the viewport,
/// return the complex number the pixel stands for.  Rows grow
/// downward while the imaginary axis grows upward, hence the
/// subtraction.
pub fn pixel_to_point(
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    upper_left: Complex<f64>,
    lower_right: Complex<f64>,
) -> Complex<f64> {
    Complex::new(
        upper_left.re + (x as f64) * (lower_right.re - upper_left.re) / (width as f64),
        upper_left.im - (y as f64) * (upper_left.im - lower_right.im) / (height as f64),
    )
}

/// Contains the definitions of two planes: the integral plane of the
/// image, and the viewport on the complex plane.  Maps points from
/// one to the other.  Immutable once built, so it can be shared by
/// reference across every worker of a render.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The size of the image.
    pub image: ImageSpec,
    /// The rectangle of the complex plane the image covers.
    pub viewport: Viewport,
}

impl PlaneMapper {
    /// Both halves have already been validated by their own
    /// constructors.
    pub fn new(image: ImageSpec, viewport: Viewport) -> PlaneMapper {
        PlaneMapper { image, viewport }
    }

    /// Pixels per row.
    pub fn width(&self) -> usize {
        self.image.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.image.height
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.image.len()
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Given a pixel on the integral plane, map that to a point on
    /// the complex plane.  Pixels just past the last column or row
    /// are accepted; they map onto the far edges of the viewport.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        pixel_to_point(
            self.image.width,
            self.image.height,
            pixel.0,
            pixel.1,
            self.viewport.upper_left,
            self.viewport.lower_right,
        )
    }
}
