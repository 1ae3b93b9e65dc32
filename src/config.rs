//! The immutable description of what to render, plus the small
//! parsers the command line uses to build one.

use num::Complex;
use std::str::FromStr;

use crate::error::RenderError;
use crate::planes::{ImageSpec, PlaneMapper, Viewport};

/// The image size used when none is given.
pub const DEFAULT_SIZE: (usize, usize) = (1000, 1000);
/// The upper left corner used when none is given.
pub const DEFAULT_UPPER_LEFT: (f64, f64) = (-1.6, 1.2);
/// The lower right corner used when none is given.
pub const DEFAULT_LOWER_RIGHT: (f64, f64) = (0.6, -1.2);
/// Rows per band for the strategies that take one.
pub const DEFAULT_ROWS_PER_BAND: usize = 1;
/// Where the image goes when drawing is on.
pub const DEFAULT_OUTPUT: &str = "mandel.png";

/// What to render.  Built once, validated once, and then shared by
/// reference with every strategy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// The size of the image in pixels.
    pub image: ImageSpec,
    /// The part of the complex plane it shows.
    pub viewport: Viewport,
}

impl RenderConfig {
    /// Both halves are validated by their own constructors.
    pub fn new(image: ImageSpec, viewport: Viewport) -> RenderConfig {
        RenderConfig { image, viewport }
    }

    /// Build and validate a configuration from plain numbers:
    /// `(width, height)`, and `(re, im)` for each corner.
    pub fn from_parts(
        size: (usize, usize),
        upper_left: (f64, f64),
        lower_right: (f64, f64),
    ) -> Result<RenderConfig, RenderError> {
        Ok(RenderConfig {
            image: ImageSpec::new(size.0, size.1)?,
            viewport: Viewport::new(
                Complex::new(upper_left.0, upper_left.1),
                Complex::new(lower_right.0, lower_right.1),
            )?,
        })
    }

    /// The pixel to point mapping for this configuration.
    pub fn plane(&self) -> PlaneMapper {
        PlaneMapper::new(self.image, self.viewport)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            image: ImageSpec {
                width: DEFAULT_SIZE.0,
                height: DEFAULT_SIZE.1,
            },
            viewport: Viewport {
                upper_left: Complex::new(DEFAULT_UPPER_LEFT.0, DEFAULT_UPPER_LEFT.1),
                lower_right: Complex::new(DEFAULT_LOWER_RIGHT.0, DEFAULT_LOWER_RIGHT.1),
            },
        }
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}
