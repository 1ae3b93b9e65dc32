//! The escape-time kernel.  A point `c` belongs to the Mandelbrot set
//! if the orbit of `z -> z*z + c`, started at zero, never leaves the
//! circle of radius two around the origin.  We can only ever prove
//! the opposite, so after `ITERATION_LIMIT` rounds we give up and call
//! the point bounded.

use num::Complex;

/// The most iterations spent on any one point.
pub const ITERATION_LIMIT: u32 = 256;

/// The squared bailout radius.  Comparing against the squared norm
/// saves a square root per iteration.
const BAILOUT: f64 = 4.0;

/// If `c` is not a member, return `Some(i)`, where `i` is the
/// zero-based iteration at which the orbit left the circle.  If the
/// iteration limit was reached without proving that, return `None`.
pub fn escape_time(c: Complex<f64>) -> Option<u32> {
    let mut z = Complex { re: 0.0, im: 0.0 };
    for i in 0..ITERATION_LIMIT {
        z = z * z + c;
        if z.norm_sqr() > BAILOUT {
            return Some(i);
        }
    }
    None
}

/// The grayscale value for an escape result.  Bounded points are
/// black; everything else gets lighter the faster it escapes, with
/// an escape on the very first iteration mapping to pure white.
pub fn intensity(escape: Option<u32>) -> u8 {
    match escape {
        None => 0,
        Some(count) => 255u32.saturating_sub(count) as u8,
    }
}
