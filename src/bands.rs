//! Splits an image into horizontal bands of whole rows.  The plan is
//! computed once, before anything is dispatched, and it is the only
//! place that decides which rows belong to which worker: the buffer
//! is carved up with `chunks_mut`, so every band gets its own
//! non-overlapping slice and two workers can never own the same row.

use log::{debug, warn};

use crate::error::RenderError;
use crate::planes::{Pixel, PlaneMapper, Viewport};

/// The two ways a caller can ask for bands.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BandSizing {
    /// Aim for this many bands of (nearly) equal height.
    Count(usize),
    /// Every band but the last has exactly this many rows.
    RowsPerBand(usize),
}

/// A contiguous strip of rows, and the part of the viewport it
/// covers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Band {
    /// Position of the band in the plan, top to bottom.
    pub index: usize,
    /// The first row of the image belonging to this band.
    pub start_row: usize,
    /// How many rows the band holds.  Never zero.
    pub row_count: usize,
    /// The corners of rows `[start_row, start_row + row_count)`.
    pub sub_viewport: Viewport,
}

impl Band {
    /// One past the last row of the band.
    pub fn end_row(&self) -> usize {
        self.start_row + self.row_count
    }
}

/// The full set of bands for one image.
#[derive(Clone, Debug)]
pub struct BandPlan {
    width: usize,
    height: usize,
    rows_per_band: usize,
    bands: Vec<Band>,
}

impl BandPlan {
    /// Partition the mapper's image.  A request for more bands than
    /// there are rows degrades to one row per band.
    pub fn new(mapper: &PlaneMapper, sizing: BandSizing) -> Result<BandPlan, RenderError> {
        let height = mapper.height();
        let rows_per_band = match sizing {
            BandSizing::Count(0) => {
                return Err(RenderError::InvalidConfiguration(
                    "band count must be at least 1".to_string(),
                ))
            }
            BandSizing::RowsPerBand(0) => {
                return Err(RenderError::InvalidConfiguration(
                    "rows per band must be at least 1".to_string(),
                ))
            }
            BandSizing::Count(count) => {
                if count > height {
                    warn!(
                        "{} bands requested for {} rows; using one row per band",
                        count, height
                    );
                }
                div_ceil(height, count)
            }
            BandSizing::RowsPerBand(rows) => rows.min(height),
        };

        let band_count = div_ceil(height, rows_per_band);
        let mut bands = Vec::new();
        bands
            .try_reserve_exact(band_count)
            .map_err(|_| RenderError::AllocationFailure {
                what: "band descriptors",
                size: band_count,
            })?;

        for index in 0..band_count {
            let start_row = index * rows_per_band;
            let row_count = rows_per_band.min(height - start_row);
            let sub_viewport = Viewport {
                upper_left: mapper.pixel_to_point(&Pixel(0, start_row)),
                lower_right: mapper.pixel_to_point(&Pixel(mapper.width(), start_row + row_count)),
            };
            bands.push(Band {
                index,
                start_row,
                row_count,
                sub_viewport,
            });
        }

        debug!(
            "planned {} bands of up to {} rows for a {}x{} image",
            band_count,
            rows_per_band,
            mapper.width(),
            height
        );

        Ok(BandPlan {
            width: mapper.width(),
            height,
            rows_per_band,
            bands,
        })
    }

    /// The bands, top to bottom.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// The number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// A plan always has at least one band; this is here because
    /// `len` is.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Rows in every band but possibly the last.
    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Hand out one exclusive slice of `pixels` per band.  The buffer
    /// must be exactly one image in size.
    pub fn split<'p, 'b>(
        &'b self,
        pixels: &'p mut [u8],
    ) -> Result<Vec<(&'b Band, &'p mut [u8])>, RenderError> {
        let expected = self.width * self.height;
        if pixels.len() != expected {
            return Err(RenderError::UnfittingBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(self
            .bands
            .iter()
            .zip(pixels.chunks_mut(self.rows_per_band * self.width))
            .collect())
    }
}

fn div_ceil(numerator: usize, denominator: usize) -> usize {
    numerator / denominator + if numerator % denominator == 0 { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planes::ImageSpec;
    use num::Complex;

    fn mapper(width: usize, height: usize) -> PlaneMapper {
        PlaneMapper::new(
            ImageSpec::new(width, height).unwrap(),
            Viewport::new(Complex::new(-1.6, 1.2), Complex::new(0.6, -1.2)).unwrap(),
        )
    }

    fn assert_covers(plan: &BandPlan, height: usize) {
        let mut next = 0;
        for (k, band) in plan.bands().iter().enumerate() {
            assert_eq!(band.index, k);
            assert_eq!(band.start_row, next);
            assert!(band.row_count > 0);
            next = band.end_row();
        }
        assert_eq!(next, height);
        let total: usize = plan.bands().iter().map(|b| b.row_count).sum();
        assert_eq!(total, height);
    }

    #[test]
    fn bands_cover_every_row_exactly_once() {
        for height in 1..40 {
            for count in 1..50 {
                let plan = BandPlan::new(&mapper(3, height), BandSizing::Count(count)).unwrap();
                assert_covers(&plan, height);
                assert!(plan.len() <= count.min(height));
            }
            for rows in 1..50 {
                let plan =
                    BandPlan::new(&mapper(3, height), BandSizing::RowsPerBand(rows)).unwrap();
                assert_covers(&plan, height);
            }
        }
    }

    #[test]
    fn uneven_heights_leave_a_short_last_band() {
        let plan = BandPlan::new(&mapper(10, 10), BandSizing::Count(4)).unwrap();
        let rows: Vec<usize> = plan.bands().iter().map(|b| b.row_count).collect();
        assert_eq!(rows, vec![3, 3, 3, 1]);
    }

    #[test]
    fn more_bands_than_rows_collapses_to_single_rows() {
        let plan = BandPlan::new(&mapper(5, 3), BandSizing::Count(64)).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.rows_per_band(), 1);
        assert_covers(&plan, 3);
    }

    #[test]
    fn zero_sizing_is_rejected() {
        assert!(BandPlan::new(&mapper(5, 5), BandSizing::Count(0)).is_err());
        assert!(BandPlan::new(&mapper(5, 5), BandSizing::RowsPerBand(0)).is_err());
    }

    #[test]
    fn sub_viewports_tile_the_viewport() {
        let m = mapper(100, 1000);
        let plan = BandPlan::new(&m, BandSizing::RowsPerBand(250)).unwrap();
        assert_eq!(plan.len(), 4);
        let first = plan.bands()[0].sub_viewport;
        assert_eq!(first.upper_left, m.viewport.upper_left);
        for pair in plan.bands().windows(2) {
            assert_eq!(pair[0].sub_viewport.lower_right.im, pair[1].sub_viewport.upper_left.im);
        }
        let last = plan.bands()[3].sub_viewport;
        assert!((last.lower_right.re - 0.6).abs() < 1e-12);
        assert!((last.lower_right.im + 1.2).abs() < 1e-12);
    }

    #[test]
    fn split_hands_out_disjoint_slices() {
        let plan = BandPlan::new(&mapper(4, 10), BandSizing::Count(3)).unwrap();
        let mut pixels = vec![0u8; 40];
        {
            let slices = plan.split(&mut pixels).unwrap();
            assert_eq!(slices.len(), plan.len());
            for (band, slice) in slices {
                assert_eq!(slice.len(), band.row_count * 4);
                for p in slice.iter_mut() {
                    *p += band.index as u8 + 1;
                }
            }
        }
        assert_eq!(&pixels[..16], &[1u8; 16][..]);
        assert_eq!(&pixels[16..32], &[2u8; 16][..]);
        assert_eq!(&pixels[32..], &[3u8; 8][..]);
    }

    #[test]
    fn split_refuses_a_mismatched_buffer() {
        let plan = BandPlan::new(&mapper(4, 10), BandSizing::Count(3)).unwrap();
        let mut pixels = vec![0u8; 39];
        match plan.split(&mut pixels) {
            Err(RenderError::UnfittingBuffer { expected, actual }) => {
                assert_eq!((expected, actual), (40, 39));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
