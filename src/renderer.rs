//! The one entry point shared by every threading strategy.
//!
//! A render call moves through a fixed sequence of phases: the pixel
//! buffer is allocated, the image is cut into bands, the bands are
//! dispatched to the strategy's workers, the clock is read, and the
//! image is optionally written out.  Strategies only decide how bands
//! are planned and how they are dispatched; everything else happens
//! here so the three behave identically around the edges.

use std::fmt;
use std::path::Path;

use log::{debug, info};

use crate::bands::BandPlan;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::planes::PlaneMapper;
use crate::sink::write_image;
use crate::timer::{elapsed_ms, Timestamp};

/// A way of driving every band of a plan to completion.
pub trait ParallelRenderer {
    /// A short name for reports.
    fn name(&self) -> &'static str;

    /// Cut the image into bands.
    fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError>;

    /// Render every band of `plan` into `pixels`, returning only once
    /// all of them are done.
    fn dispatch(
        &self,
        plane: &PlaneMapper,
        plan: &BandPlan,
        pixels: &mut [u8],
    ) -> Result<(), RenderError>;
}

impl<'a, R: ParallelRenderer + ?Sized> ParallelRenderer for &'a R {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
        (**self).plan(plane)
    }

    fn dispatch(
        &self,
        plane: &PlaneMapper,
        plan: &BandPlan,
        pixels: &mut [u8],
    ) -> Result<(), RenderError> {
        (**self).dispatch(plane, plan, pixels)
    }
}

impl<R: ParallelRenderer + ?Sized> ParallelRenderer for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
        (**self).plan(plane)
    }

    fn dispatch(
        &self,
        plane: &PlaneMapper,
        plan: &BandPlan,
        pixels: &mut [u8],
    ) -> Result<(), RenderError> {
        (**self).dispatch(plane, plan, pixels)
    }
}

/// The step a render call was working on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Phase {
    /// Allocating the pixel buffer.
    Init,
    /// Planning bands.
    Partition,
    /// Rendering bands.
    Dispatch,
    /// Reading the clock.
    Timing,
    /// Writing the image.
    Persist,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Phase::Init => "allocating",
            Phase::Partition => "partitioning",
            Phase::Dispatch => "rendering",
            Phase::Timing => "timing",
            Phase::Persist => "writing the image",
        };
        f.write_str(name)
    }
}

/// A render call that did not finish, and where it stopped.
#[derive(Debug, Fail)]
#[fail(display = "{} failed while {}: {}", strategy, phase, error)]
pub struct RenderFailure {
    /// The strategy that was running.
    pub strategy: &'static str,
    /// Where it stopped.
    pub phase: Phase,
    /// Why it stopped.
    #[fail(cause)]
    pub error: RenderError,
}

/// A finished image and how long its bands took.
#[derive(Debug)]
pub struct Rendering {
    /// Row-major grayscale, one byte per pixel.
    pub pixels: Vec<u8>,
    /// Milliseconds from first dispatch to the last band finishing.
    pub elapsed_ms: f64,
}

/// Render the configured image with `renderer`.  When `output` is
/// given the finished image is written there too; the write is not
/// part of the measured time.
pub fn run<R: ParallelRenderer + ?Sized>(
    renderer: &R,
    config: &RenderConfig,
    output: Option<&Path>,
) -> Result<Rendering, RenderFailure> {
    let strategy = renderer.name();
    let fail = |phase: Phase| move |error: RenderError| RenderFailure {
        strategy,
        phase,
        error,
    };
    let plane = config.plane();

    let mut pixels = allocate_pixels(plane.len()).map_err(fail(Phase::Init))?;
    let plan = renderer.plan(&plane).map_err(fail(Phase::Partition))?;
    debug!("{}: partitioned into {} bands", strategy, plan.len());

    let start = Timestamp::now().map_err(fail(Phase::Timing))?;
    renderer
        .dispatch(&plane, &plan, &mut pixels)
        .map_err(fail(Phase::Dispatch))?;
    let end = Timestamp::now().map_err(fail(Phase::Timing))?;
    let elapsed_ms = elapsed_ms(start, end);
    info!("{}: rendered {} bands in {}ms", strategy, plan.len(), elapsed_ms);

    if let Some(path) = output {
        write_image(path, &pixels, plane.width(), plane.height())
            .map_err(fail(Phase::Persist))?;
        debug!("{}: wrote {}", strategy, path.display());
    }

    Ok(Rendering { pixels, elapsed_ms })
}

/// A zeroed buffer of `len` pixels, or an error instead of an abort
/// when the allocator says no.
pub fn allocate_pixels(len: usize) -> Result<Vec<u8>, RenderError> {
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| RenderError::AllocationFailure {
            what: "pixel buffer",
            size: len,
        })?;
    pixels.resize(len, 0);
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::BandSizing;
    use crate::worker::render_band;

    /// Renders the bands one after another on the calling thread.
    struct Sequential;

    impl ParallelRenderer for Sequential {
        fn name(&self) -> &'static str {
            "sequential"
        }

        fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
            BandPlan::new(plane, BandSizing::RowsPerBand(7))
        }

        fn dispatch(
            &self,
            plane: &PlaneMapper,
            plan: &BandPlan,
            pixels: &mut [u8],
        ) -> Result<(), RenderError> {
            for (band, slice) in plan.split(pixels)? {
                render_band(plane, band, slice);
            }
            Ok(())
        }
    }

    /// Plans fine, then loses a worker.
    struct Doomed;

    impl ParallelRenderer for Doomed {
        fn name(&self) -> &'static str {
            "doomed"
        }

        fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
            BandPlan::new(plane, BandSizing::Count(2))
        }

        fn dispatch(&self, _: &PlaneMapper, _: &BandPlan, _: &mut [u8]) -> Result<(), RenderError> {
            Err(RenderError::WorkerJoinFailure)
        }
    }

    fn config() -> RenderConfig {
        RenderConfig::from_parts((60, 40), (-1.6, 1.2), (0.6, -1.2)).unwrap()
    }

    #[test]
    fn run_returns_a_full_image_and_a_time() {
        let rendering = run(&Sequential, &config(), None).unwrap();
        assert_eq!(rendering.pixels.len(), 60 * 40);
        assert!(rendering.elapsed_ms >= 0.0);
        assert!(rendering.pixels.iter().any(|&p| p == 0));
        assert!(rendering.pixels.iter().any(|&p| p > 0));
    }

    #[test]
    fn dispatch_failures_name_the_phase() {
        let failure = run(&Doomed, &config(), None).unwrap_err();
        assert_eq!(failure.strategy, "doomed");
        assert_eq!(failure.phase, Phase::Dispatch);
        match failure.error {
            RenderError::WorkerJoinFailure => {}
            ref other => panic!("unexpected {:?}", other),
        }
        assert!(failure.to_string().contains("while rendering"));
    }

    #[test]
    fn renderers_work_through_references_and_boxes() {
        let boxed: Box<dyn ParallelRenderer> = Box::new(Sequential);
        let by_box = run(&boxed, &config(), None).unwrap();
        let by_ref = run(&&Sequential, &config(), None).unwrap();
        assert_eq!(by_box.pixels, by_ref.pixels);
    }

    #[test]
    fn allocate_pixels_reports_impossible_sizes() {
        match allocate_pixels(usize::max_value()) {
            Err(RenderError::AllocationFailure { size, .. }) => {
                assert_eq!(size, usize::max_value())
            }
            other => panic!("unexpected {:?}", other.map(|p| p.len())),
        }
        assert_eq!(allocate_pixels(16).unwrap(), vec![0u8; 16]);
    }
}
