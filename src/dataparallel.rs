//! A single rayon parallel loop over the bands.  How the bands are
//! spread across threads is up to rayon.

use log::debug;
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};

use crate::bands::{Band, BandPlan, BandSizing};
use crate::error::RenderError;
use crate::planes::PlaneMapper;
use crate::renderer::ParallelRenderer;
use crate::worker::render_band;

/// Renders bands of `rows_per_band` rows with a parallel iterator.
#[derive(Copy, Clone, Debug)]
pub struct DataParallelLoop {
    /// Run on a private pool of this many threads, or on rayon's
    /// global pool when `None`.
    pub threads: Option<usize>,
    /// The height of every band but possibly the last.
    pub rows_per_band: usize,
}

impl DataParallelLoop {
    /// A data-parallel renderer on rayon's global pool.
    pub fn new(rows_per_band: usize) -> Self {
        DataParallelLoop {
            threads: None,
            rows_per_band,
        }
    }

    /// The same, pinned to a private pool of `threads` threads.
    pub fn with_threads(threads: usize, rows_per_band: usize) -> Self {
        DataParallelLoop {
            threads: Some(threads),
            rows_per_band,
        }
    }
}

impl ParallelRenderer for DataParallelLoop {
    fn name(&self) -> &'static str {
        "dataparallel"
    }

    fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
        BandPlan::new(plane, BandSizing::RowsPerBand(self.rows_per_band))
    }

    fn dispatch(
        &self,
        plane: &PlaneMapper,
        plan: &BandPlan,
        pixels: &mut [u8],
    ) -> Result<(), RenderError> {
        parallel_loop(self.threads, plane, plan, pixels, render_band)
    }
}

/// Run `render` over every band with one parallel iterator, on a
/// private pool of `threads` threads or on the global pool.
fn parallel_loop<F>(
    threads: Option<usize>,
    plane: &PlaneMapper,
    plan: &BandPlan,
    pixels: &mut [u8],
    render: F,
) -> Result<(), RenderError>
where
    F: Fn(&PlaneMapper, &Band, &mut [u8]) + Sync,
{
    let bands = plan.split(pixels)?;
    let render = &render;
    let job = move || {
        bands
            .into_par_iter()
            .for_each(|(band, region)| render(plane, band, region))
    };

    // rayon re-raises a worker's panic on the calling thread.
    let outcome = match threads {
        None => panic::catch_unwind(AssertUnwindSafe(job)),
        Some(0) => {
            return Err(RenderError::InvalidConfiguration(
                "a data-parallel loop needs at least one thread".to_string(),
            ))
        }
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|id| format!("loop-{}", id))
                .build()
                .map_err(RenderError::PoolCreationFailure)?;
            debug!("started a private pool of {} threads", threads);
            panic::catch_unwind(AssertUnwindSafe(|| pool.install(job)))
        }
    };
    outcome.map_err(|_| RenderError::WorkerJoinFailure)
}
