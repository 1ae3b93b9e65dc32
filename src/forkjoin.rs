//! Plain fork-join: one scoped thread per band, then a join barrier.

use crossbeam::thread::ScopedJoinHandle;

use crate::bands::{Band, BandPlan, BandSizing};
use crate::error::RenderError;
use crate::planes::PlaneMapper;
use crate::renderer::ParallelRenderer;
use crate::worker::render_band;

/// Cuts the image into as many bands as there are threads and gives
/// each band a thread of its own.
#[derive(Copy, Clone, Debug)]
pub struct ForkJoinThreads {
    /// The number of threads, and so the number of bands.  Images
    /// shorter than this get one thread per row.
    pub threads: usize,
}

impl ForkJoinThreads {
    /// A fork-join renderer with `threads` threads.
    pub fn new(threads: usize) -> Self {
        ForkJoinThreads { threads }
    }
}

impl ParallelRenderer for ForkJoinThreads {
    fn name(&self) -> &'static str {
        "threads"
    }

    fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
        BandPlan::new(plane, BandSizing::Count(self.threads))
    }

    fn dispatch(
        &self,
        plane: &PlaneMapper,
        plan: &BandPlan,
        pixels: &mut [u8],
    ) -> Result<(), RenderError> {
        fork_join(plane, plan, pixels, render_band)
    }
}

/// Spawn one thread per band running `render`, then join them all.
fn fork_join<F>(
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
    crossbeam::scope(|spawner| -> Result<(), RenderError> {
        let mut handles: Vec<ScopedJoinHandle<()>> = Vec::with_capacity(bands.len());
        for (band, region) in bands {
            let handle = spawner
                .builder()
                .name(format!("band-{}", band.index))
                .spawn(move |_| render(plane, band, region))
                .map_err(|cause| RenderError::WorkerCreationFailure {
                    worker: band.index,
                    cause,
                })?;
            handles.push(handle);
        }

        // Any threads left unjoined by an early return are joined
        // when the scope closes.
        for handle in handles {
            handle.join().map_err(|_| RenderError::WorkerJoinFailure)?;
        }
        Ok(())
    })
    .map_err(|_| RenderError::WorkerJoinFailure)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::renderer::run;

    fn config(width: usize, height: usize) -> RenderConfig {
        RenderConfig::from_parts((width, height), (-1.6, 1.2), (0.6, -1.2)).unwrap()
    }

    #[test]
    fn thread_count_does_not_change_the_image() {
        let config = config(64, 48);
        let reference = run(&ForkJoinThreads::new(1), &config, None).unwrap().pixels;
        for threads in 2..12 {
            let pixels = run(&ForkJoinThreads::new(threads), &config, None).unwrap().pixels;
            assert_eq!(pixels, reference, "{} threads", threads);
        }
    }

    #[test]
    fn more_threads_than_rows_is_fine() {
        let config = config(16, 3);
        let plan = ForkJoinThreads::new(32).plan(&config.plane()).unwrap();
        assert_eq!(plan.len(), 3);
        let reference = run(&ForkJoinThreads::new(1), &config, None).unwrap().pixels;
        let pixels = run(&ForkJoinThreads::new(32), &config, None).unwrap().pixels;
        assert_eq!(pixels, reference);
    }

    /// Fork-join that gives up on one band.
    struct FailsOnBand(usize);

    impl ParallelRenderer for FailsOnBand {
        fn name(&self) -> &'static str {
            "fails-on-band"
        }

        fn plan(&self, plane: &PlaneMapper) -> Result<BandPlan, RenderError> {
            BandPlan::new(plane, BandSizing::Count(4))
        }

        fn dispatch(
            &self,
            plane: &PlaneMapper,
            plan: &BandPlan,
            pixels: &mut [u8],
        ) -> Result<(), RenderError> {
            fork_join(plane, plan, pixels, |plane, band, region| {
                if band.index == self.0 {
                    panic!("band {} gave up", band.index);
                }
                render_band(plane, band, region)
            })
        }
    }

    #[test]
    fn a_panicking_band_fails_the_whole_render() {
        let failure = run(&FailsOnBand(2), &config(16, 12), None).unwrap_err();
        assert_eq!(failure.phase, crate::renderer::Phase::Dispatch);
        match failure.error {
            RenderError::WorkerJoinFailure => {}
            ref other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn zero_threads_fail_at_partitioning() {
        let failure = run(&ForkJoinThreads::new(0), &config(8, 8), None).unwrap_err();
        assert_eq!(failure.phase, crate::renderer::Phase::Partition);
    }
}
