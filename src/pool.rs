//! A fixed-size pool of scoped worker threads fed from a FIFO queue,
//! and the renderer that submits one job per band to it.
//!
//! The pool lives inside a `crossbeam::scope`, so jobs may borrow
//! from the caller's stack (the pixel buffer in particular) without
//! any reference counting.  Workers pull jobs until the queue is
//! closed and empty; closing the queue and joining every worker is
//! the "all submitted jobs are complete" barrier.

use crossbeam::channel::{self, Sender};
use crossbeam::thread::{Scope, ScopedJoinHandle};
use log::debug;

use crate::bands::{BandPlan, BandSizing};
use crate::error::RenderError;
use crate::planes::PlaneMapper;
use crate::renderer::ParallelRenderer;
use crate::worker::render_band;

type Job<'env> = Box<dyn FnOnce() + Send + 'env>;

/// A set of worker threads that take submitted jobs in submission
/// order.  Dropping the pool without calling `join` still closes the
/// queue; the enclosing scope then waits for the workers.
pub struct ScopedPool<'scope, 'env: 'scope> {
    queue: Sender<Job<'env>>,
    workers: Vec<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope, 'env: 'scope> ScopedPool<'scope, 'env> {
    /// Start `size` workers inside `spawner`.  If one of them cannot
    /// be started, the ones already running are released and will be
    /// joined by the scope.
    pub fn new(spawner: &'scope Scope<'env>, size: usize) -> Result<Self, RenderError> {
        if size == 0 {
            return Err(RenderError::InvalidConfiguration(
                "a worker pool needs at least one worker".to_string(),
            ));
        }
        let (queue, jobs) = channel::unbounded::<Job<'env>>();
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let jobs = jobs.clone();
            let worker = spawner
                .builder()
                .name(format!("pool-{}", id))
                .spawn(move |_| {
                    for job in jobs.iter() {
                        job();
                    }
                })
                .map_err(|cause| RenderError::WorkerCreationFailure { worker: id, cause })?;
            workers.push(worker);
        }
        debug!("started a pool of {} workers", size);
        Ok(ScopedPool { queue, workers })
    }

    /// The number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job.  This only fails once every worker has died.
    pub fn execute<F>(&self, job: F) -> Result<(), RenderError>
    where
        F: FnOnce() + Send + 'env,
    {
        self.queue
            .send(Box::new(job))
            .map_err(|_| RenderError::WorkerJoinFailure)
    }

    /// Close the queue, let the workers drain it, and wait for all
    /// of them.
    pub fn join(self) -> Result<(), RenderError> {
        let ScopedPool { queue, workers } = self;
        drop(queue);
        for worker in workers {
            worker.join().map_err(|_| RenderError::WorkerJoinFailure)?;
        }
        Ok(())
    }
}

/// Renders bands of a fixed height on a pool of a fixed size.  The
/// band count follows from `rows_per_band` alone; the pool is built
/// for the call and torn down before it returns.
#[derive(Copy, Clone, Debug)]
pub struct WorkerPool {
    /// The number of pool threads.
    pub workers: usize,
    /// The height of every band but possibly the last.
    pub rows_per_band: usize,
}

impl WorkerPool {
    /// A pool renderer with `workers` threads and bands of
    /// `rows_per_band` rows.
    pub fn new(workers: usize, rows_per_band: usize) -> Self {
        WorkerPool {
            workers,
            rows_per_band,
        }
    }
}

impl ParallelRenderer for WorkerPool {
    fn name(&self) -> &'static str {
        "threadpool"
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
        let bands = plan.split(pixels)?;
        crossbeam::scope(|spawner| -> Result<(), RenderError> {
            let pool = ScopedPool::new(spawner, self.workers)?;
            for (band, region) in bands {
                pool.execute(move || render_band(plane, band, region))?;
            }
            pool.join()
        })
        .map_err(|_| RenderError::WorkerJoinFailure)?
    }
}
