//! The ways a render call can fail.  Every one of them is fatal to
//! the call that raised it; nothing here is retried.

use std::io;

/// Everything that can go wrong between being handed a configuration
/// and handing back a finished pixel buffer.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The image size, viewport, or concurrency parameter is unusable.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfiguration(String),

    /// A pixel buffer did not have the size its bands were planned for.
    #[fail(display = "buffer holds {} pixels, bands cover {}", actual, expected)]
    UnfittingBuffer {
        /// The number of pixels the band plan covers.
        expected: usize,
        /// The number of pixels actually handed over.
        actual: usize,
    },

    /// The allocator refused a per-call allocation.
    #[fail(display = "could not allocate {} entries for the {}", size, what)]
    AllocationFailure {
        /// What was being allocated.
        what: &'static str,
        /// How many entries were requested.
        size: usize,
    },

    /// A thread could not be started.
    #[fail(display = "could not start worker {}: {}", worker, cause)]
    WorkerCreationFailure {
        /// Index of the worker that failed to start.
        worker: usize,
        /// What the operating system said.
        #[fail(cause)]
        cause: io::Error,
    },

    /// rayon could not build a private thread pool.
    #[fail(display = "could not build the thread pool: {}", _0)]
    PoolCreationFailure(#[fail(cause)] rayon::ThreadPoolBuildError),

    /// A worker died before its share of the image was finished.
    #[fail(display = "a worker panicked before finishing its band")]
    WorkerJoinFailure,

    /// The monotonic clock could not be read.
    #[fail(display = "could not read the monotonic clock: {}", _0)]
    TimingSourceFailure(#[fail(cause)] io::Error),

    /// The finished image could not be written out.
    #[fail(display = "could not write image to {}: {}", path, cause)]
    PersistenceFailure {
        /// The destination file.
        path: String,
        /// The encoder's complaint.
        #[fail(cause)]
        cause: image::ImageError,
    },
}
