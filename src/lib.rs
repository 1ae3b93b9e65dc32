#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Banded Mandelbrot renderer
//!
//! The Mandelbrot set takes a point on the complex plane and
//! repeatedly squares it and adds the original point back, measuring
//! how quickly that number goes to infinity.  That "velocity" becomes
//! the gray level of a pixel; the points that never escape form the
//! black heart of the image.
//!
//! Every pixel can be computed on its own, which makes the image a
//! convenient yardstick for threading strategies.  The image is cut
//! into horizontal bands of whole rows, each band owning its own
//! slice of the pixel buffer, and the bands are handed out by one of
//! three interchangeable renderers:
//!
//! * [`ForkJoinThreads`]: one scoped thread per band, then a join.
//! * [`WorkerPool`]: a fixed pool of threads pulling bands off a queue.
//! * [`DataParallelLoop`]: a rayon parallel iterator over the bands.
//!
//! All three go through [`run`], which times the render and produces
//! byte-identical images regardless of the strategy chosen.

#[macro_use]
extern crate failure;

pub mod bands;
pub mod config;
pub mod dataparallel;
pub mod error;
pub mod escape;
pub mod forkjoin;
pub mod measure;
pub mod planes;
pub mod pool;
pub mod renderer;
pub mod sink;
pub mod timer;
pub mod worker;

pub use config::RenderConfig;
pub use dataparallel::DataParallelLoop;
pub use error::RenderError;
pub use forkjoin::ForkJoinThreads;
pub use pool::WorkerPool;
pub use renderer::{run, ParallelRenderer, Phase, RenderFailure, Rendering};
