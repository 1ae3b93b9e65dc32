//! Repeats renders over a range of concurrency parameters and reports
//! the average time of each.

use failure::Error;
use log::info;
use std::io::Write;

use crate::config::RenderConfig;
use crate::renderer::{run, ParallelRenderer};

/// The parameters to try, and how often to try each.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sweep {
    /// The first parameter value.
    pub first: usize,
    /// The last parameter value, inclusive.
    pub last: usize,
    /// Renders per parameter value.
    pub trials: usize,
}

/// For every parameter in the sweep, build a renderer with
/// `make_renderer`, render `trials` times without drawing, and write
/// `"<param>,<average ms>"` to `report`.  Returns the same rows.
pub fn measure<R, F, W>(
    config: &RenderConfig,
    sweep: Sweep,
    make_renderer: F,
    report: &mut W,
) -> Result<Vec<(usize, f64)>, Error>
where
    R: ParallelRenderer,
    F: Fn(usize) -> R,
    W: Write,
{
    if sweep.trials == 0 {
        return Err(failure::err_msg("a sweep needs at least one trial"));
    }
    if sweep.first > sweep.last {
        return Err(failure::format_err!(
            "a sweep from {} to {} is empty",
            sweep.first,
            sweep.last
        ));
    }

    let mut rows = Vec::new();
    for param in sweep.first..=sweep.last {
        let renderer = make_renderer(param);
        let mut total = 0.0;
        for _ in 0..sweep.trials {
            total += run(&renderer, config, None)?.elapsed_ms;
        }
        let average = total / sweep.trials as f64;
        info!("{} {}: {}ms over {} trials", renderer.name(), param, average, sweep.trials);
        writeln!(report, "{},{}", param, average)?;
        rows.push((param, average));
    }
    report.flush()?;
    Ok(rows)
}
