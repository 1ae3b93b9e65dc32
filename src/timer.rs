//! Monotonic timestamps for timing a render.

use crate::error::RenderError;

/// A reading of the monotonic clock, split the way `clock_gettime`
/// reports it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Timestamp {
    /// Whole seconds.
    pub sec: i64,
    /// Nanoseconds past `sec`.
    pub nsec: i64,
}

impl Timestamp {
    /// Read the monotonic clock.
    #[cfg(unix)]
    pub fn now() -> Result<Timestamp, RenderError> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        // The clock id is a constant and `ts` is a valid, exclusively
        // borrowed timespec.
        if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) } == -1 {
            return Err(RenderError::TimingSourceFailure(
                std::io::Error::last_os_error(),
            ));
        }
        Ok(Timestamp {
            sec: ts.tv_sec as i64,
            nsec: ts.tv_nsec as i64,
        })
    }

    /// Read the monotonic clock, measured from the first reading taken
    /// by this process.
    #[cfg(not(unix))]
    pub fn now() -> Result<Timestamp, RenderError> {
        use std::sync::OnceLock;
        use std::time::Instant;

        static ANCHOR: OnceLock<Instant> = OnceLock::new();
        let since = ANCHOR.get_or_init(Instant::now).elapsed();
        Ok(Timestamp {
            sec: since.as_secs() as i64,
            nsec: i64::from(since.subsec_nanos()),
        })
    }
}

/// Milliseconds from `start` to `end`.
pub fn elapsed_ms(start: Timestamp, end: Timestamp) -> f64 {
    (end.sec - start.sec) as f64 * 1000.0 + (end.nsec - start.nsec) as f64 / 1_000_000.0
}
