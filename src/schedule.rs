//! Capture cadence: when each frame is due, and the clock that waits for it.

use std::time::{Duration, Instant};

/// Source of time for the capture loop.
///
/// The loop only ever asks for the current instant and blocks for a delta,
/// so tests can substitute a manual clock for the wall clock.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `Instant::now` and `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fixed-rate sampling plan for one capture run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
    /// Number of frames to capture
    pub frame_count: usize,
    /// Target capture rate in frames per second
    pub fps: u32,
}

impl Schedule {
    pub fn new(frame_count: usize, fps: u32) -> Self {
        Self { frame_count, fps }
    }

    /// Offset from the start of capture at which iteration `index` should be done.
    pub fn offset(&self, index: usize) -> Duration {
        let nanos = (index as u64 + 1) * 1_000_000_000 / u64::from(self.fps);
        Duration::from_nanos(nanos)
    }

    /// Ideal completion time of iteration `index`: start + (index + 1) / fps.
    pub fn deadline(&self, start: Instant, index: usize) -> Instant {
        start + self.offset(index)
    }

    /// Time left until `deadline`, or `None` when already at or past it.
    pub fn wait_for(now: Instant, deadline: Instant) -> Option<Duration> {
        let remaining = deadline.checked_duration_since(now)?;
        if remaining.is_zero() {
            None
        } else {
            Some(remaining)
        }
    }

    /// Nominal length of the whole capture.
    pub fn span(&self) -> Duration {
        if self.frame_count == 0 {
            return Duration::ZERO;
        }
        self.offset(self.frame_count - 1)
    }
}
