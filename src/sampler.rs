//! Timed capture loop.

use log::{debug, trace};

use crate::frame::{decode_png, normalize, Frame};
use crate::schedule::{Clock, Schedule};
use crate::session::CaptureSession;
use crate::{Error, Renderer, Result, Viewport};

/// Samples a session at a fixed cadence until the schedule is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    schedule: Schedule,
    viewport: Viewport,
}

impl FrameSampler {
    pub fn new(schedule: Schedule, viewport: Viewport) -> Self {
        Self { schedule, viewport }
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Capture exactly `schedule.frame_count` frames in order.
    ///
    /// Never captures ahead of schedule: after iteration `i` the loop sleeps
    /// until `start + (i + 1) / fps` if it is early, and carries on
    /// immediately if it is late. `progress` receives `(captured, total)`
    /// after each frame. Any failure discards the frames captured so far.
    pub fn capture<R, C, P>(
        &self,
        session: &CaptureSession<R>,
        clock: &C,
        mut progress: P,
    ) -> Result<Vec<Frame>>
    where
        R: Renderer,
        C: Clock,
        P: FnMut(usize, usize),
    {
        let total = self.schedule.frame_count;
        let mut frames = Vec::with_capacity(total);
        let mut late = 0usize;

        let start = clock.now();
        for index in 0..total {
            let shot_at = clock.now();
            let bytes = session.snapshot().map_err(|e| match e {
                Error::CaptureError { .. } => e,
                other => Error::CaptureError {
                    frame: index,
                    reason: other.to_string(),
                },
            })?;
            let image = normalize(decode_png(index, &bytes)?, self.viewport);
            trace!(
                "frame {} captured in {:?} ({}x{})",
                index,
                clock.now().saturating_duration_since(shot_at),
                image.width(),
                image.height()
            );
            frames.push(Frame::new(index, image));

            progress(index + 1, total);

            let deadline = self.schedule.deadline(start, index);
            match Schedule::wait_for(clock.now(), deadline) {
                Some(remaining) => clock.sleep(remaining),
                None => late += 1,
            }
        }

        let elapsed = clock.now().saturating_duration_since(start);
        debug!(
            "captured {} frames in {:?} (nominal {:?}, {} behind schedule)",
            frames.len(),
            elapsed,
            self.schedule.span(),
            late
        );
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureConfig;
    use image::{Rgba, RgbaImage};
    use std::cell::{Cell, RefCell};
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    /// Clock that only moves when slept on or nudged.
    struct StepClock {
        now: Cell<Instant>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl StepClock {
        fn new() -> Self {
            Self { now: Cell::new(Instant::now()), sleeps: RefCell::new(Vec::new()) }
        }
        fn advance(&self, d: Duration) {
            self.now.set(self.now.get() + d);
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
        fn sleep(&self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            self.advance(duration);
        }
    }

    /// Renderer whose snapshots cost a fixed amount of (manual) time.
    struct Slow<'a> {
        clock: &'a StepClock,
        cost: Duration,
        size: (u32, u32),
        fail_at: Option<usize>,
        calls: Cell<usize>,
    }

    impl Renderer for Slow<'_> {
        fn launch(_config: &CaptureConfig) -> Result<Self> {
            Err(Error::InitializationError("not launchable".into()))
        }
        fn load_document(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }
        fn render_png(&self) -> Result<Vec<u8>> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail_at == Some(n) {
                return Err(Error::InitializationError("surface went away".into()));
            }
            self.clock.advance(self.cost);
            let img = RgbaImage::from_pixel(self.size.0, self.size.1, Rgba([n as u8, 0, 0, 255]));
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, image::ImageFormat::Png).unwrap();
            Ok(out.into_inner())
        }
        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn slow(clock: &StepClock, cost_ms: u64) -> Slow<'_> {
        Slow { clock, cost: Duration::from_millis(cost_ms), size: (4, 3), fail_at: None, calls: Cell::new(0) }
    }

    #[test]
    fn sleeps_remaining_delta_when_ahead() {
        let clock = StepClock::new();
        let session = CaptureSession::from_renderer(slow(&clock, 10));
        let sampler = FrameSampler::new(Schedule::new(4, 10), Viewport { width: 4, height: 3 });

        let frames = sampler.capture(&session, &clock, |_, _| {}).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(*clock.sleeps.borrow(), vec![Duration::from_millis(90); 4]);
    }

    #[test]
    fn never_sleeps_when_behind() {
        let clock = StepClock::new();
        let session = CaptureSession::from_renderer(slow(&clock, 250));
        let sampler = FrameSampler::new(Schedule::new(5, 10), Viewport { width: 4, height: 3 });

        let frames = sampler.capture(&session, &clock, |_, _| {}).unwrap();
        assert_eq!(frames.len(), 5);
        assert!(clock.sleeps.borrow().is_empty());
    }

    #[test]
    fn progress_reports_every_frame_in_order() {
        let clock = StepClock::new();
        let session = CaptureSession::from_renderer(slow(&clock, 1));
        let sampler = FrameSampler::new(Schedule::new(3, 100), Viewport { width: 4, height: 3 });

        let mut seen = Vec::new();
        let frames = sampler.capture(&session, &clock, |done, total| seen.push((done, total))).unwrap();
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
        let order: Vec<_> = frames.iter().map(|f| f.image.get_pixel(0, 0)[0]).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn snapshot_failure_aborts_with_frame_index() {
        let clock = StepClock::new();
        let mut renderer = slow(&clock, 1);
        renderer.fail_at = Some(2);
        let session = CaptureSession::from_renderer(renderer);
        let sampler = FrameSampler::new(Schedule::new(5, 100), Viewport { width: 4, height: 3 });

        match sampler.capture(&session, &clock, |_, _| {}).unwrap_err() {
            Error::CaptureError { frame, .. } => assert_eq!(frame, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn oversized_snapshots_are_cropped() {
        let clock = StepClock::new();
        let mut renderer = slow(&clock, 1);
        renderer.size = (9, 7);
        let session = CaptureSession::from_renderer(renderer);
        let sampler = FrameSampler::new(Schedule::new(2, 100), Viewport { width: 4, height: 3 });

        let frames = sampler.capture(&session, &clock, |_, _| {}).unwrap();
        assert!(frames.iter().all(|f| f.dimensions() == (4, 3)));
    }
}
