//! The per-frame driver: pump OS messages, advance the routine, present.
//!
//! ```text
//! loop:
//!   drain pending messages (non-blocking, unbounded)
//!   stop if the run flag is cleared
//!   routine.update(); routine.draw()
//!   present + commit
//!   sleep for what is left of the frame budget
//! ```
//!
//! The pump, clock and composition target are traits so the loop can be
//! driven without a window.

use std::time::{Duration, Instant};

use crate::error::{HostResult, Severity};
use crate::graphics::{present_and_commit, CompositionTarget};
use crate::router::RunFlag;
use crate::routine::{SharedRoutine, SurfaceGeometry};

/// Drains the thread's pending OS messages without blocking.
pub trait MessagePump {
    /// Dispatch everything currently queued. Returns the number of messages.
    fn drain(&mut self) -> usize;
}

/// Time source for frame pacing.
pub trait FrameClock {
    fn now(&self) -> Instant;
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock with coarse OS sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl FrameClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fixed frame budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    interval: Duration,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left in the budget after `elapsed` of work; zero on overrun.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }
}

/// Counters collected over one run of the loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    /// Frames whose work exceeded the budget
    pub overruns: u64,
    pub present_failures: u64,
}

/// Drives the frame loop until the run flag is cleared.
pub struct FrameDriver<'a, P, C> {
    pump: P,
    clock: C,
    pacer: FramePacer,
    run: RunFlag,
    routine: SharedRoutine,
    geometry: &'a dyn SurfaceGeometry,
    target: &'a dyn CompositionTarget,
}

impl<'a, P: MessagePump, C: FrameClock> FrameDriver<'a, P, C> {
    pub fn new(
        pump: P,
        clock: C,
        pacer: FramePacer,
        run: RunFlag,
        routine: SharedRoutine,
        geometry: &'a dyn SurfaceGeometry,
        target: &'a dyn CompositionTarget,
    ) -> Self {
        Self {
            pump,
            clock,
            pacer,
            run,
            routine,
            geometry,
            target,
        }
    }

    /// Run until the flag is cleared or a fatal error comes back from the
    /// composition target.
    pub fn run(mut self) -> HostResult<FrameStats> {
        let mut stats = FrameStats::default();
        let mut failing = false;

        log::info!(
            "[frame] Loop started, budget {:.1}ms",
            self.pacer.interval().as_secs_f64() * 1000.0
        );

        loop {
            let frame_start = self.clock.now();

            self.pump.drain();
            if !self.run.is_running() {
                break;
            }

            match self.routine.try_borrow_mut() {
                Ok(mut routine) => {
                    routine.update(self.geometry);
                    routine.draw();
                },
                Err(_) => log::warn!("[frame] Routine busy, skipping update"),
            }

            match present_and_commit(self.target) {
                Ok(()) => {
                    if failing {
                        log::info!("[frame] Present recovered");
                        failing = false;
                    }
                },
                Err(e) => match e.severity() {
                    Severity::Recoverable => {
                        stats.present_failures += 1;
                        if !failing {
                            log::error!("[frame] {}", e);
                            failing = true;
                        }
                    },
                    Severity::Fatal => {
                        log::error!("[frame] Stopping after {} frames: {}", stats.frames, e);
                        self.run.stop();
                        return Err(e);
                    },
                },
            }
            stats.frames += 1;

            let elapsed = self.clock.now().saturating_duration_since(frame_start);
            let remaining = self.pacer.remaining(elapsed);
            if remaining.is_zero() {
                stats.overruns += 1;
            } else {
                self.clock.sleep(remaining);
            }
        }

        log::info!(
            "[frame] Loop stopped: {} frames, {} overruns, {} present failures",
            stats.frames,
            stats.overruns,
            stats.present_failures
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::cli::LaunchArgs;
    use crate::error::{HostError, HostResult};
    use crate::graphics::GraphicsDescriptor;
    use crate::routine::Routine;
    use crate::types::{Point, Size};

    /// Clock that only advances when told to.
    #[derive(Clone)]
    struct FakeClock {
        now: Rc<Cell<Instant>>,
        sleeps: Rc<RefCell<Vec<Duration>>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: Rc::new(Cell::new(Instant::now())),
                sleeps: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn advance(&self, by: Duration) {
            self.now.set(self.now.get() + by);
        }
    }

    impl FrameClock for FakeClock {
        fn now(&self) -> Instant {
            self.now.get()
        }

        fn sleep(&mut self, duration: Duration) {
            self.sleeps.borrow_mut().push(duration);
            self.advance(duration);
        }
    }

    /// Routine whose update "takes" a scripted amount of time.
    struct TimedRoutine {
        clock: FakeClock,
        work: Vec<Duration>,
        updates: usize,
    }

    impl Routine for TimedRoutine {
        fn init(&mut self, _: &LaunchArgs, _: &GraphicsDescriptor) -> HostResult<()> {
            Ok(())
        }
        fn update(&mut self, _: &dyn SurfaceGeometry) {
            let work = self.work.get(self.updates).copied().unwrap_or_default();
            self.clock.advance(work);
            self.updates += 1;
        }
        fn draw(&mut self) {}
        fn terminate(&mut self) {}
        fn on_mouse_down(&mut self) {}
        fn on_mouse_dragged(&mut self) {}
        fn on_wheel_scrolled(&mut self, _: f32) {}
        fn reset_model_position(&mut self) {}
    }

    /// Pump that clears the run flag on a given drain.
    struct ScriptedPump {
        drains: Rc<Cell<usize>>,
        stop_on: usize,
        run: RunFlag,
    }

    impl MessagePump for ScriptedPump {
        fn drain(&mut self) -> usize {
            let n = self.drains.get() + 1;
            self.drains.set(n);
            if n == self.stop_on {
                self.run.stop();
            }
            0
        }
    }

    struct StaticGeometry;

    impl SurfaceGeometry for StaticGeometry {
        fn logical_size(&self) -> Size {
            Size::new(1920, 1040)
        }
        fn drawable_size(&self) -> Size {
            Size::new(1920, 1040)
        }
        fn mouse_position(&self) -> Point {
            Point::default()
        }
    }

    #[derive(Default)]
    struct FlakyTarget {
        failures: Cell<u32>,
        presents: Cell<u32>,
        /// Present reports a lost device from this present on
        lost_on: Cell<Option<u32>>,
    }

    impl CompositionTarget for FlakyTarget {
        fn present(&self) -> HostResult<()> {
            let n = self.presents.get() + 1;
            self.presents.set(n);
            if self.lost_on.get().is_some_and(|lost| n >= lost) {
                return Err(HostError::Device("device removed".into()));
            }
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(HostError::Present("occluded".into()));
            }
            Ok(())
        }
        fn commit(&self) -> HostResult<()> {
            Ok(())
        }
    }

    struct Harness {
        clock: FakeClock,
        routine: Rc<RefCell<TimedRoutine>>,
        drains: Rc<Cell<usize>>,
        run: RunFlag,
    }

    fn harness(work: Vec<Duration>) -> Harness {
        let clock = FakeClock::new();
        let routine = Rc::new(RefCell::new(TimedRoutine {
            clock: clock.clone(),
            work,
            updates: 0,
        }));
        Harness {
            clock,
            routine,
            drains: Rc::new(Cell::new(0)),
            run: RunFlag::new(),
        }
    }

    fn run(h: &Harness, stop_on: usize, target: &FlakyTarget) -> HostResult<FrameStats> {
        let pump = ScriptedPump {
            drains: h.drains.clone(),
            stop_on,
            run: h.run.clone(),
        };
        let routine: SharedRoutine = h.routine.clone();
        FrameDriver::new(
            pump,
            h.clock.clone(),
            FramePacer::new(Duration::from_micros(16_600)),
            h.run.clone(),
            routine,
            &StaticGeometry,
            target,
        )
        .run()
    }

    #[test]
    fn pacer_remaining_saturates() {
        let pacer = FramePacer::new(Duration::from_millis(16));
        assert_eq!(pacer.remaining(Duration::from_millis(4)), Duration::from_millis(12));
        assert_eq!(pacer.remaining(Duration::from_millis(16)), Duration::ZERO);
        assert_eq!(pacer.remaining(Duration::from_millis(40)), Duration::ZERO);
    }

    #[test]
    fn sleeps_for_rest_of_budget() {
        let h = harness(vec![Duration::from_millis(5)]);
        let stats = run(&h, 2, &FlakyTarget::default()).unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(*h.clock.sleeps.borrow(), vec![Duration::from_micros(11_600)]);
    }

    #[test]
    fn overrun_skips_sleep_and_keeps_draining() {
        let h = harness(vec![Duration::from_millis(30), Duration::from_millis(5)]);
        let stats = run(&h, 3, &FlakyTarget::default()).unwrap();

        assert_eq!(stats.frames, 2);
        assert_eq!(stats.overruns, 1);
        assert_eq!(h.drains.get(), 3);
        assert_eq!(*h.clock.sleeps.borrow(), vec![Duration::from_micros(11_600)]);
    }

    #[test]
    fn quit_exits_within_one_iteration() {
        let h = harness(vec![]);
        let stats = run(&h, 1, &FlakyTarget::default()).unwrap();

        assert_eq!(stats.frames, 0);
        assert_eq!(h.routine.borrow().updates, 0);
        assert_eq!(h.drains.get(), 1);
    }

    #[test]
    fn present_failures_do_not_stop_the_loop() {
        let h = harness(vec![]);
        let target = FlakyTarget::default();
        target.failures.set(2);
        let stats = run(&h, 5, &target).unwrap();

        assert_eq!(stats.frames, 4);
        assert_eq!(stats.present_failures, 2);
        assert_eq!(target.presents.get(), 4);
        assert_eq!(h.routine.borrow().updates, 4);
    }

    #[test]
    fn fatal_target_error_ends_the_loop() {
        let h = harness(vec![]);
        let target = FlakyTarget::default();
        target.lost_on.set(Some(2));
        let err = run(&h, 10, &target).unwrap_err();

        assert!(err.is_fatal());
        assert!(!h.run.is_running());
        assert_eq!(target.presents.get(), 2);
        assert_eq!(h.drains.get(), 2);
    }
}
