//! Monotonic clock abstraction
//!
//! The control loop needs two things from a clock: a millisecond stamp for
//! telemetry rows and a microsecond reading to bound how long a cycle may
//! spend draining the sensor FIFO.

use core::cell::Cell;

/// Monotonic time since boot.
///
/// # Example
///
/// ```
/// use sightline_core::traits::{MockTime, TimeSource};
///
/// fn over_budget<T: TimeSource>(clock: &T, started_us: u64, budget_us: u64) -> bool {
///     clock.elapsed_since(started_us) > budget_us
/// }
///
/// let clock = MockTime::new();
/// let start = clock.now_us();
/// clock.advance(2_501);
/// assert!(over_budget(&clock, start, 2_500));
/// ```
pub trait TimeSource {
    fn now_us(&self) -> u64;

    fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }

    /// Microseconds since `reference_us`, saturating at zero
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Hand-driven clock for host tests.
///
/// Besides explicit [`advance`](MockTime::advance), a clock built with
/// [`with_step`](MockTime::with_step) moves forward by a fixed amount on
/// every read, which models the time spent per sensor transaction.
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
    step_us: u64,
}

impl MockTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
            step_us: 0,
        }
    }

    /// Clock that advances by `step_us` after each reading
    pub fn with_step(step_us: u64) -> Self {
        Self {
            current_us: Cell::new(0),
            step_us,
        }
    }

    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get().saturating_add(us));
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        let now = self.current_us.get();
        self.current_us.set(now.saturating_add(self.step_us));
        now
    }
}
