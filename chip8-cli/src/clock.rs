//! Step pacing.
use std::{
    thread,
    time::{Duration, Instant},
};

use chip8_core::constants::NANOS_IN_SECOND;
use serde::Deserialize;

/// Step frequency, in hertz (per second). Zero means unthrottled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// Timer to synchronize the driver thread with the machine's step cadence.
///
/// Time spent outside of [`Clock::wait`] counts towards the current cycle.
pub struct Clock {
    start: Instant,
    interval: Duration,
}

impl Clock {
    /// Creates a new clock with the current time as internal state.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval,
        }
    }

    /// Set the clock state back to zero.
    pub fn reset(&mut self) {
        self.start = Instant::now()
    }

    /// Block the current thread until the next clock cycle.
    pub fn wait(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        while self.start.elapsed() < self.interval {
            // Sleep does not have enough resolution, and causes
            // the clock to run at 30 FPS.
            //
            // Yielding in a loop is the best alternative.
            thread::yield_now();
        }

        // Reset back to zero, rather than trying to catch up.
        self.reset();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clock_hz() {
        let interval: Duration = Hz(60).into();
        assert_eq!(interval.as_millis(), 16);

        let interval: Duration = Hz(0).into();
        assert!(interval.is_zero());
    }

    #[test]
    fn test_wait_paces() {
        let mut clock = Clock::new(Duration::from_millis(5));
        let start = Instant::now();
        clock.wait();
        clock.wait();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
