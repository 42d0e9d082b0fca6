//! Countdown timers.

/// 8-bit counter that counts down to 0, once per tick.
///
/// The machine owns two: the delay timer (DT) read back by programs, and the
/// sound timer (ST), which should sound a buzzer for as long as it is non-zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer(u8);

impl Timer {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline(always)]
    pub fn get(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub fn set(&mut self, value: u8) {
        self.0 = value;
    }

    /// Count down by one, stopping at zero.
    #[inline]
    pub fn tick(&mut self) {
        // The checked_sub implementation uses `unlikely!()` which degrades performance.
        let (val, underflow) = self.0.overflowing_sub(1);
        if !underflow {
            self.0 = val;
        }
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.0 > 0
    }
}
