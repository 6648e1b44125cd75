//! Adaptive poll interval.
//!
//! Socket polling costs a syscall, so the multiplexer only polls every Nth cycle. N starts
//! at the maximum and moves by a fixed step whenever two consecutive polls agree: two busy
//! polls shorten it, two idle polls lengthen it.

/// Poll countdown with busy/idle hysteresis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollInterval {
    current: u32,
    min: u32,
    max: u32,
    step: u32,
    count: u32,
    busy_last: bool,
}

impl PollInterval {
    /// Creates an interval starting at `max`.
    ///
    /// A `min` above `max` is lowered to `max`; a zero `min` is treated as one.
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        let max = max.max(1);
        let min = min.clamp(1, max);
        Self {
            current: max,
            min,
            max,
            step,
            count: 0,
            busy_last: false,
        }
    }

    /// Counts one invocation; returns `true` on the invocation that should poll.
    #[inline]
    pub const fn due(&mut self) -> bool {
        self.count += 1;
        if self.count < self.current {
            return false;
        }
        self.count = 0;
        true
    }

    /// Feeds back whether the poll that just fired found work.
    pub fn record(&mut self, busy: bool) {
        if busy && self.busy_last {
            self.current = self.current.saturating_sub(self.step).max(self.min);
        } else if !busy && !self.busy_last {
            self.current = self.current.saturating_add(self.step).min(self.max);
        }
        self.busy_last = busy;
    }

    /// Current interval in invocations per poll.
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Lower bound.
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> u32 {
        self.max
    }
}
