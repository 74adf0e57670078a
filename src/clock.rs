//! The simulation clock: a single monotonically increasing integer tick.

/// Discrete simulation time. A new clock reads zero and only ever moves
/// forward, one tick per model update.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    time: u64,
}

impl Clock {
    #[must_use]
    pub fn new() -> Clock {
        Clock { time: 0 }
    }

    /// Advances the clock by one tick.
    pub fn tick(&mut self) {
        self.time += 1;
    }

    /// Returns the current tick.
    #[must_use]
    pub fn read(&self) -> u64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::Clock;

    #[test]
    fn new_clock_reads_zero() {
        assert_eq!(Clock::new().read(), 0);
    }

    #[test]
    fn tick_increments() {
        let mut clock = Clock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.read(), 2);
    }
}
