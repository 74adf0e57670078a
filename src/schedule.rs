//! A future-event list keyed by absolute integer tick
//!
//! Defines a `Schedule<T>` that stores events of type `T` in buckets, one
//! bucket per tick. Registering an event is *O*(1) amortized and draining the
//! bucket for the current tick is *O*(bucket size). Within a bucket, events
//! keep the order in which they were registered.
//!
//! The schedule owns the simulation [`Clock`]: delays passed to
//! [`Schedule::register`] are relative to the clock's current reading. The
//! `Model` uses it with `T = Event`, draining the due bucket once per tick and
//! firing each event against itself.

use crate::clock::Clock;
use crate::HashMap;

/// A future-event list bucketed by tick.
///
/// There is no cancellation: once registered, an event is returned by
/// [`Schedule::advance`] at its tick. A delay of positive or negative infinity
/// means "never" and the event is dropped on registration.
pub struct Schedule<T> {
    clock: Clock,
    events: HashMap<u64, Vec<T>>,
    pending: usize,
}

impl<T> Schedule<T> {
    /// Create an empty schedule with its clock at tick zero
    #[must_use]
    pub fn new() -> Schedule<T> {
        Schedule {
            clock: Clock::new(),
            events: HashMap::default(),
            pending: 0,
        }
    }

    /// Returns the current tick.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.read()
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Advances the clock by one tick. The current tick's bucket must have
    /// been drained with [`Schedule::advance`] first.
    pub fn tick(&mut self) {
        debug_assert!(
            self.scheduled_at(self.clock.read()) == 0,
            "Ticking past undrained events"
        );
        self.clock.tick();
    }

    /// Register `event` to fire `floor(delay)` ticks from now.
    ///
    /// Returns `false` if the event was dropped because `delay` is infinite
    /// or lands beyond the last representable tick.
    ///
    /// # Panics
    ///
    /// Panics if `delay` is NaN or floors to a tick in the past.
    pub fn register(&mut self, event: T, delay: f64) -> bool {
        if delay.is_infinite() {
            return false;
        }
        assert!(!delay.is_nan(), "Invalid delay value");
        let delay = delay.floor();
        assert!(delay >= 0.0, "Cannot schedule an event in the past");

        #[allow(clippy::cast_precision_loss)]
        let last_tick = u64::MAX as f64;
        if delay >= last_tick {
            return false;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let Some(time) = self.clock.read().checked_add(delay as u64) else {
            return false;
        };
        self.events.entry(time).or_default().push(event);
        self.pending += 1;
        true
    }

    /// Removes and returns every event bucketed at the current tick, in
    /// registration order. A second call for the same tick returns nothing.
    pub fn advance(&mut self) -> Vec<T> {
        match self.events.remove(&self.clock.read()) {
            Some(due) => {
                self.pending -= due.len();
                due
            }
            None => Vec::new(),
        }
    }

    /// Number of events registered for the given absolute tick.
    #[must_use]
    pub fn scheduled_at(&self, time: u64) -> usize {
        self.events.get(&time).map_or(0, Vec::len)
    }

    /// Total number of events waiting to be returned.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl<T> Default for Schedule<T> {
    fn default() -> Self {
        Self::new()
    }
}
