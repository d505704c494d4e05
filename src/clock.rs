use ordered_float::NotNan;

/// Simulated time, measured in hours since the bank opened.
///
/// Floating-point builtins do not implement [`Ord`], so the clock is built on [`NotNan`], which gives the event queue a
/// total order to sort by. Constructing one from a NaN is rejected at the boundary, see [`hours()`].
pub type Hours = NotNan<f64>;

/// Convert a raw number of hours into [`Hours`], returning `None` for NaN.
pub fn hours(value: f64) -> Option<Hours> {
    NotNan::new(value).ok()
}

/// The time of the most recently processed event.
///
/// The clock only moves forward: [`advance_to()`] refuses any time earlier than the current one, which would mean an
/// event was scheduled in the simulation's past.
///
/// [`advance_to()`]: SimulationClock::advance_to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    now: Hours,
}

impl SimulationClock {
    /// A clock reading zero, i.e. opening time.
    pub fn new() -> Self {
        Self { now: Hours::default() }
    }

    pub fn now(&self) -> Hours {
        self.now
    }

    /// Move the clock to `time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackInTime`] without touching the clock if `time` is earlier than the current reading.
    ///
    /// [`Error::BackInTime`]: crate::Error::BackInTime
    pub fn advance_to(&mut self, time: Hours) -> crate::Result {
        if time < self.now {
            return Err(crate::Error::BackInTime);
        }
        self.now = time;
        Ok(())
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SimulationClock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "t={:.4}h", self.now.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(value: f64) -> Hours {
        hours(value).unwrap()
    }

    #[test]
    fn nan_is_not_a_time() {
        assert!(hours(f64::NAN).is_none());
        assert_eq!(Some(h(1.5)), hours(1.5));
    }

    #[test]
    fn clock_moves_forward_and_allows_ties() {
        let mut clock = SimulationClock::new();
        clock.advance_to(h(0.5)).unwrap();
        clock.advance_to(h(0.5)).unwrap();
        clock.advance_to(h(2.0)).unwrap();
        assert_eq!(h(2.0), clock.now());
    }

    #[test]
    fn clock_refuses_to_rewind() {
        let mut clock = SimulationClock::new();
        clock.advance_to(h(3.0)).unwrap();
        assert_eq!(Err(crate::Error::BackInTime), clock.advance_to(h(2.9)));
        assert_eq!(h(3.0), clock.now(), "failed advance should leave the clock alone");
    }
}
