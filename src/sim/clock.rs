use super::types::SimTime;

/// Lifecycle of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Created, not yet started.
    Idle,
    /// Advancing through pending events.
    Running,
    /// Horizon reached or nothing left to fire.
    Completed,
}

/// A simulation clock that advances in jumps towards a fixed horizon.
///
/// The clock only moves forward. Targets at or beyond the horizon are
/// refused and complete the run instead.
///
/// # Examples
///
/// ```
/// use owf_appraisal::sim::clock::{ClockState, SimClock};
/// use owf_appraisal::sim::types::SimTime;
///
/// let mut clock = SimClock::new(SimTime::from_hours(10.0));
/// clock.start();
/// assert!(clock.advance_to(SimTime::from_hours(4.0)));
/// assert!(!clock.advance_to(SimTime::from_hours(10.0)));
/// assert_eq!(clock.state(), ClockState::Completed);
/// assert_eq!(clock.now().hours(), 10.0);
/// ```
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current simulated time
    now: SimTime,
    /// Exclusive upper bound of the run
    horizon: SimTime,
    state: ClockState,
}

impl SimClock {
    /// Creates an idle clock at project start.
    ///
    /// # Arguments
    ///
    /// * `horizon` - Exclusive end of the run; events at or after it never fire
    pub fn new(horizon: SimTime) -> Self {
        Self {
            now: SimTime::ZERO,
            horizon,
            state: ClockState::Idle,
        }
    }

    /// Moves `Idle → Running`. Has no effect in any other state.
    pub fn start(&mut self) {
        if self.state == ClockState::Idle {
            self.state = ClockState::Running;
        }
    }

    /// Advances the clock to `target`.
    ///
    /// # Returns
    ///
    /// * `true` - The clock now reads `target`
    /// * `false` - `target` is at or past the horizon (or the clock is not
    ///   running); the clock is completed instead
    ///
    /// Targets earlier than the current time are clamped to the current time.
    pub fn advance_to(&mut self, target: SimTime) -> bool {
        if self.state != ClockState::Running {
            return false;
        }
        if target >= self.horizon {
            self.complete();
            return false;
        }
        self.now = self.now.max(target);
        true
    }

    /// Moves to `Completed`, leaving the clock at the horizon if it was running.
    pub fn complete(&mut self) {
        if self.state == ClockState::Running {
            self.now = self.now.max(self.horizon);
        }
        self.state = ClockState::Completed;
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    pub fn state(&self) -> ClockState {
        self.state
    }
}
