//! Discrete-event scheduler driving suspended processes over simulated time.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::{debug, warn};

use super::clock::{ClockState, SimClock};
use super::types::SimTime;

/// What a process asks for when it hands control back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    /// The process has finished and is dropped.
    Done,
    /// Resume after the given number of hours.
    After(f64),
    /// Resume at an absolute time.
    At(SimTime),
}

/// A suspendable unit of work resumed by the [`Scheduler`].
///
/// `W` is the mutable state the process operates on. A process only sees
/// the clock value it was scheduled for.
pub trait Process<W> {
    /// Label used in the firing trace.
    fn name(&self) -> &str;

    /// Runs the process at `now` and returns its next suspension.
    fn resume(&mut self, now: SimTime, world: &mut W) -> Yield;
}

/// Narrow registration port exposed to components that need to put work
/// on the simulated timeline.
pub trait EventPort<W> {
    /// Registers `process` to be resumed at `at`.
    fn register_at(&mut self, at: SimTime, process: Box<dyn Process<W>>);
}

/// One resumption observed by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    /// Simulated time of the resumption.
    pub time: SimTime,
    /// Registration sequence number of the suspension that fired.
    pub seq: u64,
    /// Process label.
    pub name: String,
}

struct Pending<W> {
    at: SimTime,
    seq: u64,
    process: Box<dyn Process<W>>,
}

impl<W> PartialEq for Pending<W> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<W> Eq for Pending<W> {}

impl<W> PartialOrd for Pending<W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<W> Ord for Pending<W> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Cooperative discrete-event scheduler.
///
/// Pending suspensions are kept in a min-heap keyed by `(time, seq)` where
/// `seq` is a monotonically increasing registration counter, so processes
/// due at the same instant resume in registration order.
///
/// # Examples
///
/// ```
/// use owf_appraisal::sim::scheduler::{EventPort, Process, Scheduler, Yield};
/// use owf_appraisal::sim::types::SimTime;
///
/// struct Tick;
///
/// impl Process<Vec<f64>> for Tick {
///     fn name(&self) -> &str {
///         "tick"
///     }
///
///     fn resume(&mut self, now: SimTime, seen: &mut Vec<f64>) -> Yield {
///         seen.push(now.hours());
///         Yield::After(2.0)
///     }
/// }
///
/// let mut scheduler: Scheduler<Vec<f64>> = Scheduler::new(SimTime::from_hours(5.0));
/// scheduler.register_at(SimTime::ZERO, Box::new(Tick));
/// let mut seen = Vec::new();
/// scheduler.run(&mut seen);
/// assert_eq!(seen, vec![0.0, 2.0, 4.0]);
/// ```
pub struct Scheduler<W> {
    clock: SimClock,
    queue: BinaryHeap<Reverse<Pending<W>>>,
    next_seq: u64,
    fired: usize,
    trace: Option<Vec<Firing>>,
}

impl<W> Scheduler<W> {
    /// Creates an idle scheduler that runs up to (excluding) `horizon`.
    pub fn new(horizon: SimTime) -> Self {
        Self {
            clock: SimClock::new(horizon),
            queue: BinaryHeap::new(),
            next_seq: 0,
            fired: 0,
            trace: None,
        }
    }

    /// Enables recording of every resumption, see [`Scheduler::trace`].
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Vec::new());
        self
    }

    /// Runs until the horizon is reached or no suspension remains below it.
    ///
    /// Calling `run` on a completed scheduler does nothing.
    pub fn run(&mut self, world: &mut W) {
        if self.clock.state() != ClockState::Idle {
            return;
        }
        self.clock.start();
        debug!(horizon = %self.clock.horizon(), pending = self.queue.len(), "scheduler running");

        while let Some(Reverse(head)) = self.queue.peek() {
            let at = head.at;
            if !self.clock.advance_to(at) {
                break;
            }
            while self.queue.peek().is_some_and(|Reverse(p)| p.at == at) {
                let Some(Reverse(mut pending)) = self.queue.pop() else {
                    break;
                };
                if let Some(trace) = self.trace.as_mut() {
                    trace.push(Firing {
                        time: at,
                        seq: pending.seq,
                        name: pending.process.name().to_string(),
                    });
                }
                self.fired += 1;
                match pending.process.resume(at, world) {
                    Yield::Done => {}
                    Yield::After(hours) => self.push(at.after(hours), pending.process),
                    Yield::At(target) => {
                        if target < at {
                            warn!(
                                process = pending.process.name(),
                                %target,
                                now = %at,
                                "resume target in the past, clamped to now"
                            );
                        }
                        self.push(target.max(at), pending.process);
                    }
                }
            }
        }

        self.clock.complete();
        debug!(
            fired = self.fired,
            left_pending = self.queue.len(),
            "scheduler completed"
        );
    }

    fn push(&mut self, at: SimTime, process: Box<dyn Process<W>>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Pending { at, seq, process }));
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    /// Number of suspensions not yet resumed.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Total number of resumptions performed.
    pub fn fired(&self) -> usize {
        self.fired
    }

    /// Recorded resumptions, if tracing was enabled.
    pub fn trace(&self) -> Option<&[Firing]> {
        self.trace.as_deref()
    }
}

impl<W> EventPort<W> for Scheduler<W> {
    fn register_at(&mut self, at: SimTime, process: Box<dyn Process<W>>) {
        self.push(at.max(self.clock.now()), process);
    }
}
