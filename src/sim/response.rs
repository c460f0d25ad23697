//! Periodic sampling of the wind-farm response during operations.
//!
//! The response itself (wake model, surrogate, fatigue) lives outside this
//! crate and is reached only through [`ResponseModel`].

use serde::Serialize;

use super::scheduler::{Process, Yield};
use super::types::SimTime;

/// Source of the farm response at a simulated time.
pub trait ResponseModel {
    /// Response value (e.g. farm power in MW) at `now`.
    fn response(&mut self, now: SimTime) -> f64;
}

impl<F: FnMut(SimTime) -> f64> ResponseModel for F {
    fn response(&mut self, now: SimTime) -> f64 {
        self(now)
    }
}

/// Response that never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantResponse(pub f64);

impl ResponseModel for ConstantResponse {
    fn response(&mut self, _now: SimTime) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseSample {
    /// Hours from project start.
    pub time: f64,
    pub value: f64,
}

/// Samples in time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseLog {
    samples: Vec<ResponseSample>,
}

impl ResponseLog {
    pub fn push(&mut self, time: SimTime, value: f64) {
        self.samples.push(ResponseSample {
            time: time.hours(),
            value,
        });
    }

    pub fn samples(&self) -> &[ResponseSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean sampled value, `None` when nothing was sampled.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().map(|s| s.value).sum::<f64>() / self.samples.len() as f64)
    }
}

impl AsMut<ResponseLog> for ResponseLog {
    fn as_mut(&mut self) -> &mut ResponseLog {
        self
    }
}

/// Process querying a [`ResponseModel`] at a fixed interval within the
/// operations window `[start, end]`.
///
/// Before the window it sleeps until `start`; after the window it ends.
pub struct HourlyResponseLoop<M> {
    model: M,
    start: SimTime,
    end: SimTime,
    interval: f64,
}

impl<M: ResponseModel> HourlyResponseLoop<M> {
    /// Samples every hour.
    pub fn new(model: M, start: SimTime, end: SimTime) -> Self {
        Self::with_interval(model, start, end, 1.0)
    }

    /// # Panics
    ///
    /// Panics if `interval_hours` is not strictly positive.
    pub fn with_interval(model: M, start: SimTime, end: SimTime, interval_hours: f64) -> Self {
        assert!(interval_hours > 0.0, "sampling interval must be > 0");
        Self {
            model,
            start,
            end,
            interval: interval_hours,
        }
    }
}

impl<W, M> Process<W> for HourlyResponseLoop<M>
where
    W: AsMut<ResponseLog>,
    M: ResponseModel,
{
    fn name(&self) -> &str {
        "response_loop"
    }

    fn resume(&mut self, now: SimTime, world: &mut W) -> Yield {
        if now < self.start {
            return Yield::At(self.start);
        }
        if now > self.end {
            return Yield::Done;
        }
        let value = self.model.response(now);
        world.as_mut().push(now, value);
        Yield::After(self.interval)
    }
}
