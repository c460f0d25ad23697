/// Simulation clock and run lifecycle.
pub mod clock;
/// One-shot cost event definitions.
pub mod event;
/// Periodic wind-farm response sampling.
pub mod response;
/// Event schedule built from the cost schedule.
pub mod schedule;
pub mod scheduler;
pub mod types;
