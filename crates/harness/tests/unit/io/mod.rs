/// Adaptive poll interval hysteresis.
pub mod poll_interval;
