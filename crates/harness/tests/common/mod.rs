/// Test context, tracing setup and snapshot helpers.
pub mod harness;

/// Mock hardware model and reference interpreters.
pub mod mocks;
