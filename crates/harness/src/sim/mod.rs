//! Simulation driver.
//!
//! Wraps a [`HardwareModel`](crate::model::HardwareModel) for cycle-by-cycle execution:
//! 1. **Testbench:** Reset sequencing and the two-edge tick with I/O in between.
//! 2. **Session:** Start-up settings, the run loop, state saves and the exit path.
//! 3. **Requests:** Atomic dump/save/stop flags an operator raises from outside the loop.
//! 4. **Dump:** The human-readable register dump.

/// Register dump formatting.
pub mod dump;
/// Operator request flags.
pub mod requests;
/// Run session and loop.
pub mod session;
/// Unix signal hookup for requests.
#[cfg(unix)]
pub mod signals;
/// Clocking wrapper.
pub mod testbench;

pub use dump::RegisterDump;
pub use requests::RequestFlags;
pub use session::Session;
pub use testbench::Testbench;
