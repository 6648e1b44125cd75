//! Verification harness for the MR cycle-accurate PowerPC core model.
//!
//! This crate drives a stepped hardware model and checks it against an instruction-set
//! reference. It provides:
//! 1. **State:** A chunked binary codec for architectural snapshots, plus import and export.
//! 2. **Checker:** Lockstep replay of every committed, non-faulting instruction on a reference
//!    interpreter, diffing the write-back ports.
//! 3. **I/O:** Socket-backed console and debug peripherals with an adaptive poll interval.
//! 4. **Simulation:** The testbench clocking wrapper, the run session and exit statistics.
//!
//! The hardware model itself is an external collaborator reached only through the
//! [`model::HardwareModel`] accessor trait.

/// Common types (register names, packed flag layout, errors).
pub mod common;
/// Harness configuration (defaults, serde structures).
pub mod config;
/// Lockstep co-simulation checker.
pub mod checker;
/// Socket-backed peripheral emulation.
pub mod io;
/// Model accessor traits and the in-memory architectural state.
pub mod model;
/// Testbench clocking and the run session.
pub mod sim;
/// Architectural snapshot codec, importer and exporter.
pub mod state;
/// Run statistics and the exit summary.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Checker over a reference interpreter.
pub use crate::checker::Checker;
/// Peripheral socket multiplexer.
pub use crate::io::IoMux;
/// Accessor traits implemented by the hardware model.
pub use crate::model::{ArchAccess, ArchState, HardwareModel};
/// Clocking wrapper and run session.
pub use crate::sim::{Session, Testbench};
