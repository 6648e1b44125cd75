//! # Unit Tests
//!
//! Grouped by harness module.



/// Configuration defaults and JSON loading.
pub mod config;

/// Snapshot export.
pub mod exporter;


/// Poll interval and socket services.
pub mod io;

/// Testbench clocking and the run session.
pub mod session;
