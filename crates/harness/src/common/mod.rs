//! Common types shared by the codec, the checker and the main loop.
//!
//! This module provides:
//! 1. **Register names:** The model-internal register fields reachable through the accessor
//!    interface.
//! 2. **Packed flags:** The XER/CR packing used by the model's combined flags register.
//! 3. **Errors:** Error types for snapshot transport, import, save and configuration.

/// Error types for the harness.
pub mod error;

/// Packed XER/CR register layout.
pub mod flags;

/// Model-internal register names.
pub mod reg;

pub use error::{CodecError, ConfigError, ImportError, SaveError};
pub use flags::PackedFlags;
pub use reg::{BatHalf, Peripheral, Reg};
