//! Error types for the harness.
//!
//! This module defines the error taxonomy for operations that can fail outright:
//! 1. **Transport:** Truncated or unreadable snapshot streams (`CodecError`).
//! 2. **Import:** Transport failures plus memory blocks that match no modelled bank
//!    (`ImportError`).
//! 3. **Save:** Failures writing a snapshot out (`SaveError`).
//! 4. **Configuration:** Unreadable or malformed configuration files (`ConfigError`).
//!
//! Verification mismatches and peripheral socket faults are deliberately not errors: they
//! are reported and counted, and the simulation keeps running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reading or writing the chunk stream.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The stream ended partway through a chunk header.
    #[error("short read on chunk header: got {got} of {expected} bytes")]
    ShortHeader {
        /// Bytes that were available.
        got: usize,
        /// Header size.
        expected: usize,
    },

    /// The stream ended partway through a chunk payload.
    #[error("short read on chunk '{name}' payload: got {got} of {expected} bytes")]
    ShortPayload {
        /// Name of the truncated chunk.
        name: String,
        /// Bytes that were available.
        got: u64,
        /// Declared payload length.
        expected: u64,
    },

    /// The underlying reader or writer failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure applying a snapshot to the model.
///
/// Any of these leaves the model holding whatever chunks were applied before the failure;
/// the caller decides whether that state is usable.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The chunk stream could not be read.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A memory block does not fit inside any modelled bank.
    #[error("memory block {base:#010x}+{len:#x} is outside every modelled bank")]
    UnmappedBlock {
        /// Block base address.
        base: u64,
        /// Block length in bytes.
        len: u64,
    },

    /// A memory chunk too short to carry its base address.
    #[error("memory chunk of {len} bytes has no base address")]
    BlockTooShort {
        /// Declared payload length.
        len: u64,
    },

    /// The snapshot file could not be opened.
    #[error("can't open state file '{}': {source}", path.display())]
    Open {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

/// Failure saving a snapshot.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The output file could not be created.
    #[error("can't open '{}' for writing: {source}", path.display())]
    Create {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Encoding or writing a chunk failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failure loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("can't read config '{}': {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// The JSON did not match the configuration schema.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
