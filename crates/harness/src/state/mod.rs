//! Architectural state snapshots.
//!
//! A snapshot is a sequence of named, length-tagged chunks with no terminator. This module
//! provides:
//! 1. **Chunks:** The record type, chunk names and the normalized chunk tag.
//! 2. **Codec:** A lazy reader and a padding writer for the chunk stream.
//! 3. **Import:** Applying a chunk stream to a model's register and memory surface.
//! 4. **Export:** Producing a chunk stream from a model (the save path).
//!
//! Snapshots are only read or written between cycles, never from the per-cycle loop.

/// Chunk records, names and tags.
pub mod chunk;

/// Chunk stream reader and writer.
pub mod codec;

/// Snapshot export (save path).
pub mod export;

/// Snapshot import (restore path).
pub mod import;

pub use chunk::{Chunk, ChunkName, ChunkTag, Scalar};
pub use codec::{ChunkReader, ChunkWriter};
pub use export::{export_snapshot, save_file, snapshot_chunks};
pub use import::{ImportReport, RestoredBlock, import_snapshot, restore_file};
