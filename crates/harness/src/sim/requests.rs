//! Out-of-band operator requests.
//!
//! A signal handler or another thread sets bits; the run loop takes them between cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Pending request bits, shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct RequestFlags(Arc<AtomicU8>);

impl RequestFlags {
    /// Print the register dump.
    pub const DUMP_REGS: u8 = 0x1;
    /// Save a snapshot to the next generation file.
    pub const SAVE_STATE: u8 = 0x2;
    /// Stop the run at the next cycle boundary.
    pub const STOP: u8 = 0x4;

    /// An empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises `bits`. Only performs an atomic OR, so it is safe from a signal handler.
    pub fn request(&self, bits: u8) {
        let _ = self.0.fetch_or(bits, Ordering::SeqCst);
    }

    /// Clears and returns every pending bit.
    pub fn take(&self) -> u8 {
        self.0.swap(0, Ordering::SeqCst)
    }

    /// Pending bits, without clearing them.
    pub fn pending(&self) -> u8 {
        self.0.load(Ordering::SeqCst)
    }
}
