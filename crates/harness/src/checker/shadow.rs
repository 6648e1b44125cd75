//! Reference shadow state.
//!
//! The checker's private register copy, refreshed from the model before every step. Only
//! the registers the reference interpreter can observe are mirrored: BATs, segment
//! registers and SDR1 are not, so translation-dependent code is unchecked.

use crate::common::reg::{GPR_COUNT, SPRG_COUNT};

/// Register set handed to the reference interpreter for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShadowState {
    /// General-purpose registers.
    pub gpr: [u32; GPR_COUNT],
    /// Program counter of the instruction being checked.
    pub pc: u32,
    /// Machine-state register at commit.
    pub msr: u32,
    /// Count register.
    pub ctr: u32,
    /// Link register.
    pub lr: u32,
    /// Fixed-point exception register (architectural layout).
    pub xer: u32,
    /// Condition register.
    pub cr: u32,
    /// Timebase.
    pub tb: u64,
    /// Decrementer.
    pub dec: u32,
    /// SPRG0-3.
    pub sprg: [u32; SPRG_COUNT],
    /// Save/restore register 0.
    pub srr0: u32,
    /// Save/restore register 1.
    pub srr1: u32,
    /// Data address register.
    pub dar: u32,
    /// Data storage interrupt status register.
    pub dsisr: u32,
}
