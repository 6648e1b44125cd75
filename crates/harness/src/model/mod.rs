//! Hardware model accessor interface.
//!
//! The core never sees the model's internal hierarchy. Everything it needs goes through
//! two traits:
//! 1. **`ArchAccess`:** Named register get/set and memory-bank access. Enough for snapshot
//!    import and export.
//! 2. **`HardwareModel`:** The stepped state machine: reset/clock/eval, the commit probe
//!    the checker reads, retirement counters, and per-peripheral byte hooks.
//!
//! [`ArchState`] is a plain in-memory implementation of `ArchAccess`, used for offline
//! snapshot work.

/// In-memory architectural state.
pub mod arch;

/// Memory bank layout.
pub mod memory;

pub use arch::ArchState;
pub use memory::{Bank, MemoryLayout};

use crate::common::{Peripheral, Reg};

/// Number of write-back ports on the commit stage: two GPR ports and one XER/CR port.
pub const WRITEBACK_PORTS: usize = 3;

/// Fault code the memory stage reports for a system call.
pub const FAULT_SYSCALL: u8 = 4;

/// Register and memory access to the model's architectural state.
pub trait ArchAccess {
    /// Reads a register field. Fields narrower than 64 bits are zero-extended.
    fn read_reg(&self, reg: Reg) -> u64;

    /// Writes a register field. Bits beyond the field's width are discarded by the model.
    fn write_reg(&mut self, reg: Reg, val: u64);

    /// Layout of the modelled memory banks.
    fn memory_layout(&self) -> &MemoryLayout;

    /// Contents of bank `index` of [`memory_layout`](Self::memory_layout).
    fn bank(&self, index: usize) -> &[u8];

    /// Mutable contents of bank `index`.
    fn bank_mut(&mut self, index: usize) -> &mut [u8];
}

/// The register file a write-back port targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// General-purpose register file; `reg` is the GPR index.
    Gpr,
    /// Combined XER/CR field; `reg` is unused.
    XerCr,
}

/// One write-back port as seen in the commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritebackPort {
    /// Register file written through this port.
    pub kind: PortKind,
    /// Port wrote a value this cycle.
    pub enable: bool,
    /// Destination register index.
    pub reg: u8,
    /// Value written. For `XerCr` this is the packed field.
    pub value: u64,
}

impl WritebackPort {
    /// An idle port of the given kind.
    pub const fn idle(kind: PortKind) -> Self {
        Self {
            kind,
            enable: false,
            reg: 0,
            value: 0,
        }
    }
}

/// Commit-stage probe: what, if anything, retired this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    /// An instruction is committing.
    pub valid: bool,
    /// Fault code for the committing instruction; zero for none.
    pub fault: u8,
    /// Address of the committing instruction.
    pub pc: u32,
    /// MSR in effect for the committing instruction.
    pub msr: u32,
    /// Instruction word.
    pub instr: u32,
    /// Memory-stage result value (the port-0 result carried into write-back).
    pub result: u32,
    /// Data returned on the load path this cycle.
    pub load_data: u64,
    /// New PC when the memory stage redirects fetch.
    pub redirect: Option<u32>,
    /// Write-back port activity.
    pub ports: [WritebackPort; WRITEBACK_PORTS],
}

impl Commit {
    /// A cycle in which nothing commits.
    pub const fn idle() -> Self {
        Self {
            valid: false,
            fault: 0,
            pc: 0,
            msr: 0,
            instr: 0,
            result: 0,
            load_data: 0,
            redirect: None,
            ports: [
                WritebackPort::idle(PortKind::Gpr),
                WritebackPort::idle(PortKind::Gpr),
                WritebackPort::idle(PortKind::XerCr),
            ],
        }
    }

    /// The instruction completed without a fault and should be checked.
    pub const fn is_clean(&self) -> bool {
        self.valid && self.fault == 0
    }
}

impl Default for Commit {
    fn default() -> Self {
        Self::idle()
    }
}

/// Retirement counters kept by the write-back stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Instructions committed.
    pub instructions: u64,
    /// Cycles in which write-back stalled.
    pub stall_cycles: u64,
}

/// A cycle-stepped hardware model.
///
/// Implemented by the binding around the generated model. Signals set through this trait
/// take effect at the next [`eval`](Self::eval).
pub trait HardwareModel: ArchAccess {
    /// Drives the reset input.
    fn set_reset(&mut self, asserted: bool);

    /// Drives the clock input.
    fn set_clock(&mut self, high: bool);

    /// Settles the model for the current inputs.
    fn eval(&mut self);

    /// The model has requested the simulation stop.
    fn finished(&self) -> bool;

    /// Commit-stage activity for the cycle just evaluated.
    fn commit(&self) -> Commit;

    /// Retirement counters.
    fn counters(&self) -> Counters;

    /// Drives the GPIO inputs (DIP switches).
    fn set_gpio(&mut self, value: u32);

    /// Byte the peripheral is transmitting this cycle, if any.
    ///
    /// The model couples its consume strobe to has-data, so a byte is offered for exactly
    /// one cycle.
    fn tx_byte(&self, port: Peripheral) -> Option<u8>;

    /// The peripheral's receive FIFO can take a byte.
    fn rx_ready(&self, port: Peripheral) -> bool;

    /// Presents a received byte with a one-cycle strobe, or deasserts the strobe.
    fn rx_strobe(&mut self, port: Peripheral, byte: Option<u8>);
}
