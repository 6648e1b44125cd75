//! Model-internal register names.
//!
//! The hardware model exposes its architectural state as a flat set of named fields rather
//! than its internal hierarchy. This module defines:
//! 1. **`Reg`:** Every register field the importer, exporter and checker touch.
//! 2. **`BatHalf`:** Upper/lower selector for block-address-translation pairs.
//! 3. **`Peripheral`:** The two byte-stream peripherals serviced over sockets.
//!
//! Several architectural registers are staged by the pipeline in more than one place; the
//! "current" and "fetch" variants of PC and MSR name those copies individually.

use std::fmt;

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 32;

/// Number of segment registers.
pub const SR_COUNT: usize = 16;

/// Number of BAT pairs in each of the instruction and data spaces.
pub const BAT_PAIRS: usize = 4;

/// Number of SPRG scratch registers.
pub const SPRG_COUNT: usize = 4;

/// Upper or lower word of a block-address-translation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatHalf {
    /// Upper word (`BATnU`): effective address, block length, validity.
    Upper,
    /// Lower word (`BATnL`): physical page number, WIMG and protection.
    Lower,
}

impl BatHalf {
    /// Suffix letter used in snapshot chunk names.
    pub const fn suffix(self) -> char {
        match self {
            Self::Upper => 'U',
            Self::Lower => 'L',
        }
    }
}

/// A register field exposed by the hardware model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    /// Program counter of the instruction in flight at fetch (committed-side copy).
    CurrentPc,
    /// Next-fetch program counter.
    FetchPc,
    /// Machine-state register, committed-side copy.
    CurrentMsr,
    /// Machine-state register as seen by fetch.
    FetchMsr,
    /// Count register.
    Ctr,
    /// Link register.
    Lr,
    /// Combined XER/CR field; see [`PackedFlags`](crate::common::PackedFlags).
    XerCr,
    /// SPRG scratch register `0..4`.
    Sprg(u8),
    /// Save/restore register 0 (exception return address).
    Srr0,
    /// Save/restore register 1 (exception MSR).
    Srr1,
    /// Data address register (faulting data address).
    Dar,
    /// Data storage interrupt status register.
    Dsisr,
    /// Decrementer.
    Dec,
    /// Free-running timebase (64-bit).
    Tb,
    /// Page-table base register.
    Sdr1,
    /// Instruction BAT pair `0..4`.
    Ibat(u8, BatHalf),
    /// Data BAT pair `0..4`.
    Dbat(u8, BatHalf),
    /// General-purpose register `0..32`.
    Gpr(u8),
    /// Segment register `0..16`.
    Sr(u8),
    /// Interrupt controller: latched edge-triggered pending bits.
    IntcPending,
    /// Interrupt controller: per-source enables.
    IntcEnabled,
    /// Interrupt controller: master enable.
    IntcMasterEnable,
    /// Interrupt controller: hardware interrupt enable.
    IntcHwIrqEnable,
    /// Console UART interrupt status.
    ConsoleIrqStatus,
    /// Console UART interrupt enable.
    ConsoleIrqEnable,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentPc => write!(f, "PC"),
            Self::FetchPc => write!(f, "FETCH_PC"),
            Self::CurrentMsr => write!(f, "MSR"),
            Self::FetchMsr => write!(f, "FETCH_MSR"),
            Self::Ctr => write!(f, "CTR"),
            Self::Lr => write!(f, "LR"),
            Self::XerCr => write!(f, "XERCR"),
            Self::Sprg(n) => write!(f, "SPRG{n}"),
            Self::Srr0 => write!(f, "SRR0"),
            Self::Srr1 => write!(f, "SRR1"),
            Self::Dar => write!(f, "DAR"),
            Self::Dsisr => write!(f, "DSISR"),
            Self::Dec => write!(f, "DEC"),
            Self::Tb => write!(f, "TB"),
            Self::Sdr1 => write!(f, "SDR1"),
            Self::Ibat(n, half) => write!(f, "IBAT{n}{}", half.suffix()),
            Self::Dbat(n, half) => write!(f, "DBAT{n}{}", half.suffix()),
            Self::Gpr(n) => write!(f, "GPR{n:02}"),
            Self::Sr(n) => write!(f, "SR{n:02}"),
            Self::IntcPending => write!(f, "INTC_PENDING"),
            Self::IntcEnabled => write!(f, "INTC_ENABLED"),
            Self::IntcMasterEnable => write!(f, "INTC_ME"),
            Self::IntcHwIrqEnable => write!(f, "INTC_HIE"),
            Self::ConsoleIrqStatus => write!(f, "CON_ISR"),
            Self::ConsoleIrqEnable => write!(f, "CON_IER"),
        }
    }
}

/// One of the byte-stream peripherals bridged to a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peripheral {
    /// Console UART.
    Console,
    /// Debug requester channel.
    Debug,
}

impl Peripheral {
    /// Both peripherals, in service order.
    pub const ALL: [Self; 2] = [Self::Console, Self::Debug];

    /// Work bit reported by the poller when this peripheral has input pending.
    pub const fn work_bit(self) -> u64 {
        match self {
            Self::Console => 0x1,
            Self::Debug => 0x2,
        }
    }

    /// Position in [`Peripheral::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Console => 0,
            Self::Debug => 1,
        }
    }
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "Console UART"),
            Self::Debug => write!(f, "Debug requester"),
        }
    }
}
