//! In-memory architectural state.
//!
//! `ArchState` holds every field named by [`Reg`] plus zero-filled memory banks sized by
//! a [`MemoryLayout`]. It stands in for a freshly reset model wherever only architectural
//! state matters: decoding a snapshot offline, re-encoding it, or dumping registers.

use crate::common::reg::{BAT_PAIRS, GPR_COUNT, SPRG_COUNT, SR_COUNT};
use crate::common::{BatHalf, Reg};
use crate::model::{ArchAccess, MemoryLayout};

/// Architectural register set and memory of one core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchState {
    current_pc: u64,
    fetch_pc: u64,
    current_msr: u64,
    fetch_msr: u64,
    ctr: u64,
    lr: u64,
    xercr: u64,
    sprg: [u64; SPRG_COUNT],
    srr0: u64,
    srr1: u64,
    dar: u64,
    dsisr: u64,
    dec: u64,
    tb: u64,
    sdr1: u64,
    ibat: [[u64; 2]; BAT_PAIRS],
    dbat: [[u64; 2]; BAT_PAIRS],
    gpr: [u64; GPR_COUNT],
    sr: [u64; SR_COUNT],
    intc_pending: u64,
    intc_enabled: u64,
    intc_me: u64,
    intc_hie: u64,
    con_irq_status: u64,
    con_irq_enable: u64,
    layout: MemoryLayout,
    banks: Vec<Vec<u8>>,
}

const fn half_index(half: BatHalf) -> usize {
    match half {
        BatHalf::Upper => 0,
        BatHalf::Lower => 1,
    }
}

impl ArchState {
    /// Creates a zeroed state with one buffer per bank of `layout`.
    pub fn new(layout: MemoryLayout) -> Self {
        let banks = layout
            .banks
            .iter()
            .map(|bank| vec![0u8; usize::try_from(bank.size).unwrap_or(0)])
            .collect();
        Self {
            current_pc: 0,
            fetch_pc: 0,
            current_msr: 0,
            fetch_msr: 0,
            ctr: 0,
            lr: 0,
            xercr: 0,
            sprg: [0; SPRG_COUNT],
            srr0: 0,
            srr1: 0,
            dar: 0,
            dsisr: 0,
            dec: 0,
            tb: 0,
            sdr1: 0,
            ibat: [[0; 2]; BAT_PAIRS],
            dbat: [[0; 2]; BAT_PAIRS],
            gpr: [0; GPR_COUNT],
            sr: [0; SR_COUNT],
            intc_pending: 0,
            intc_enabled: 0,
            intc_me: 0,
            intc_hie: 0,
            con_irq_status: 0,
            con_irq_enable: 0,
            layout,
            banks,
        }
    }

    fn slot(&mut self, reg: Reg) -> Option<&mut u64> {
        let slot = match reg {
            Reg::CurrentPc => &mut self.current_pc,
            Reg::FetchPc => &mut self.fetch_pc,
            Reg::CurrentMsr => &mut self.current_msr,
            Reg::FetchMsr => &mut self.fetch_msr,
            Reg::Ctr => &mut self.ctr,
            Reg::Lr => &mut self.lr,
            Reg::XerCr => &mut self.xercr,
            Reg::Sprg(n) => self.sprg.get_mut(n as usize)?,
            Reg::Srr0 => &mut self.srr0,
            Reg::Srr1 => &mut self.srr1,
            Reg::Dar => &mut self.dar,
            Reg::Dsisr => &mut self.dsisr,
            Reg::Dec => &mut self.dec,
            Reg::Tb => &mut self.tb,
            Reg::Sdr1 => &mut self.sdr1,
            Reg::Ibat(n, half) => &mut self.ibat.get_mut(n as usize)?[half_index(half)],
            Reg::Dbat(n, half) => &mut self.dbat.get_mut(n as usize)?[half_index(half)],
            Reg::Gpr(n) => self.gpr.get_mut(n as usize)?,
            Reg::Sr(n) => self.sr.get_mut(n as usize)?,
            Reg::IntcPending => &mut self.intc_pending,
            Reg::IntcEnabled => &mut self.intc_enabled,
            Reg::IntcMasterEnable => &mut self.intc_me,
            Reg::IntcHwIrqEnable => &mut self.intc_hie,
            Reg::ConsoleIrqStatus => &mut self.con_irq_status,
            Reg::ConsoleIrqEnable => &mut self.con_irq_enable,
        };
        Some(slot)
    }
}

impl Default for ArchState {
    fn default() -> Self {
        Self::new(MemoryLayout::default())
    }
}

impl ArchAccess for ArchState {
    fn read_reg(&self, reg: Reg) -> u64 {
        match reg {
            Reg::CurrentPc => self.current_pc,
            Reg::FetchPc => self.fetch_pc,
            Reg::CurrentMsr => self.current_msr,
            Reg::FetchMsr => self.fetch_msr,
            Reg::Ctr => self.ctr,
            Reg::Lr => self.lr,
            Reg::XerCr => self.xercr,
            Reg::Sprg(n) => self.sprg.get(n as usize).copied().unwrap_or(0),
            Reg::Srr0 => self.srr0,
            Reg::Srr1 => self.srr1,
            Reg::Dar => self.dar,
            Reg::Dsisr => self.dsisr,
            Reg::Dec => self.dec,
            Reg::Tb => self.tb,
            Reg::Sdr1 => self.sdr1,
            Reg::Ibat(n, half) => self
                .ibat
                .get(n as usize)
                .map_or(0, |pair| pair[half_index(half)]),
            Reg::Dbat(n, half) => self
                .dbat
                .get(n as usize)
                .map_or(0, |pair| pair[half_index(half)]),
            Reg::Gpr(n) => self.gpr.get(n as usize).copied().unwrap_or(0),
            Reg::Sr(n) => self.sr.get(n as usize).copied().unwrap_or(0),
            Reg::IntcPending => self.intc_pending,
            Reg::IntcEnabled => self.intc_enabled,
            Reg::IntcMasterEnable => self.intc_me,
            Reg::IntcHwIrqEnable => self.intc_hie,
            Reg::ConsoleIrqStatus => self.con_irq_status,
            Reg::ConsoleIrqEnable => self.con_irq_enable,
        }
    }

    fn write_reg(&mut self, reg: Reg, val: u64) {
        if let Some(slot) = self.slot(reg) {
            *slot = val;
        }
    }

    fn memory_layout(&self) -> &MemoryLayout {
        &self.layout
    }

    fn bank(&self, index: usize) -> &[u8] {
        self.banks.get(index).map_or(&[][..], Vec::as_slice)
    }

    fn bank_mut(&mut self, index: usize) -> &mut [u8] {
        match self.banks.get_mut(index) {
            Some(bank) => bank,
            None => &mut [],
        }
    }
}
