//! Register dump.

use std::fmt;

use crate::common::reg::GPR_COUNT;
use crate::common::{PackedFlags, Reg};
use crate::model::ArchAccess;

/// Snapshot of the registers an operator usually wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDump {
    /// Cycle the dump was taken at.
    pub cycle: u64,
    /// Current PC.
    pub pc: u32,
    /// Current MSR.
    pub msr: u32,
    /// Link register.
    pub lr: u32,
    /// Count register.
    pub ctr: u32,
    /// XER.
    pub xer: u32,
    /// Condition register.
    pub cr: u32,
    /// Save/restore register 0.
    pub srr0: u32,
    /// Save/restore register 1.
    pub srr1: u32,
    /// Data address register.
    pub dar: u32,
    /// DSISR.
    pub dsisr: u32,
    /// General-purpose registers.
    pub gpr: [u32; GPR_COUNT],
}

impl RegisterDump {
    /// Reads the dump from any register surface.
    pub fn capture<M: ArchAccess + ?Sized>(model: &M, cycle: u64) -> Self {
        let r = |reg| model.read_reg(reg) as u32;
        let flags = PackedFlags(model.read_reg(Reg::XerCr));
        let mut gpr = [0; GPR_COUNT];
        for (n, slot) in gpr.iter_mut().enumerate() {
            *slot = r(Reg::Gpr(n as u8));
        }
        Self {
            cycle,
            pc: r(Reg::CurrentPc),
            msr: r(Reg::CurrentMsr),
            lr: r(Reg::Lr),
            ctr: r(Reg::Ctr),
            xer: flags.xer(),
            cr: flags.cr(),
            srr0: r(Reg::Srr0),
            srr1: r(Reg::Srr1),
            dar: r(Reg::Dar),
            dsisr: r(Reg::Dsisr),
            gpr,
        }
    }
}

const RULE: &str =
    "--------------------------------------------------------------------------------";

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "Cycle {}:\tPC {:08x}  MSR {:08x}  LR {:08x}  CTR {:08x}",
            self.cycle, self.pc, self.msr, self.lr, self.ctr
        )?;
        writeln!(
            f,
            "XER {:08x}  CR {:08x}  SRR0 {:08x}  SRR1 {:08x}  DAR {:08x}  DSISR {:08x}",
            self.xer, self.cr, self.srr0, self.srr1, self.dar, self.dsisr
        )?;
        for (row, regs) in self.gpr.chunks(8).enumerate() {
            write!(f, "GPR{:02}\t", row * 8)?;
            for v in regs {
                write!(f, "{v:08x} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "{RULE}")
    }
}
