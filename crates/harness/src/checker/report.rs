//! Mismatch records.

use std::fmt;

/// Primary opcode of the X-form extended group.
const OPCODE_X_FORM: u32 = 31;
/// Extended opcode of `mfspr`.
const XO_MFSPR: u32 = 339;
/// Extended opcode of `mftb`.
const XO_MFTB: u32 = 371;
/// SPR numbers that read the timebase or decrementer.
const TIMER_SPRS: [u32; 3] = [22, 268, 269];

/// Returns `true` if `instr` reads the timebase or decrementer.
///
/// Timer reads are compared against a value the model exposes a few cycles late, so their
/// mismatches are less trustworthy than the rest.
pub const fn reads_timer(instr: u32) -> bool {
    let opcode = instr >> 26;
    let xo = (instr >> 1) & 0x3FF;
    if opcode != OPCODE_X_FORM {
        return false;
    }
    match xo {
        XO_MFTB => true,
        XO_MFSPR => {
            // The SPR field is stored with its two 5-bit halves swapped.
            let raw = (instr >> 11) & 0x3FF;
            let spr = ((raw & 0x1F) << 5) | (raw >> 5);
            spr == TIMER_SPRS[0] || spr == TIMER_SPRS[1] || spr == TIMER_SPRS[2]
        }
        _ => false,
    }
}

/// What differed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchDetail {
    /// A GPR port wrote a different value than the reference produced.
    Gpr {
        /// Destination register.
        reg: u8,
        /// Value the model committed.
        hardware: u32,
        /// Value the reference computed.
        reference: u32,
    },
    /// The XER/CR port disagreed with the reference.
    Flags {
        /// XER unpacked from the model's port.
        hw_xer: u32,
        /// CR from the model's port.
        hw_cr: u32,
        /// Reference XER.
        ref_xer: u32,
        /// Reference CR.
        ref_cr: u32,
    },
}

/// One divergent write-back port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Cycle the instruction committed in.
    pub cycle: u64,
    /// Instruction address.
    pub pc: u32,
    /// Instruction word.
    pub instr: u32,
    /// Write-back port index.
    pub port: usize,
    /// The values involved.
    pub detail: MismatchDetail,
    /// The instruction reads a timer, so the comparison is approximate.
    pub low_confidence: bool,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*** {:08x} (cycle {:>10}) {:08x}:  ", self.pc, self.cycle, self.instr)?;
        match self.detail {
            MismatchDetail::Gpr {
                reg,
                hardware,
                reference,
            } => write!(
                f,
                "GPR{reg:02}: WB {hardware:08x} vs interp {reference:08x} (p{})",
                self.port
            )?,
            MismatchDetail::Flags {
                hw_xer,
                hw_cr,
                ref_xer,
                ref_cr,
            } => write!(
                f,
                "WB XER {hw_xer:08x} CR {hw_cr:08x} vs interp XER {ref_xer:08x} CR {ref_cr:08x}"
            )?,
        }
        if self.low_confidence {
            f.write_str(" [timer]")?;
        }
        Ok(())
    }
}
