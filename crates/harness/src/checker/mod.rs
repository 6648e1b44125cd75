//! Lockstep co-simulation checker.
//!
//! On every cycle in which an instruction commits without a fault, the checker:
//! 1. **Mirrors:** Copies the model's architectural registers into a private
//!    [`ShadowState`], using the commit-time PC and MSR.
//! 2. **Steps:** Runs the committed instruction word on the [`ReferenceInterpreter`], with
//!    the model's load data forwarded as the interpreter's memory read.
//! 3. **Compares:** Walks the write-back ports; every enabled port is diffed against the
//!    reference's value for the same register.
//!
//! Mismatches are logged and counted; they never stop the simulation. Faulting
//! instructions (including interrupts) are not checked.

/// Reference interpreter interface.
pub mod interp;
/// Mismatch records and the timer-read heuristic.
pub mod report;
/// Shadow register state.
pub mod shadow;

use std::fmt;

use tracing::{info, warn};

pub use interp::{ReferenceInterpreter, Retired};
pub use report::{Mismatch, MismatchDetail, reads_timer};
pub use shadow::ShadowState;

use crate::common::{PackedFlags, Reg};
use crate::config::{CheckerConfig, TimerSource};
use crate::model::{Commit, HardwareModel, PortKind};

/// Running totals for a checked run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckerStats {
    /// Instructions replayed on the reference.
    pub checked: u64,
    /// Cycles with at least one mismatching port.
    pub mismatched_cycles: u64,
    /// Mismatching ports in total.
    pub mismatches: u64,
    /// Mismatches on timer-reading instructions.
    pub low_confidence: u64,
}

impl CheckerStats {
    /// No mismatches other than low-confidence ones were seen.
    pub const fn passed(&self) -> bool {
        self.mismatches == self.low_confidence
    }
}

/// Outcome of checking one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// Nothing committed cleanly this cycle.
    NotChecked,
    /// Every enabled port matched.
    Match,
    /// At least one port differed.
    Mismatch(Vec<Mismatch>),
}

/// Checker over a reference interpreter.
pub struct Checker<I> {
    interp: I,
    timer_source: TimerSource,
    shadow: ShadowState,
    stats: CheckerStats,
}

impl<I: ReferenceInterpreter> Checker<I> {
    /// Creates a checker and passes the configured log mask to the interpreter.
    pub fn new(mut interp: I, config: &CheckerConfig) -> Self {
        info!("Initialising checker (log flags {:#010x})", config.log_flags);
        interp.set_log_mask(config.log_flags);
        Self {
            interp,
            timer_source: config.timer_source,
            shadow: ShadowState::default(),
            stats: CheckerStats::default(),
        }
    }

    /// Checks the cycle the model just evaluated.
    ///
    /// # Arguments
    ///
    /// * `model` - The model, read after the cycle's falling edge.
    /// * `cycle` - Cycle number used in diagnostics.
    pub fn check<M: HardwareModel + ?Sized>(&mut self, model: &M, cycle: u64) -> CheckResult {
        let commit = model.commit();
        if !commit.is_clean() {
            return CheckResult::NotChecked;
        }

        self.mirror(model, &commit);
        let retired = Retired {
            pc: commit.pc,
            instr: commit.instr,
            read_data: commit.load_data,
        };
        self.interp.step(&mut self.shadow, &retired);
        self.stats.checked += 1;
        #[cfg(feature = "commit-log")]
        tracing::trace!(
            cycle,
            pc = format_args!("{:08x}", commit.pc),
            instr = format_args!("{:08x}", commit.instr),
            "Checked commit"
        );

        let mismatches = self.compare(&commit, cycle);
        if mismatches.is_empty() {
            return CheckResult::Match;
        }
        self.stats.mismatched_cycles += 1;
        for m in &mismatches {
            self.stats.mismatches += 1;
            if m.low_confidence {
                self.stats.low_confidence += 1;
            }
            warn!("{m}");
        }
        CheckResult::Mismatch(mismatches)
    }

    fn mirror<M: HardwareModel + ?Sized>(&mut self, model: &M, commit: &Commit) {
        let s = &mut self.shadow;
        for (n, slot) in s.gpr.iter_mut().enumerate() {
            *slot = model.read_reg(Reg::Gpr(n as u8)) as u32;
        }
        s.pc = commit.pc;
        s.msr = commit.msr;
        s.ctr = model.read_reg(Reg::Ctr) as u32;
        s.lr = model.read_reg(Reg::Lr) as u32;
        let flags = PackedFlags(model.read_reg(Reg::XerCr));
        s.xer = flags.xer();
        s.cr = flags.cr();
        s.tb = match self.timer_source {
            // The register lags what the instruction saw; use the value the memory stage
            // carried instead, replicated into both halves.
            TimerSource::MemoryResult => {
                let r = u64::from(commit.result);
                r | (r << 32)
            }
            TimerSource::Register => model.read_reg(Reg::Tb),
        };
        s.dec = model.read_reg(Reg::Dec) as u32;
        for (n, slot) in s.sprg.iter_mut().enumerate() {
            *slot = model.read_reg(Reg::Sprg(n as u8)) as u32;
        }
        s.srr0 = model.read_reg(Reg::Srr0) as u32;
        s.srr1 = model.read_reg(Reg::Srr1) as u32;
        s.dar = model.read_reg(Reg::Dar) as u32;
        s.dsisr = model.read_reg(Reg::Dsisr) as u32;
    }

    fn compare(&self, commit: &Commit, cycle: u64) -> Vec<Mismatch> {
        let low_confidence = reads_timer(commit.instr);
        let reference = PackedFlags::new(self.shadow.xer, self.shadow.cr);
        let mut out = Vec::new();

        for (port, wb) in commit.ports.iter().enumerate() {
            if !wb.enable {
                continue;
            }
            let detail = match wb.kind {
                PortKind::Gpr => {
                    let hardware = wb.value as u32;
                    let reference = self
                        .shadow
                        .gpr
                        .get(usize::from(wb.reg))
                        .copied()
                        .unwrap_or_default();
                    if hardware == reference {
                        continue;
                    }
                    MismatchDetail::Gpr {
                        reg: wb.reg,
                        hardware,
                        reference,
                    }
                }
                PortKind::XerCr => {
                    let hardware = PackedFlags(wb.value);
                    if hardware.xer() == reference.xer() && hardware.cr() == reference.cr() {
                        continue;
                    }
                    MismatchDetail::Flags {
                        hw_xer: hardware.xer(),
                        hw_cr: hardware.cr(),
                        ref_xer: self.shadow.xer,
                        ref_cr: self.shadow.cr,
                    }
                }
            };
            out.push(Mismatch {
                cycle,
                pc: commit.pc,
                instr: commit.instr,
                port,
                detail,
                low_confidence,
            });
        }
        out
    }

    /// Totals so far.
    pub const fn stats(&self) -> CheckerStats {
        self.stats
    }

    /// Shadow state after the most recent step.
    pub const fn shadow(&self) -> &ShadowState {
        &self.shadow
    }

    /// The wrapped interpreter.
    pub const fn interpreter(&self) -> &I {
        &self.interp
    }

    /// The wrapped interpreter, mutably.
    pub fn interpreter_mut(&mut self) -> &mut I {
        &mut self.interp
    }
}

impl<I> fmt::Debug for Checker<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("timer_source", &self.timer_source)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
