//! Reference interpreter interface.

use crate::checker::shadow::ShadowState;

/// The instruction handed to the reference for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retired {
    /// Address of the instruction.
    pub pc: u32,
    /// Instruction word.
    pub instr: u32,
    /// Value the model's load path returned. The reference performs no memory access;
    /// every load it executes reads this value. Stores are no-ops.
    pub read_data: u64,
}

/// An instruction-set interpreter the checker replays commits on.
///
/// Implementations execute exactly one instruction per [`step`](Self::step), updating
/// `state` in place.
pub trait ReferenceInterpreter {
    /// Sets the interpreter's own diagnostic log mask.
    fn set_log_mask(&mut self, _mask: u32) {}

    /// Executes `retired.instr` at `retired.pc` against `state`.
    fn step(&mut self, state: &mut ShadowState, retired: &Retired);
}

impl<T: ReferenceInterpreter + ?Sized> ReferenceInterpreter for Box<T> {
    fn set_log_mask(&mut self, mask: u32) {
        (**self).set_log_mask(mask);
    }

    fn step(&mut self, state: &mut ShadowState, retired: &Retired) {
        (**self).step(state, retired);
    }
}
