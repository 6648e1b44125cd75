use mockall::mock;
use mrsim_core::checker::{ReferenceInterpreter, Retired, ShadowState};

mock! {
    pub Interpreter {}
    impl ReferenceInterpreter for Interpreter {
        fn set_log_mask(&mut self, mask: u32);
        fn step(&mut self, state: &mut ShadowState, retired: &Retired);
    }
}

/// Interpreter backed by a closure.
pub struct FnInterpreter<F>(pub F);

impl<F: FnMut(&mut ShadowState, &Retired)> ReferenceInterpreter for FnInterpreter<F> {
    fn step(&mut self, state: &mut ShadowState, retired: &Retired) {
        (self.0)(state, retired);
    }
}

/// Executes `addi rD, rA, SIMM` and `lwz rD, d(rA)` (from the forwarded read data);
/// everything else is a no-op.
pub fn tiny_ppc() -> FnInterpreter<impl FnMut(&mut ShadowState, &Retired)> {
    FnInterpreter(|state: &mut ShadowState, retired: &Retired| {
        let op = retired.instr >> 26;
        let rd = ((retired.instr >> 21) & 0x1F) as usize;
        let ra = ((retired.instr >> 16) & 0x1F) as usize;
        let simm = retired.instr as u16 as i16 as i32 as u32;
        match op {
            14 => {
                let base = if ra == 0 { 0 } else { state.gpr[ra] };
                state.gpr[rd] = base.wrapping_add(simm);
            }
            32 => state.gpr[rd] = retired.read_data as u32,
            _ => {}
        }
        state.pc = retired.pc.wrapping_add(4);
    })
}

/// `addi rD, rA, simm`.
pub fn addi(rd: u32, ra: u32, simm: i16) -> u32 {
    (14 << 26) | (rd << 21) | (ra << 16) | u32::from(simm as u16)
}

/// `lwz rD, d(rA)`.
pub fn lwz(rd: u32, ra: u32, d: i16) -> u32 {
    (32 << 26) | (rd << 21) | (ra << 16) | u32::from(d as u16)
}

/// `mftb rD`.
pub fn mftb(rd: u32) -> u32 {
    0x7C0C_42E6 | (rd << 21)
}
