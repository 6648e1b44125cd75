//! Clocking wrapper around the hardware model.

use std::fmt;

use crate::io::IoMux;
use crate::model::HardwareModel;

/// Cycles reset is held for.
const RESET_TICKS: u32 = 4;

/// Owns the model, the cycle counter and the peripheral I/O.
pub struct Testbench<M> {
    model: M,
    io: IoMux,
    tickcount: u64,
}

impl<M: HardwareModel> Testbench<M> {
    /// Wraps a model. The model is not reset.
    pub const fn new(model: M, io: IoMux) -> Self {
        Self {
            model,
            io,
            tickcount: 0,
        }
    }

    /// Holds reset for four cycles. No I/O is serviced while in reset.
    pub fn reset(&mut self) {
        self.model.set_reset(true);
        for _ in 0..RESET_TICKS {
            self.tick_lite();
        }
        self.model.set_reset(false);
    }

    /// One full cycle: rising edge, I/O service, falling edge.
    ///
    /// I/O side effects of this cycle are visible to the model at the falling edge.
    pub fn tick(&mut self) {
        self.tickcount += 1;
        self.model.set_clock(true);
        self.model.eval();
        self.io.service(&mut self.model);
        self.model.set_clock(false);
        self.model.eval();
    }

    /// One cycle without I/O.
    pub fn tick_lite(&mut self) {
        self.tickcount += 1;
        self.model.set_clock(true);
        self.model.eval();
        self.model.set_clock(false);
        self.model.eval();
    }

    /// The model has finished.
    pub fn done(&self) -> bool {
        self.model.finished()
    }

    /// Cycles ticked so far, reset included.
    pub const fn tickcount(&self) -> u64 {
        self.tickcount
    }

    /// The model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// The model, mutably. Only valid between cycles.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Peripheral I/O.
    pub const fn io(&self) -> &IoMux {
        &self.io
    }

    /// Unwraps the model.
    pub fn into_model(self) -> M {
        self.model
    }
}

impl<M> fmt::Debug for Testbench<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Testbench")
            .field("tickcount", &self.tickcount)
            .field("io", &self.io)
            .finish_non_exhaustive()
    }
}
