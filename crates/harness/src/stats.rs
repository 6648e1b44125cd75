//! Run statistics and the exit summary.
//!
//! Tracks the outcome of one simulation run. It provides:
//! 1. **Counts:** Total cycles plus the model's committed-instruction and stall counters.
//! 2. **Checker totals:** Checked instructions and mismatches, when the checker ran.
//! 3. **Rates:** Host time and derived simulation speed for the printed report.

use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::checker::CheckerStats;
use crate::model::Counters;

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunStats {
    start_time: Instant,
    elapsed: Option<Duration>,
    /// Cycles ticked, reset cycles included.
    pub cycles: u64,
    /// Instructions the model committed.
    pub instructions: u64,
    /// Cycles the model's write-back stage stalled.
    pub stall_cycles: u64,
    /// Checker totals, if the checker ran.
    pub checker: Option<CheckerStats>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    /// Starts the host clock.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed: None,
            cycles: 0,
            instructions: 0,
            stall_cycles: 0,
            checker: None,
        }
    }

    /// Records the final counters and stops the host clock.
    pub fn finish(&mut self, cycles: u64, counters: Counters) {
        self.cycles = cycles;
        self.instructions = counters.instructions;
        self.stall_cycles = counters.stall_cycles;
        self.elapsed = Some(self.start_time.elapsed());
    }

    /// Host time spent, up to [`finish`](Self::finish) if it was called.
    pub fn host_time(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.start_time.elapsed())
    }

    /// The run had no definite checker mismatches (or no checker).
    pub fn passed(&self) -> bool {
        self.checker.is_none_or(|c| c.passed())
    }

    /// Prints the statistics table to stdout.
    ///
    /// The one-line `Complete:` summary is the `Display` form.
    pub fn print(&self) {
        let mut out = io::stdout().lock();
        if let Err(e) = self.write_report(&mut out) {
            warn!("Can't print run statistics: {e}");
        }
    }

    /// Writes the statistics table, including checker totals and verdict when present.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let seconds = self.host_time().as_secs_f64().max(f64::EPSILON);
        let cyc = self.cycles.max(1);
        let khz = (self.cycles as f64 / seconds) / 1000.0;
        let ipc = self.instructions as f64 / cyc as f64;

        writeln!(out, "\n==========================================================")?;
        writeln!(out, "MR CORE SIMULATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        writeln!(out, "host_seconds             {seconds:.4} s")?;
        writeln!(out, "sim_cycles               {}", self.cycles)?;
        writeln!(out, "sim_freq                 {khz:.2} kHz")?;
        writeln!(out, "sim_insts                {}", self.instructions)?;
        writeln!(out, "sim_stalls               {}", self.stall_cycles)?;
        writeln!(out, "sim_ipc                  {ipc:.4}")?;
        if let Some(c) = &self.checker {
            writeln!(out, "----------------------------------------------------------")?;
            writeln!(out, "CHECKER")?;
            writeln!(out, "  checked                {}", c.checked)?;
            writeln!(out, "  mismatched_cycles      {}", c.mismatched_cycles)?;
            writeln!(out, "  mismatches             {}", c.mismatches)?;
            writeln!(out, "  low_confidence         {}", c.low_confidence)?;
            writeln!(
                out,
                "  result                 {}",
                if c.passed() { "PASS" } else { "FAIL" }
            )?;
        }
        writeln!(out, "==========================================================")
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Complete:  Committed {} instructions, {} stall cycles, {} cycles total",
            self.instructions, self.stall_cycles, self.cycles
        )
    }
}
