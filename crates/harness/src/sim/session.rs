//! Run session: start-up, the cycle loop and the exit path.
//!
//! A session owns everything that outlives a single cycle but isn't model state: the
//! configuration, the save-file generation counter and the request flags an operator
//! raises from outside the loop.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::checker::{Checker, ReferenceInterpreter};
use crate::common::{ImportError, Reg, SaveError};
use crate::config::Config;
use crate::io::IoMux;
use crate::model::{ArchAccess, FAULT_SYSCALL, HardwareModel};
use crate::sim::dump::RegisterDump;
use crate::sim::requests::RequestFlags;
use crate::sim::testbench::Testbench;
use crate::state::{ImportReport, restore_file, save_file};
use crate::stats::RunStats;

/// Harness context for one run.
#[derive(Debug)]
pub struct Session {
    config: Config,
    requests: RequestFlags,
    save_generation: u32,
}

impl Session {
    /// Creates a session.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            requests: RequestFlags::new(),
            save_generation: 0,
        }
    }

    /// The session configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Wraps `model` in a testbench whose peripherals listen as configured.
    pub fn testbench<M: HardwareModel>(&self, model: M) -> Testbench<M> {
        let io = IoMux::new(&self.config.io, &self.config.run.initial_string);
        Testbench::new(model, io)
    }

    /// A handle for raising requests from another thread or a signal handler.
    pub fn requests(&self) -> RequestFlags {
        self.requests.clone()
    }

    /// Path for the next save: the base name first, then `name.1`, `name.2`, ...
    pub fn next_save_path(&mut self) -> PathBuf {
        let base = &self.config.run.save_path;
        let path = if self.save_generation == 0 {
            base.clone()
        } else {
            let mut name = OsString::from(base.as_os_str());
            name.push(format!(".{}", self.save_generation));
            PathBuf::from(name)
        };
        self.save_generation += 1;
        path
    }

    /// Dumps registers and saves a snapshot to the next generation path.
    ///
    /// # Errors
    ///
    /// Returns the save failure; the generation counter still advances.
    pub fn save_state<M: ArchAccess + ?Sized>(
        &mut self,
        model: &M,
        cycle: u64,
    ) -> Result<PathBuf, SaveError> {
        println!("{}", RegisterDump::capture(model, cycle));
        let path = self.next_save_path();
        save_file(&path, model)?;
        info!("State save success");
        Ok(path)
    }

    fn save_logged<M: ArchAccess + ?Sized>(&mut self, model: &M, cycle: u64) {
        if let Err(e) = self.save_state(model, cycle) {
            error!("State save FAILED: {e}");
        }
    }

    /// Resets the model and applies start-up settings.
    ///
    /// In order: signal hookup (unix), reset, DIP switches, PC override (current PC only),
    /// snapshot restore.
    ///
    /// # Errors
    ///
    /// A failed restore. The model then holds whatever was applied before the failure and
    /// should not be run without the operator knowing.
    pub fn start<M: HardwareModel>(
        &mut self,
        tb: &mut Testbench<M>,
    ) -> Result<Option<ImportReport>, ImportError> {
        #[cfg(unix)]
        if let Err(e) = crate::sim::signals::install(&self.requests) {
            warn!("Can't install SIGUSR1/SIGUSR2 handlers: {e}");
        }

        let run = &self.config.run;
        tb.reset();

        if let Some(sw) = run.dip_switches {
            tb.model_mut().set_gpio(sw);
        }
        if let Some(pc) = run.override_pc {
            info!("Overriding initial PC to {pc:#010x}");
            tb.model_mut().write_reg(Reg::CurrentPc, u64::from(pc));
        }

        let Some(path) = &run.restore_path else {
            return Ok(None);
        };
        let result = restore_file(path, tb.model_mut());
        match &result {
            Ok(_) => info!("State restore success"),
            Err(e) => error!("State restore FAILED: {e}"),
        }
        println!("{}", RegisterDump::capture(tb.model(), tb.tickcount()));
        result.map(Some)
    }

    /// Starts and runs the model until it finishes, hits the cycle limit or is stopped.
    ///
    /// # Errors
    ///
    /// A failed start-up restore; the loop is not entered.
    pub fn run<M: HardwareModel>(&mut self, tb: &mut Testbench<M>) -> Result<RunStats, ImportError> {
        let _ = self.start(tb)?;
        let stats = self.run_loop(tb, |_, _| {});
        self.finish_run(tb, &stats);
        Ok(stats)
    }

    /// Like [`run`](Self::run), with every cycle checked against a reference.
    ///
    /// When `checker.enabled` is off this is a plain run: `checker` is never stepped and
    /// the returned stats carry no checker totals.
    ///
    /// # Errors
    ///
    /// A failed start-up restore; the loop is not entered.
    pub fn run_checked<M, I>(
        &mut self,
        tb: &mut Testbench<M>,
        checker: &mut Checker<I>,
    ) -> Result<RunStats, ImportError>
    where
        M: HardwareModel,
        I: ReferenceInterpreter,
    {
        if !self.config.checker.enabled {
            info!("Checker disabled, running unchecked");
            return self.run(tb);
        }
        let _ = self.start(tb)?;
        let mut stats = self.run_loop(tb, |model, cycle| {
            let _ = checker.check(model, cycle);
        });
        stats.checker = Some(checker.stats());
        self.finish_run(tb, &stats);
        Ok(stats)
    }

    /// The cycle loop proper. Assumes [`start`](Self::start) has run and leaves the exit
    /// report to the caller.
    ///
    /// Per cycle: tick (with I/O), commit traces, `on_cycle`. Requests raised mid-run
    /// break out of the inner loop and are serviced before resuming.
    pub fn run_loop<M, F>(&mut self, tb: &mut Testbench<M>, mut on_cycle: F) -> RunStats
    where
        M: HardwareModel,
        F: FnMut(&M, u64),
    {
        let mut stats = RunStats::new();
        let limit = self.config.run.cycle_limit;

        loop {
            while !tb.done() && tb.tickcount() < limit {
                tb.tick();
                self.trace_commit(tb.model());
                on_cycle(tb.model(), tb.tickcount());
                if self.requests.pending() != 0 {
                    break;
                }
            }

            let requests = self.requests.take();
            if requests & RequestFlags::DUMP_REGS != 0 {
                println!("{}", RegisterDump::capture(tb.model(), tb.tickcount()));
            }
            if requests & RequestFlags::SAVE_STATE != 0 {
                self.save_logged(tb.model(), tb.tickcount());
            }
            if requests & RequestFlags::STOP != 0 {
                info!("Stop requested at cycle {}", tb.tickcount());
                break;
            }
            if tb.done() || tb.tickcount() >= limit {
                break;
            }
        }

        stats.finish(tb.tickcount(), tb.model().counters());
        stats
    }

    /// Exit path: summary line, statistics table (with checker totals), register dump and
    /// the optional save.
    fn finish_run<M: HardwareModel>(&mut self, tb: &Testbench<M>, stats: &RunStats) {
        println!("{stats}");
        stats.print();
        println!("{}", RegisterDump::capture(tb.model(), tb.tickcount()));
        if self.config.run.save_at_exit {
            self.save_logged(tb.model(), tb.tickcount());
        }
    }

    fn trace_commit<M: HardwareModel>(&self, model: &M) {
        let trace = self.config.trace;
        if !trace.branches && !trace.syscalls {
            return;
        }
        let commit = model.commit();
        if trace.branches {
            if let Some(target) = commit.redirect {
                println!("{target:08x}");
            }
        }
        if trace.syscalls && commit.valid && commit.fault == FAULT_SYSCALL {
            let gpr = |n| model.read_reg(Reg::Gpr(n)) as u32;
            println!(
                "+++ STRACE PC {:08x}: sc({:4}): args={:08x} {:08x} {:08x} {:08x}",
                commit.pc,
                gpr(0),
                gpr(3),
                gpr(4),
                gpr(5),
                gpr(6)
            );
        }
    }
}
