//! # Session Tests
//!
//! Reset sequencing, start-up settings, the run loop, requests and save generations.

use std::io::Write;
use std::net::TcpStream;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use mrsim_core::checker::Checker;
use mrsim_core::common::{ImportError, Peripheral, Reg};
use mrsim_core::model::{ArchAccess, FAULT_SYSCALL};
use mrsim_core::sim::RequestFlags;
use mrsim_core::state::{Chunk, restore_file};
use mrsim_core::{ArchState, Session};

use crate::common::harness::{TestContext, encode, init_tracing, quiet_config, scalar};
use crate::common::mocks::interpreter::{addi, tiny_ppc};
use crate::common::mocks::model::{MockModel, commit, gpr_port, idle_ports, port_at};

fn context_with(edit: impl FnOnce(&mut mrsim_core::Config)) -> TestContext {
    let mut config = quiet_config();
    edit(&mut config);
    TestContext::with_config(config)
}

// ══════════════════════════════════════════════════════════
// Testbench
// ══════════════════════════════════════════════════════════

#[test]
fn test_reset_holds_four_cycles_without_io() {
    let mut ctx = context_with(|c| c.run.initial_string = "x".to_string());
    ctx.tb.reset();

    assert_eq!(ctx.tb.tickcount(), 4);
    assert_eq!(ctx.model().reset_cycles, 4);
    assert!(!ctx.model().reset);
    assert!(ctx.model().received[0].is_empty());
}

#[test]
fn test_tick_services_io_between_edges() {
    let mut ctx = context_with(|c| c.run.initial_string = "x".to_string());
    ctx.tb.tick();
    assert_eq!(ctx.tb.tickcount(), 1);
    assert_eq!(ctx.model().received[0], b"x");
    assert!(!ctx.model().clock);
}

#[test]
fn test_session_testbench_listens_on_configured_sockets() {
    init_tracing();
    let mut config = quiet_config();
    config.io.bind_address = "127.0.0.1".to_string();
    config.io.console_port = 0;
    config.io.debug_port = 0;
    let model = MockModel::with_layout(config.memory.clone());
    let session = Session::new(config);
    let mut tb = session.testbench(model);

    let console = tb.io().local_addr(Peripheral::Console).expect("console listening");
    let debug = tb.io().local_addr(Peripheral::Debug).expect("debug listening");
    assert!(console.ip().is_loopback());
    assert_ne!(console.port(), debug.port());

    let mut client = TcpStream::connect(console).unwrap();
    client.write_all(b"hi").unwrap();
    for _ in 0..2_000 {
        tb.tick();
        if tb.model().received[0].len() == 2 {
            break;
        }
        thread::sleep(Duration::from_millis(1));
    }
    assert!(tb.io().is_connected(Peripheral::Console));
    assert_eq!(tb.model().received[0], b"hi");
}

// ══════════════════════════════════════════════════════════
// Start-up
// ══════════════════════════════════════════════════════════

#[test]
fn test_start_applies_switches_and_pc_override() {
    let mut ctx = context_with(|c| {
        c.run.dip_switches = Some(0xA5);
        c.run.override_pc = Some(0x0000_2000);
    });
    let TestContext { session, tb } = &mut ctx;
    assert!(session.start(tb).unwrap().is_none());

    assert_eq!(ctx.model().gpio, 0xA5);
    assert_eq!(ctx.model().read_reg(Reg::CurrentPc), 0x2000);
    assert_eq!(ctx.model().read_reg(Reg::FetchPc), 0);
}

#[test]
fn test_start_restores_snapshot_after_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boot.arch");
    std::fs::write(&path, encode(&[scalar("PC", 0x100), scalar("GPR01", 0x8000)])).unwrap();

    let mut ctx = context_with(|c| c.run.restore_path = Some(path.clone()));
    let TestContext { session, tb } = &mut ctx;
    let report = session.start(tb).unwrap().unwrap();

    assert_eq!(report.applied, 2);
    assert_eq!(ctx.model().read_reg(Reg::FetchPc), 0x100);
    assert_eq!(ctx.model().read_reg(Reg::Gpr(1)), 0x8000);
}

#[test]
fn test_failed_restore_stops_before_the_first_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cut.arch");
    let mut bytes = encode(&[Chunk::memory(0, &[1; 32])]);
    bytes.truncate(20);
    std::fs::write(&path, bytes).unwrap();

    let mut ctx = context_with(|c| c.run.restore_path = Some(path.clone()));
    let TestContext { session, tb } = &mut ctx;
    let err = session.run(tb).unwrap_err();

    assert!(matches!(err, ImportError::Codec(_)));
    assert_eq!(ctx.tb.tickcount(), 4);
}

// ══════════════════════════════════════════════════════════
// Run loop
// ══════════════════════════════════════════════════════════

#[test]
fn test_run_stops_at_cycle_limit() {
    let mut ctx = context_with(|c| c.run.cycle_limit = 20);
    let TestContext { session, tb } = &mut ctx;
    let stats = session.run(tb).unwrap();

    assert_eq!(stats.cycles, 20);
    assert_eq!(ctx.model().cycles, 16);
    assert_eq!(stats.stall_cycles, 16);
    assert_eq!(
        stats.to_string(),
        "Complete:  Committed 0 instructions, 16 stall cycles, 20 cycles total"
    );
}

#[test]
fn test_run_stops_when_model_finishes() {
    let mut ctx = TestContext::new();
    ctx.model_mut().finish_at = Some(3);
    for pc in [0x100, 0x104, 0x108] {
        ctx.model_mut().push_commit(commit(pc, 0x6000_0000, idle_ports()));
    }
    let TestContext { session, tb } = &mut ctx;
    let stats = session.run(tb).unwrap();

    assert_eq!(stats.cycles, 7);
    assert_eq!(stats.instructions, 3);
    assert!(stats.checker.is_none());
    assert!(stats.passed());
}

#[test]
fn test_run_checked_counts_and_flags_mismatches() {
    let config = {
        let mut c = quiet_config();
        c.run.cycle_limit = 10;
        c.checker.enabled = true;
        c
    };
    let mut checker = Checker::new(tiny_ppc(), &config.checker);
    let mut ctx = TestContext::with_config(config);
    ctx.model_mut()
        .push_commit(commit(0x100, addi(3, 0, 5), port_at(0, gpr_port(3, 5))));
    ctx.model_mut()
        .push_commit(commit(0x104, addi(4, 3, 1), port_at(0, gpr_port(4, 7))));

    let TestContext { session, tb } = &mut ctx;
    let stats = session.run_checked(tb, &mut checker).unwrap();
    let checked = stats.checker.unwrap();

    assert_eq!(checked.checked, 2);
    assert_eq!(checked.mismatches, 1);
    assert!(!stats.passed());
    // The first commit retired into the register file before the second was checked.
    assert_eq!(ctx.model().read_reg(Reg::Gpr(3)), 5);
}

#[test]
fn test_run_checked_with_checker_disabled_is_a_plain_run() {
    let config = {
        let mut c = quiet_config();
        c.run.cycle_limit = 10;
        c.checker.enabled = false;
        c
    };
    let mut checker = Checker::new(tiny_ppc(), &config.checker);
    let mut ctx = TestContext::with_config(config);
    ctx.model_mut()
        .push_commit(commit(0x100, addi(3, 0, 5), port_at(0, gpr_port(3, 9))));

    let TestContext { session, tb } = &mut ctx;
    let stats = session.run_checked(tb, &mut checker).unwrap();

    assert_eq!(stats.instructions, 1);
    assert!(stats.checker.is_none());
    assert!(stats.passed());
    assert_eq!(checker.stats().checked, 0);
}

#[test]
fn test_exit_report_carries_checker_verdict() {
    let config = {
        let mut c = quiet_config();
        c.run.cycle_limit = 10;
        c.checker.enabled = true;
        c
    };
    let mut checker = Checker::new(tiny_ppc(), &config.checker);
    let mut ctx = TestContext::with_config(config);
    ctx.model_mut()
        .push_commit(commit(0x100, addi(3, 0, 5), port_at(0, gpr_port(3, 9))));

    let TestContext { session, tb } = &mut ctx;
    let stats = session.run_checked(tb, &mut checker).unwrap();

    let mut out = Vec::new();
    stats.write_report(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("CHECKER"));
    assert!(report.contains("  checked                1\n"));
    assert!(report.contains("  mismatches             1\n"));
    assert!(report.contains("  result                 FAIL\n"));
}

#[test]
fn test_unchecked_report_has_no_checker_block() {
    let mut ctx = context_with(|c| c.run.cycle_limit = 6);
    let TestContext { session, tb } = &mut ctx;
    let stats = session.run(tb).unwrap();

    let mut out = Vec::new();
    stats.write_report(&mut out).unwrap();
    let report = String::from_utf8(out).unwrap();
    assert!(report.contains("sim_cycles               6\n"));
    assert!(!report.contains("CHECKER"));
}

#[test]
fn test_syscall_and_branch_traces_do_not_disturb_the_run() {
    let mut ctx = context_with(|c| {
        c.run.cycle_limit = 8;
        c.trace.branches = true;
        c.trace.syscalls = true;
    });
    let mut sc = commit(0x300, 0x4400_0002, idle_ports());
    sc.fault = FAULT_SYSCALL;
    let mut branch = commit(0x304, 0x4800_0010, idle_ports());
    branch.redirect = Some(0x314);
    ctx.model_mut().push_commit(sc);
    ctx.model_mut().push_commit(branch);

    let TestContext { session, tb } = &mut ctx;
    let stats = session.run(tb).unwrap();
    assert_eq!(stats.cycles, 8);
    assert_eq!(stats.instructions, 2);
}

// ══════════════════════════════════════════════════════════
// Requests and saves
// ══════════════════════════════════════════════════════════

#[test]
fn test_save_generations() {
    let mut config = quiet_config();
    config.run.save_path = PathBuf::from("/tmp/state.bin");
    let mut session = Session::new(config);

    assert_eq!(session.next_save_path(), PathBuf::from("/tmp/state.bin"));
    assert_eq!(session.next_save_path(), PathBuf::from("/tmp/state.bin.1"));
    assert_eq!(session.next_save_path(), PathBuf::from("/tmp/state.bin.2"));
}

#[test]
fn test_save_request_is_serviced_between_cycles_and_run_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("dump.bin");
    let mut ctx = context_with(|c| {
        c.run.cycle_limit = 12;
        c.run.save_path = base.clone();
    });
    ctx.session.requests().request(RequestFlags::SAVE_STATE | RequestFlags::DUMP_REGS);

    let TestContext { session, tb } = &mut ctx;
    let stats = session.run(tb).unwrap();

    assert!(base.exists());
    assert_eq!(stats.cycles, 12);
    assert_eq!(session.requests().pending(), 0);
}

#[test]
fn test_stop_request_ends_the_run_early() {
    let mut ctx = context_with(|c| c.run.cycle_limit = 1_000);
    ctx.session.requests().request(RequestFlags::STOP);

    let TestContext { session, tb } = &mut ctx;
    let stats = session.run(tb).unwrap();
    assert_eq!(stats.cycles, 5);
}

#[test]
fn test_save_at_exit_writes_a_restorable_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("exit.bin");
    let mut ctx = context_with(|c| {
        c.run.cycle_limit = 6;
        c.run.save_at_exit = true;
        c.run.save_path = base.clone();
    });
    ctx.model_mut().arch.write_reg(Reg::Lr, 0xFEED);

    let TestContext { session, tb } = &mut ctx;
    let _ = session.run(tb).unwrap();

    let mut restored = ArchState::new(ctx.tb.model().arch.memory_layout().clone());
    let _ = restore_file(&base, &mut restored).unwrap();
    assert_eq!(restored.read_reg(Reg::Lr), 0xFEED);
}

#[test]
fn test_second_save_uses_next_generation() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = quiet_config();
    config.run.save_path = dir.path().join("s.bin");
    let mut session = Session::new(config);
    let state = ArchState::new(crate::common::mocks::model::small_layout());

    let first = session.save_state(&state, 1).unwrap();
    let second = session.save_state(&state, 2).unwrap();
    assert_eq!(first, dir.path().join("s.bin"));
    assert_eq!(second, dir.path().join("s.bin.1"));
    assert!(second.exists());

    // A failed save still advances the generation.
    let mut config = quiet_config();
    config.run.save_path = dir.path().join("missing/s.bin");
    let mut failing = Session::new(config);
    assert!(failing.save_state(&state, 3).is_err());
    assert_eq!(failing.next_save_path(), dir.path().join("missing/s.bin.1"));
}
