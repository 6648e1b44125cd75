//! # Configuration Tests
//!
//! Defaults, partial JSON overrides and load failures.

use std::io::Write;
use std::path::PathBuf;

use pretty_assertions::assert_eq;

use mrsim_core::common::ConfigError;
use mrsim_core::config::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.io.bind_address, "0.0.0.0");
    assert_eq!(config.io.console_port, 2000);
    assert_eq!(config.io.debug_port, 2001);
    assert_eq!(config.io.poll_interval_max, 10_000);
    assert_eq!(config.io.poll_interval_min, 100);
    assert_eq!(config.io.poll_interval_step, 100);
    assert!(config.io.echo_console);
    assert!(!config.checker.enabled);
    assert_eq!(config.checker.timer_source, TimerSource::MemoryResult);
    assert_eq!(config.run.cycle_limit, u64::MAX);
    assert_eq!(config.run.save_path, PathBuf::from("sim_dump.bin"));
    assert!(!config.run.save_at_exit);
    assert_eq!(config.run.override_pc, None);
    assert!(!config.trace.branches);
    assert!(!config.trace.syscalls);
}

#[test]
fn test_default_memory_is_two_16mib_banks() {
    let banks = Config::default().memory.banks;
    assert_eq!(banks.len(), 2);
    assert_eq!((banks[0].base, banks[0].size), (0, 0x0100_0000));
    assert_eq!((banks[1].base, banks[1].size), (0x0100_0000, 0x0100_0000));
}

#[test]
fn test_empty_json_is_all_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.io.console_port, 2000);
    assert_eq!(config.memory, Config::default().memory);
}

#[test]
fn test_partial_override() {
    let config = Config::from_json(
        r#"{
            "io": { "debug_port": 4001, "echo_console": false },
            "checker": { "enabled": true, "log_flags": 5, "timer_source": "Register" },
            "run": { "cycle_limit": 1000, "override_pc": 256, "initial_string": "boot\n" },
            "trace": { "syscalls": true }
        }"#,
    )
    .unwrap();
    assert_eq!(config.io.console_port, 2000);
    assert_eq!(config.io.debug_port, 4001);
    assert!(!config.io.echo_console);
    assert!(config.checker.enabled);
    assert_eq!(config.checker.log_flags, 5);
    assert_eq!(config.checker.timer_source, TimerSource::Register);
    assert_eq!(config.run.cycle_limit, 1000);
    assert_eq!(config.run.override_pc, Some(0x100));
    assert_eq!(config.run.initial_string, "boot\n");
    assert!(config.trace.syscalls);
    assert!(!config.trace.branches);
}

#[test]
fn test_bad_json_is_a_parse_error() {
    let err = Config::from_json(r#"{ "io": { "console_port": "nope" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "run": {{ "save_at_exit": true }} }}"#).unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert!(config.run.save_at_exit);
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
