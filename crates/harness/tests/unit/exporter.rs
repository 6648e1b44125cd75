//! # Snapshot Export Tests
//!
//! Coverage of the emitted chunk set and save/restore symmetry.

use std::collections::HashSet;

use pretty_assertions::assert_eq;

use mrsim_core::common::{BatHalf, PackedFlags, Reg};
use mrsim_core::model::{ArchAccess, ArchState};
use mrsim_core::state::{ChunkReader, ChunkTag, export_snapshot, restore_file, save_file, snapshot_chunks};

use crate::common::mocks::model::small_layout;

fn populated() -> ArchState {
    let mut state = ArchState::new(small_layout());
    state.write_reg(Reg::CurrentPc, 0x0000_3000);
    state.write_reg(Reg::FetchPc, 0x0000_3000);
    state.write_reg(Reg::CurrentMsr, 0x0000_b032);
    state.write_reg(Reg::FetchMsr, 0x0000_b032);
    state.write_reg(Reg::Lr, 0x0000_1234);
    state.write_reg(Reg::XerCr, PackedFlags::new(0xA000_0011, 0x4400_0022).0);
    state.write_reg(Reg::Sprg(3), 0x33);
    state.write_reg(Reg::Ibat(2, BatHalf::Lower), 0x0000_0012);
    state.write_reg(Reg::Sr(15), 0x2000_0f00);
    state.write_reg(Reg::IntcPending, 0x5);
    state.write_reg(Reg::IntcMasterEnable, 1);
    state.write_reg(Reg::IntcHwIrqEnable, 1);
    for n in 0..32u8 {
        state.write_reg(Reg::Gpr(n), u64::from(n) * 0x0101_0101);
    }
    state.bank_mut(0)[0x100..0x104].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    state.bank_mut(1)[0xFFF] = 0x77;
    state
}

#[test]
fn test_every_register_family_is_emitted() {
    let chunks = snapshot_chunks(&populated());
    let tags: Vec<ChunkTag> = chunks.iter().map(|c| c.tag()).collect();

    assert!(!tags.contains(&ChunkTag::Unknown));
    assert_eq!(tags.iter().filter(|t| matches!(t, ChunkTag::Gpr(_))).count(), 32);
    assert_eq!(tags.iter().filter(|t| matches!(t, ChunkTag::Sr(_))).count(), 16);
    assert_eq!(tags.iter().filter(|t| **t == ChunkTag::Memory).count(), 2);

    let names: HashSet<String> = chunks.iter().map(|c| c.name.to_string()).collect();
    assert_eq!(names.len(), chunks.len(), "duplicate chunk names");
}

#[test]
fn test_save_then_restore_reproduces_state() {
    let before = populated();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.arch");

    save_file(&path, &before).unwrap();
    let mut restored = ArchState::new(small_layout());
    let report = restore_file(&path, &mut restored).unwrap();

    assert!(report.unknown.is_empty());
    assert_eq!(report.memory.len(), 2);
    assert_eq!(restored, before);
}

#[test]
fn test_interrupt_controller_is_saved_in_register_layout() {
    let chunks = snapshot_chunks(&populated());
    let value = |n: &str| {
        chunks
            .iter()
            .find(|c| c.name.as_str() == n)
            .map(|c| c.value())
            .unwrap()
    };
    assert_eq!(value("IC_ISR"), 0x50);
    assert_eq!(value("IC_MER"), 0x3);
    assert_eq!(value("XER"), 0xA000_0011);
    assert_eq!(value("CR"), 0x4400_0022);
}

#[test]
fn test_stream_is_aligned() {
    let mut bytes = Vec::new();
    export_snapshot(&mut bytes, &populated()).unwrap();
    assert_eq!(bytes.len() % 8, 0);
    let count = ChunkReader::new(&bytes[..]).map(Result::unwrap).count();
    assert_eq!(count, snapshot_chunks(&populated()).len());
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/state.arch");
    assert!(save_file(&path, &populated()).is_err());
}
