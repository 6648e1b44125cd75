//! Snapshot import (restore path).
//!
//! Chunks are applied in stream order, each only after its whole payload has been read, so a
//! truncated record is never half-applied. Earlier chunks stay applied when a later one fails.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::common::{ImportError, PackedFlags, Reg};
use crate::model::ArchAccess;
use crate::state::chunk::{Chunk, ChunkTag, Scalar};
use crate::state::codec::ChunkReader;

/// Bit position of the first pending-interrupt bit in a saved `IC_ISR`.
const IC_ISR_PENDING_SHIFT: u32 = 4;

/// `IC_MER` master-enable bit.
const IC_MER_ME: u64 = 0x1;

/// `IC_MER` hardware-interrupt-enable bit.
const IC_MER_HIE: u64 = 0x2;

/// Bytes of base address at the start of a memory chunk.
const BLOCK_BASE_LEN: usize = 8;

/// A memory range written by the importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredBlock {
    /// Destination bank index.
    pub bank: usize,
    /// First address written.
    pub base: u64,
    /// Bytes written.
    pub len: u64,
}

impl RestoredBlock {
    /// Last address written (inclusive).
    pub const fn end(&self) -> u64 {
        (self.base + self.len).saturating_sub(1)
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Register chunks written to the model.
    pub applied: usize,
    /// Recognised chunks with no modelled register (`HID0`, `IRQ`, ...).
    pub ignored: usize,
    /// Names of unrecognised chunks, in stream order.
    pub unknown: Vec<String>,
    /// Memory ranges restored.
    pub memory: Vec<RestoredBlock>,
}

impl ImportReport {
    /// Total chunks consumed.
    pub fn chunks(&self) -> usize {
        self.applied + self.ignored + self.unknown.len() + self.memory.len()
    }
}

/// Applies a chunk stream to a model.
///
/// # Arguments
///
/// * `reader` - Snapshot byte stream.
/// * `model` - Destination register and memory surface. Must not be mid-cycle.
///
/// # Errors
///
/// Fails on a truncated or unreadable stream, or on a memory block that no bank holds.
/// Unknown chunk names are logged and skipped, never fatal.
pub fn import_snapshot<R, M>(reader: R, model: &mut M) -> Result<ImportReport, ImportError>
where
    R: Read,
    M: ArchAccess + ?Sized,
{
    import_chunks(ChunkReader::new(reader), model)
}

/// Applies already-decoded chunks to a model.
///
/// # Errors
///
/// Same as [`import_snapshot`]; the first error stops the import.
pub fn import_chunks<I, M>(chunks: I, model: &mut M) -> Result<ImportReport, ImportError>
where
    I: IntoIterator<Item = Result<Chunk, crate::common::CodecError>>,
    M: ArchAccess + ?Sized,
{
    let mut report = ImportReport::default();
    for chunk in chunks {
        apply_chunk(&chunk?, model, &mut report)?;
    }
    info!(
        applied = report.applied,
        unknown = report.unknown.len(),
        blocks = report.memory.len(),
        "Snapshot imported"
    );
    Ok(report)
}

/// Opens `path` and imports it.
///
/// # Errors
///
/// [`ImportError::Open`] if the file can't be opened, otherwise as [`import_snapshot`].
pub fn restore_file<M>(path: &Path, model: &mut M) -> Result<ImportReport, ImportError>
where
    M: ArchAccess + ?Sized,
{
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Restoring state from '{}'", path.display());
    import_snapshot(BufReader::new(file), model)
}

fn apply_chunk<M>(chunk: &Chunk, model: &mut M, report: &mut ImportReport) -> Result<(), ImportError>
where
    M: ArchAccess + ?Sized,
{
    match chunk.tag() {
        ChunkTag::Scalar(scalar) => {
            if apply_scalar(scalar, chunk.value(), model) {
                report.applied += 1;
            } else {
                debug!("Chunk {} has no modelled register", chunk.name);
                report.ignored += 1;
            }
        }
        ChunkTag::Gpr(n) => {
            model.write_reg(Reg::Gpr(n), chunk.value());
            report.applied += 1;
        }
        ChunkTag::Sr(n) => {
            model.write_reg(Reg::Sr(n), chunk.value());
            report.applied += 1;
        }
        ChunkTag::Memory => report.memory.push(apply_block(chunk, model)?),
        ChunkTag::Unknown => {
            warn!("Unknown chunk '{}' ({} bytes), skipping", chunk.name, chunk.len());
            report.unknown.push(chunk.name.to_string());
        }
    }
    Ok(())
}

/// Writes one scalar; returns `false` for registers the model does not carry.
fn apply_scalar<M>(scalar: Scalar, v: u64, model: &mut M) -> bool
where
    M: ArchAccess + ?Sized,
{
    match scalar {
        Scalar::Pc => {
            model.write_reg(Reg::CurrentPc, v);
            model.write_reg(Reg::FetchPc, v);
        }
        Scalar::Msr => {
            model.write_reg(Reg::CurrentMsr, v);
            model.write_reg(Reg::FetchMsr, v);
        }
        Scalar::Xer => {
            let packed = PackedFlags(model.read_reg(Reg::XerCr)).with_xer(v as u32);
            model.write_reg(Reg::XerCr, packed.0);
        }
        Scalar::Cr => {
            let packed = PackedFlags(model.read_reg(Reg::XerCr)).with_cr(v as u32);
            model.write_reg(Reg::XerCr, packed.0);
        }
        Scalar::Ctr => model.write_reg(Reg::Ctr, v),
        Scalar::Lr => model.write_reg(Reg::Lr, v),
        Scalar::Sprg(n) => model.write_reg(Reg::Sprg(n), v),
        Scalar::Srr0 => model.write_reg(Reg::Srr0, v),
        Scalar::Srr1 => model.write_reg(Reg::Srr1, v),
        Scalar::Dar => model.write_reg(Reg::Dar, v),
        Scalar::Dsisr => model.write_reg(Reg::Dsisr, v),
        Scalar::Dec => model.write_reg(Reg::Dec, v),
        Scalar::Tb => model.write_reg(Reg::Tb, v),
        Scalar::Sdr1 => model.write_reg(Reg::Sdr1, v),
        Scalar::Ibat(n, half) => model.write_reg(Reg::Ibat(n, half), v),
        Scalar::Dbat(n, half) => model.write_reg(Reg::Dbat(n, half), v),
        Scalar::IcIsr => model.write_reg(Reg::IntcPending, v >> IC_ISR_PENDING_SHIFT),
        Scalar::IcIer => model.write_reg(Reg::IntcEnabled, v),
        Scalar::IcMer => {
            model.write_reg(Reg::IntcMasterEnable, v & IC_MER_ME);
            model.write_reg(Reg::IntcHwIrqEnable, u64::from(v & IC_MER_HIE != 0));
        }
        Scalar::ConIsr => model.write_reg(Reg::ConsoleIrqStatus, v),
        Scalar::ConIer => model.write_reg(Reg::ConsoleIrqEnable, v),
        // CON_SR is derived from FIFO state; the others aren't modelled.
        Scalar::Hid0 | Scalar::Hid1 | Scalar::Irq | Scalar::ConSr => return false,
    }
    true
}

fn apply_block<M>(chunk: &Chunk, model: &mut M) -> Result<RestoredBlock, ImportError>
where
    M: ArchAccess + ?Sized,
{
    if chunk.data.len() < BLOCK_BASE_LEN {
        return Err(ImportError::BlockTooShort { len: chunk.len() });
    }
    let base = chunk.value();
    let bytes = &chunk.data[BLOCK_BASE_LEN..];
    let len = bytes.len() as u64;

    let (bank, offset) = model
        .memory_layout()
        .locate(base, len)
        .ok_or(ImportError::UnmappedBlock { base, len })?;
    let dest = model.bank_mut(bank);
    let end = offset + bytes.len();
    if end > dest.len() {
        return Err(ImportError::UnmappedBlock { base, len });
    }
    dest[offset..end].copy_from_slice(bytes);

    let block = RestoredBlock { bank, base, len };
    info!("Restored RAM chunk {:08x}-{:08x}", block.base, block.end());
    Ok(block)
}
