//! Snapshot export (save path).
//!
//! Produces every scalar the importer restores, the GPR and SR files one chunk per
//! register, and one `MEMBLK` per memory bank. Recognised-but-unmodelled scalars
//! (`HID0`, `HID1`, `IRQ`, `CON_SR`) are written as zero so the file carries the full
//! register set a reader expects.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::common::reg::{GPR_COUNT, SR_COUNT};
use crate::common::{CodecError, PackedFlags, Reg, SaveError};
use crate::model::ArchAccess;
use crate::state::chunk::{Chunk, ChunkName, SCALARS, Scalar, gpr_name, sr_name};
use crate::state::codec::ChunkWriter;

fn name(s: &str) -> ChunkName {
    // Every generated name is at most eight bytes.
    ChunkName::new(s).unwrap_or_else(|| ChunkName::from_bytes([b'?'; 8]))
}

fn scalar_value<M: ArchAccess + ?Sized>(scalar: Scalar, model: &M) -> u64 {
    let flags = PackedFlags(model.read_reg(Reg::XerCr));
    match scalar {
        Scalar::Pc => model.read_reg(Reg::CurrentPc),
        Scalar::Msr => model.read_reg(Reg::CurrentMsr),
        Scalar::Ctr => model.read_reg(Reg::Ctr),
        Scalar::Lr => model.read_reg(Reg::Lr),
        Scalar::Xer => u64::from(flags.xer()),
        Scalar::Cr => u64::from(flags.cr()),
        Scalar::Sprg(n) => model.read_reg(Reg::Sprg(n)),
        Scalar::Srr0 => model.read_reg(Reg::Srr0),
        Scalar::Srr1 => model.read_reg(Reg::Srr1),
        Scalar::Dar => model.read_reg(Reg::Dar),
        Scalar::Dsisr => model.read_reg(Reg::Dsisr),
        Scalar::Dec => model.read_reg(Reg::Dec),
        Scalar::Tb => model.read_reg(Reg::Tb),
        Scalar::Sdr1 => model.read_reg(Reg::Sdr1),
        Scalar::Ibat(n, half) => model.read_reg(Reg::Ibat(n, half)),
        Scalar::Dbat(n, half) => model.read_reg(Reg::Dbat(n, half)),
        Scalar::IcIsr => model.read_reg(Reg::IntcPending) << 4,
        Scalar::IcIer => model.read_reg(Reg::IntcEnabled),
        Scalar::IcMer => {
            (model.read_reg(Reg::IntcMasterEnable) & 1)
                | (u64::from(model.read_reg(Reg::IntcHwIrqEnable) != 0) << 1)
        }
        Scalar::ConIsr => model.read_reg(Reg::ConsoleIrqStatus),
        Scalar::ConIer => model.read_reg(Reg::ConsoleIrqEnable),
        Scalar::Hid0 | Scalar::Hid1 | Scalar::Irq | Scalar::ConSr => 0,
    }
}

/// Builds the full chunk list for a model, in snapshot order.
pub fn snapshot_chunks<M: ArchAccess + ?Sized>(model: &M) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(SCALARS.len() + GPR_COUNT + SR_COUNT + 2);
    for (lit, scalar) in SCALARS {
        chunks.push(Chunk::scalar(name(lit), scalar_value(*scalar, model)));
    }
    for n in 0..GPR_COUNT as u8 {
        chunks.push(Chunk::scalar(name(&gpr_name(n)), model.read_reg(Reg::Gpr(n))));
    }
    for n in 0..SR_COUNT as u8 {
        chunks.push(Chunk::scalar(name(&sr_name(n)), model.read_reg(Reg::Sr(n))));
    }
    for (index, bank) in model.memory_layout().banks.iter().enumerate() {
        chunks.push(Chunk::memory(bank.base, model.bank(index)));
    }
    chunks
}

/// Encodes a model's full state to `writer`.
///
/// # Errors
///
/// Returns the first write failure.
pub fn export_snapshot<W, M>(writer: W, model: &M) -> Result<(), CodecError>
where
    W: Write,
    M: ArchAccess + ?Sized,
{
    let mut out = ChunkWriter::new(writer);
    for chunk in snapshot_chunks(model) {
        out.write_chunk(&chunk)?;
    }
    let written = out.bytes_written();
    let _ = out.finish()?;
    info!("Wrote {written} bytes of state");
    Ok(())
}

/// Saves a model's full state to a new file at `path`.
///
/// # Errors
///
/// [`SaveError::Create`] if the file can't be created, [`SaveError::Codec`] on write failure.
pub fn save_file<M: ArchAccess + ?Sized>(path: &Path, model: &M) -> Result<(), SaveError> {
    let file = File::create(path).map_err(|source| SaveError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saving state to '{}'", path.display());
    export_snapshot(BufWriter::new(file), model)?;
    Ok(())
}
