//! MR core snapshot tool.
//!
//! Offline operations on architectural state snapshots, without a hardware model:
//! 1. **Inspect:** List every chunk in a snapshot with its decoded meaning.
//! 2. **Restore:** Import a snapshot into an in-memory register file, print the register
//!    dump, and optionally re-encode it as a complete snapshot.
//!
//! Running a model is done by the binary that links it, through `mrsim_core::Session`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mrsim_core::model::MemoryLayout;
use mrsim_core::sim::RegisterDump;
use mrsim_core::state::{ChunkReader, ChunkTag, restore_file, save_file};
use mrsim_core::{ArchState, Config};

#[derive(Parser, Debug)]
#[command(
    name = "mrsim",
    author,
    version,
    about = "MR core architectural snapshot tool",
    long_about = "Inspect and re-encode architectural state snapshots.\n\nExamples:\n  mrsim inspect boot.arch\n  mrsim restore boot.arch --save full.arch\n  RUST_LOG=debug mrsim restore boot.arch --config mr3.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the chunks in a snapshot.
    Inspect {
        /// Snapshot file.
        snapshot: PathBuf,
    },

    /// Import a snapshot into a fresh register file and dump it.
    Restore {
        /// Snapshot file.
        snapshot: PathBuf,

        /// Write the restored state back out as a complete snapshot.
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// JSON configuration (for a non-default memory layout).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Inspect { snapshot } => cmd_inspect(&snapshot),
        Commands::Restore {
            snapshot,
            save,
            config,
        } => cmd_restore(&snapshot, save.as_deref(), config.as_deref()),
    };

    if let Err(msg) = result {
        error!("{msg}");
        process::exit(1);
    }
}

/// Prints one line per chunk: name, payload length and decoded value.
fn cmd_inspect(path: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| format!("can't open '{}': {e}", path.display()))?;
    let mut count = 0usize;
    let mut bytes = 0u64;

    for chunk in ChunkReader::new(BufReader::new(file)) {
        let chunk = chunk.map_err(|e| e.to_string())?;
        count += 1;
        bytes += chunk.len();
        let meaning = match chunk.tag() {
            ChunkTag::Memory if chunk.len() >= 8 => format!(
                "memory {:#010x}, {} bytes",
                chunk.value(),
                chunk.len() - 8
            ),
            ChunkTag::Memory => "memory (no base address)".to_string(),
            ChunkTag::Unknown => "unknown".to_string(),
            _ => format!("{:#018x}", chunk.value()),
        };
        println!("{:<8} {:>10}  {meaning}", chunk.name, chunk.len());
    }

    println!("{count} chunks, {bytes} payload bytes");
    Ok(())
}

/// Restores into [`ArchState`], prints the result and optionally saves a full snapshot.
fn cmd_restore(path: &Path, save: Option<&Path>, config: Option<&Path>) -> Result<(), String> {
    let layout = match config {
        Some(p) => Config::from_file(p).map_err(|e| e.to_string())?.memory,
        None => MemoryLayout::default(),
    };
    let mut state = ArchState::new(layout);

    let report = restore_file(path, &mut state).map_err(|e| e.to_string())?;
    println!(
        "Restored {} registers, {} memory blocks ({} ignored, {} unknown)",
        report.applied,
        report.memory.len(),
        report.ignored,
        report.unknown.len()
    );
    for name in &report.unknown {
        println!("  unknown chunk: {name}");
    }
    println!("{}", RegisterDump::capture(&state, 0));

    if let Some(out) = save {
        save_file(out, &state).map_err(|e| e.to_string())?;
        info!("Saved '{}'", out.display());
    }
    Ok(())
}
