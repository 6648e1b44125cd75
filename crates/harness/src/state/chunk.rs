//! Chunk records and chunk-name dispatch.
//!
//! Every chunk carries an 8-byte NUL-padded ASCII name. Names fall into four groups:
//! 1. **Scalars:** A fixed set of literals (`PC`, `XER`, `IBAT2L`, `IC_MER`, ...).
//! 2. **Families:** `GPRnn` for 00..=31 and `SRnn` for 00..=15, always two digits.
//! 3. **Memory:** The reserved literal `MEMBLK`, whose payload begins with a base address.
//! 4. **Unknown:** Anything else, including family names with an out-of-range index.
//!
//! [`ChunkTag::parse`] normalizes a name into one of these so callers dispatch with a
//! single `match`.

use std::borrow::Cow;
use std::fmt;

use crate::common::BatHalf;
use crate::common::BatHalf::{Lower, Upper};
use crate::common::reg::{GPR_COUNT, SR_COUNT};

/// Size of a chunk name in bytes.
pub const NAME_LEN: usize = 8;

/// Size of a chunk header (name plus length) in bytes.
pub const HEADER_LEN: usize = 16;

/// Payloads are padded to a multiple of this.
pub const CHUNK_ALIGN: usize = 8;

/// Reserved name of memory-block chunks.
pub const MEMORY_CHUNK: &str = "MEMBLK";

const GPR_PREFIX: &str = "GPR";
const SR_PREFIX: &str = "SR";

/// Rounds a payload length up to the chunk alignment.
pub const fn padded_len(len: usize) -> usize {
    len.next_multiple_of(CHUNK_ALIGN)
}

/// An 8-byte chunk identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkName([u8; NAME_LEN]);

impl ChunkName {
    /// Wraps raw name bytes as read from a stream.
    pub const fn from_bytes(bytes: [u8; NAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds a name from a string of at most eight bytes, NUL-padding the rest.
    pub fn new(name: &str) -> Option<Self> {
        let src = name.as_bytes();
        if src.len() > NAME_LEN || src.contains(&0) {
            return None;
        }
        let mut bytes = [0u8; NAME_LEN];
        bytes[..src.len()].copy_from_slice(src);
        Some(Self(bytes))
    }

    /// The raw name bytes.
    pub const fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.0
    }

    /// The name up to its first NUL, lossily decoded.
    pub fn as_str(&self) -> Cow<'_, str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.0[..end])
    }
}

impl fmt::Display for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str())
    }
}

impl fmt::Debug for ChunkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkName({:?})", self.as_str())
    }
}

/// A literal-named scalar chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Program counter.
    Pc,
    /// Machine-state register.
    Msr,
    /// Count register.
    Ctr,
    /// Link register.
    Lr,
    /// Fixed-point exception register.
    Xer,
    /// Condition register.
    Cr,
    /// Hardware implementation register 0 (not modelled).
    Hid0,
    /// Hardware implementation register 1 (not modelled).
    Hid1,
    /// SPRG scratch register.
    Sprg(u8),
    /// Save/restore register 0.
    Srr0,
    /// Save/restore register 1.
    Srr1,
    /// Data address register.
    Dar,
    /// Data storage interrupt status register.
    Dsisr,
    /// Decrementer.
    Dec,
    /// Timebase.
    Tb,
    /// Page-table base register.
    Sdr1,
    /// Instruction BAT word.
    Ibat(u8, BatHalf),
    /// Data BAT word.
    Dbat(u8, BatHalf),
    /// External interrupt line level (not modelled).
    Irq,
    /// Interrupt controller status (captured edge inputs).
    IcIsr,
    /// Interrupt controller enables.
    IcIer,
    /// Interrupt controller master enable register.
    IcMer,
    /// Console UART status (derived from FIFO state, not restorable).
    ConSr,
    /// Console UART interrupt status.
    ConIsr,
    /// Console UART interrupt enable.
    ConIer,
}

/// Every literal scalar name, in snapshot order.
pub const SCALARS: &[(&str, Scalar)] = &[
    ("PC", Scalar::Pc),
    ("MSR", Scalar::Msr),
    ("CTR", Scalar::Ctr),
    ("LR", Scalar::Lr),
    ("XER", Scalar::Xer),
    ("CR", Scalar::Cr),
    ("HID0", Scalar::Hid0),
    ("HID1", Scalar::Hid1),
    ("SPRG0", Scalar::Sprg(0)),
    ("SPRG1", Scalar::Sprg(1)),
    ("SPRG2", Scalar::Sprg(2)),
    ("SPRG3", Scalar::Sprg(3)),
    ("SRR0", Scalar::Srr0),
    ("SRR1", Scalar::Srr1),
    ("DAR", Scalar::Dar),
    ("DSISR", Scalar::Dsisr),
    ("DEC", Scalar::Dec),
    ("TB", Scalar::Tb),
    ("SDR1", Scalar::Sdr1),
    ("IBAT0U", Scalar::Ibat(0, Upper)),
    ("IBAT0L", Scalar::Ibat(0, Lower)),
    ("IBAT1U", Scalar::Ibat(1, Upper)),
    ("IBAT1L", Scalar::Ibat(1, Lower)),
    ("IBAT2U", Scalar::Ibat(2, Upper)),
    ("IBAT2L", Scalar::Ibat(2, Lower)),
    ("IBAT3U", Scalar::Ibat(3, Upper)),
    ("IBAT3L", Scalar::Ibat(3, Lower)),
    ("DBAT0U", Scalar::Dbat(0, Upper)),
    ("DBAT0L", Scalar::Dbat(0, Lower)),
    ("DBAT1U", Scalar::Dbat(1, Upper)),
    ("DBAT1L", Scalar::Dbat(1, Lower)),
    ("DBAT2U", Scalar::Dbat(2, Upper)),
    ("DBAT2L", Scalar::Dbat(2, Lower)),
    ("DBAT3U", Scalar::Dbat(3, Upper)),
    ("DBAT3L", Scalar::Dbat(3, Lower)),
    ("IRQ", Scalar::Irq),
    ("IC_ISR", Scalar::IcIsr),
    ("IC_IER", Scalar::IcIer),
    ("IC_MER", Scalar::IcMer),
    ("CON_SR", Scalar::ConSr),
    ("CON_ISR", Scalar::ConIsr),
    ("CON_IER", Scalar::ConIer),
];

impl Scalar {
    /// Chunk name for this scalar.
    pub fn name(self) -> &'static str {
        SCALARS
            .iter()
            .find(|(_, s)| *s == self)
            .map_or("?", |(name, _)| *name)
    }
}

/// Normalized chunk identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkTag {
    /// Literal-named scalar register.
    Scalar(Scalar),
    /// General-purpose register `GPRnn`.
    Gpr(u8),
    /// Segment register `SRnn`.
    Sr(u8),
    /// Memory block.
    Memory,
    /// Unrecognized name.
    Unknown,
}

impl ChunkTag {
    /// Classifies a chunk name.
    pub fn parse(name: &str) -> Self {
        if let Some((_, scalar)) = SCALARS.iter().find(|(lit, _)| *lit == name) {
            return Self::Scalar(*scalar);
        }
        if name == MEMORY_CHUNK {
            return Self::Memory;
        }
        if let Some(n) = family_index(name, GPR_PREFIX, GPR_COUNT) {
            return Self::Gpr(n);
        }
        if let Some(n) = family_index(name, SR_PREFIX, SR_COUNT) {
            return Self::Sr(n);
        }
        Self::Unknown
    }
}

/// Matches `<prefix><two digits>` with the index below `count`.
fn family_index(name: &str, prefix: &str, count: usize) -> Option<u8> {
    let digits = name.strip_prefix(prefix)?;
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u8 = digits.parse().ok()?;
    (usize::from(n) < count).then_some(n)
}

/// Chunk name of general-purpose register `n`.
pub fn gpr_name(n: u8) -> String {
    format!("{GPR_PREFIX}{n:02}")
}

/// Chunk name of segment register `n`.
pub fn sr_name(n: u8) -> String {
    format!("{SR_PREFIX}{n:02}")
}

/// One snapshot record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Record name.
    pub name: ChunkName,
    /// Payload, exactly as long as the header's length field.
    pub data: Vec<u8>,
}

impl Chunk {
    /// A scalar chunk carrying `value` as eight little-endian bytes.
    pub fn scalar(name: ChunkName, value: u64) -> Self {
        Self {
            name,
            data: value.to_le_bytes().to_vec(),
        }
    }

    /// A memory-block chunk: base address followed by the raw bytes.
    pub fn memory(base: u64, bytes: &[u8]) -> Self {
        let mut data = Vec::with_capacity(padded_len(bytes.len() + 8));
        data.extend_from_slice(&base.to_le_bytes());
        data.extend_from_slice(bytes);
        Self {
            name: ChunkName::from_bytes(*b"MEMBLK\0\0"),
            data,
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First eight payload bytes as a little-endian value; short payloads are zero-extended.
    pub fn value(&self) -> u64 {
        let mut word = [0u8; 8];
        let n = self.data.len().min(8);
        word[..n].copy_from_slice(&self.data[..n]);
        u64::from_le_bytes(word)
    }

    /// Normalized identity of this chunk.
    pub fn tag(&self) -> ChunkTag {
        ChunkTag::parse(&self.name.as_str())
    }
}
