//! Packed XER/CR layout.
//!
//! The model keeps the condition register and the fixed-point exception register in one
//! 64-bit field written by a single write-back port. The packing is:
//!
//! ```text
//! bits 35..=41   XER  6..=0    string byte count
//! bits 32..=34   XER 31..=29   SO, OV, CA
//! bits  0..=31   CR
//! ```
//!
//! Bit numbers are LSB-0. The summary bits move up by three and the byte count moves up
//! by 35. These offsets come from the MR decode-stage register layout; they are not a
//! general PowerPC convention and must be re-checked against that layout before reuse.

/// Mask of the XER string byte-count field, in XER coordinates.
pub const XER_BYTE_COUNT_MASK: u32 = 0x0000_007F;

/// Left shift placing the byte count in the packed field.
pub const XER_BYTE_COUNT_SHIFT: u32 = 35;

/// Mask of the XER SO/OV/CA summary bits, in XER coordinates.
pub const XER_SUMMARY_MASK: u32 = 0xE000_0000;

/// Left shift placing the summary bits in the packed field.
pub const XER_SUMMARY_SHIFT: u32 = 3;

/// Low half of the packed field, holding CR.
pub const CR_MASK: u64 = 0xFFFF_FFFF;

/// The combined XER/CR register as stored by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackedFlags(pub u64);

impl PackedFlags {
    /// Packs independent XER and CR values.
    pub const fn new(xer: u32, cr: u32) -> Self {
        Self(Self::pack_xer(xer) | cr as u64)
    }

    /// Places the modelled XER bits into their packed positions.
    const fn pack_xer(xer: u32) -> u64 {
        (((xer & XER_BYTE_COUNT_MASK) as u64) << XER_BYTE_COUNT_SHIFT)
            | (((xer & XER_SUMMARY_MASK) as u64) << XER_SUMMARY_SHIFT)
    }

    /// Condition register.
    pub const fn cr(self) -> u32 {
        (self.0 & CR_MASK) as u32
    }

    /// XER, reconstructed from the packed fields. Unmodelled XER bits read as zero.
    pub const fn xer(self) -> u32 {
        (((self.0 >> XER_SUMMARY_SHIFT) as u32) & XER_SUMMARY_MASK)
            | (((self.0 >> XER_BYTE_COUNT_SHIFT) as u32) & XER_BYTE_COUNT_MASK)
    }

    /// Replaces the XER half; the CR half is kept.
    pub const fn with_xer(self, xer: u32) -> Self {
        Self(Self::pack_xer(xer) | (self.0 & CR_MASK))
    }

    /// Replaces the CR half; the XER half is kept.
    pub const fn with_cr(self, cr: u32) -> Self {
        Self((self.0 & !CR_MASK) | cr as u64)
    }
}
