//! Memory bank layout.
//!
//! The MR3 platform backs its address space with two block-RAM banks, the second
//! starting at 16 MiB. Snapshot memory blocks are routed to a bank by address.

use serde::Deserialize;

/// Default bank size and the address at which the second bank starts.
const MR3_BANK_SIZE: u64 = 0x0100_0000;

/// One contiguous memory bank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bank {
    /// Short name used in logs.
    pub name: String,
    /// First address covered by the bank.
    pub base: u64,
    /// Bank size in bytes.
    pub size: u64,
}

impl Bank {
    /// Returns `true` if `addr` falls inside this bank.
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}

/// The set of modelled banks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryLayout {
    /// Banks, in address order.
    #[serde(default = "MemoryLayout::default_banks")]
    pub banks: Vec<Bank>,
}

impl MemoryLayout {
    fn default_banks() -> Vec<Bank> {
        vec![
            Bank {
                name: "RAMA".to_string(),
                base: 0,
                size: MR3_BANK_SIZE,
            },
            Bank {
                name: "RAMB".to_string(),
                base: MR3_BANK_SIZE,
                size: MR3_BANK_SIZE,
            },
        ]
    }

    /// Creates a layout from explicit banks.
    pub const fn new(banks: Vec<Bank>) -> Self {
        Self { banks }
    }

    /// Finds the bank holding `[base, base + len)`.
    ///
    /// # Returns
    ///
    /// `(bank index, offset within bank)`, or `None` if no single bank holds the whole range.
    pub fn locate(&self, base: u64, len: u64) -> Option<(usize, usize)> {
        let (index, bank) = self
            .banks
            .iter()
            .enumerate()
            .find(|(_, bank)| bank.contains(base))?;
        let offset = base - bank.base;
        if len > bank.size - offset {
            return None;
        }
        Some((index, usize::try_from(offset).ok()?))
    }
}

impl Default for MemoryLayout {
    fn default() -> Self {
        Self::new(Self::default_banks())
    }
}
