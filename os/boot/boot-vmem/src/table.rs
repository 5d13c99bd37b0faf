//! Table storage: fixed arrays of descriptors, aligned to the 16 KiB granule.

use crate::Descriptor;
use crate::index::{L0_ENTRIES, L0Index, L1Index, L2Index, TABLE_ENTRIES};
use boot_memory_addresses::{PhysicalAddress, PhysicalPage, Size16K};

/// The level-0 table: two entries, one per half of the 48-bit range.
#[repr(C, align(16384))]
pub struct L0Table {
    entries: [Descriptor; L0_ENTRIES],
}

/// A level-1 or level-2 table: 2048 entries, 16 KiB, 16 KiB-aligned.
#[repr(C, align(16384))]
pub struct TranslationTable {
    entries: [Descriptor; TABLE_ENTRIES],
}

const _: () = assert!(size_of::<TranslationTable>() == 16 * 1024);
const _: () = assert!(align_of::<L0Table>() == 16 * 1024);

impl L0Table {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [Descriptor::zero(); L0_ENTRIES],
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(&self, i: L0Index) -> Descriptor {
        self.entries[i.as_usize()]
    }

    #[inline]
    pub const fn set(&mut self, i: L0Index, d: Descriptor) {
        self.entries[i.as_usize()] = d;
    }

    pub fn clear(&mut self) {
        self.entries.fill(Descriptor::zero());
    }

    /// Identity-mapped physical address of this table.
    #[inline]
    #[must_use]
    pub fn physical_page(&self) -> PhysicalPage<Size16K> {
        PhysicalPage::from_addr(PhysicalAddress::from_ptr(self))
    }
}

impl TranslationTable {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [Descriptor::zero(); TABLE_ENTRIES],
        }
    }

    /// Entry selected by the level-1 bits of an address.
    #[inline]
    #[must_use]
    pub const fn l1_entry(&self, i: L1Index) -> Descriptor {
        self.entries[i.as_usize()]
    }

    #[inline]
    pub const fn set_l1_entry(&mut self, i: L1Index, d: Descriptor) {
        self.entries[i.as_usize()] = d;
    }

    /// Entry selected by the level-2 bits of an address.
    #[inline]
    #[must_use]
    pub const fn l2_entry(&self, i: L2Index) -> Descriptor {
        self.entries[i.as_usize()]
    }

    #[inline]
    pub const fn set_l2_entry(&mut self, i: L2Index, d: Descriptor) {
        self.entries[i.as_usize()] = d;
    }

    pub fn clear(&mut self) {
        self.entries.fill(Descriptor::zero());
    }

    /// Number of non-zero entries.
    #[must_use]
    pub fn populated(&self) -> usize {
        self.entries.iter().filter(|d| !d.is_zero()).count()
    }

    /// Identity-mapped physical address of this table.
    #[inline]
    #[must_use]
    pub fn physical_page(&self) -> PhysicalPage<Size16K> {
        PhysicalPage::from_addr(PhysicalAddress::from_ptr(self))
    }
}

impl Default for L0Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for TranslationTable {
    fn default() -> Self {
        Self::new()
    }
}
