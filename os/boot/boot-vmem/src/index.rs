//! # Virtual address decomposition
//!
//! With the 16 KiB granule and a 48-bit input range a virtual address splits
//! (high to low) into:
//!
//! | Bits | Width | Field |
//! |------|-------|-------|
//! | 47 | 1 | [`L0Index`] |
//! | 46:36 | 11 | [`L1Index`] |
//! | 35:25 | 11 | [`L2Index`] |
//! | 24:0 | 25 | offset inside a 32 MiB block |
//!
//! Bits above 47 are ignored.

use boot_memory_addresses::{PhysicalAddress, VirtualAddress};

/// Entries in the level-0 table.
pub const L0_ENTRIES: usize = 2;

/// Entries in a level-1 or level-2 table (16 KiB / 8 bytes).
pub const TABLE_ENTRIES: usize = 2048;

/// Bits 47:14 of a descriptor: the output address.
const ADDRESS_MASK: u64 = 0x0000_FFFF_FFFF_C000;

/// Index into the level-0 table (VA bit `[47]`).
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct L0Index(u8);

/// Index into a level-1 table (VA bits `[46:36]`).
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct L1Index(u16);

/// Index into a level-2 table (VA bits `[35:25]`).
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct L2Index(u16);

impl L0Index {
    /// Extract bit `[47]`.
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 47) & 0x1) as u8)
    }

    /// ### Debug assertions
    /// - Asserts `v < 2` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u8) -> Self {
        debug_assert!((v as usize) < L0_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl L1Index {
    /// Extract bits `[46:36]`.
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 36) & 0x7FF) as u16)
    }

    /// ### Debug assertions
    /// - Asserts `v < 2048` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!((v as usize) < TABLE_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl L2Index {
    /// Extract bits `[35:25]`.
    #[inline]
    #[must_use]
    pub const fn from(va: VirtualAddress) -> Self {
        Self::new(((va.as_u64() >> 25) & 0x7FF) as u16)
    }

    /// ### Debug assertions
    /// - Asserts `v < 2048` in debug builds.
    #[inline]
    #[must_use]
    pub const fn new(v: u16) -> Self {
        debug_assert!((v as usize) < TABLE_ENTRIES);
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Output address of a raw descriptor: bits above 47 and below 14 cleared.
#[inline]
#[must_use]
pub const fn extract_address(raw: u64) -> PhysicalAddress {
    PhysicalAddress::new(raw & ADDRESS_MASK)
}

/// All three indices of `va` at once.
#[inline]
#[must_use]
pub const fn split_indices(va: VirtualAddress) -> (L0Index, L1Index, L2Index) {
    (L0Index::from(va), L1Index::from(va), L2Index::from(va))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_extracted() {
        let va = VirtualAddress::new((1 << 47) | (0x7FF << 36) | (0x123 << 25) | 0x1ab_cdef);
        let (l0, l1, l2) = split_indices(va);
        assert_eq!(l0.as_usize(), 1);
        assert_eq!(l1.as_usize(), 0x7FF);
        assert_eq!(l2.as_usize(), 0x123);
    }

    #[test]
    fn default_map_boundaries() {
        let (l0, l1, l2) = split_indices(VirtualAddress::new(0xf0_0000_0000));
        assert_eq!((l0.as_usize(), l1.as_usize(), l2.as_usize()), (0, 0xf, 0));

        let (l0, l1, l2) = split_indices(VirtualAddress::new(0x08_0200_0000));
        assert_eq!((l0.as_usize(), l1.as_usize(), l2.as_usize()), (0, 0, 0x401));
    }

    #[test]
    fn upper_bits_are_ignored() {
        let va = VirtualAddress::new(0xFFFF_0000_0000_0000 | (3 << 25));
        assert_eq!(L0Index::from(va).as_usize(), 0);
        assert_eq!(L1Index::from(va).as_usize(), 0);
        assert_eq!(L2Index::from(va).as_usize(), 3);
    }

    #[test]
    fn extract_address_masks_both_ends() {
        assert_eq!(
            extract_address(0xFFFF_0012_3456_7FFF).as_u64(),
            0x0000_0012_3456_4000
        );
        assert_eq!(extract_address(0x3FFF).as_u64(), 0);
    }
}
