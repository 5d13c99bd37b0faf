//! # Translation table descriptors (VMSAv8-64, 16 KiB granule)
//!
//! Only the two shapes the boot tables use are modelled:
//!
//! - a **table** descriptor (`0b11`) at levels 0 and 1, pointing at the next
//!   16 KiB table, and
//! - a **block** descriptor (`0b01`) at level 2, mapping one 32 MiB region.
//!
//! Shareability, access permissions and execute-never are left at zero.

use crate::MemoryAttribute;
use crate::index::extract_address;
use bitfield_struct::bitfield;
use boot_memory_addresses::{PhysicalAddress, PhysicalPage, Size16K, Size32M};

/// Descriptor type, bits `[1:0]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DescriptorKind {
    /// `0b00` or `0b10`: the walk faults here.
    Invalid,
    /// `0b01`: maps a block at level 2.
    Block,
    /// `0b11`: points at the next level table.
    Table,
}

impl DescriptorKind {
    const BLOCK: u8 = 0b01;
    const TABLE: u8 = 0b11;

    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            Self::BLOCK => Self::Block,
            Self::TABLE => Self::Table,
            _ => Self::Invalid,
        }
    }
}

/// One 64-bit translation table entry.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Descriptor {
    /// Bits 0–1: valid + type.
    #[bits(2)]
    type_bits: u8,

    /// Bits 2–4: `AttrIndx`, the `MAIR_EL2` slot of a block.
    #[bits(3)]
    pub attr_index: u8,

    /// Bits 5–9: NS, AP\[2:1\], SH\[1:0\]; unused.
    #[bits(5)]
    _bits_5_9: u8,

    /// Bit 10: access flag. Set by both constructors so the first access
    /// does not fault.
    pub access_flag: bool,

    /// Bits 11–13: nG and RES0.
    #[bits(3)]
    _bits_11_13: u8,

    /// Bits 14–47: output address\[47:14\].
    #[bits(34)]
    address_47_14: u64,

    /// Bits 48–63: upper attributes; unused.
    #[bits(16)]
    _bits_48_63: u16,
}

impl Descriptor {
    /// The all-zero, invalid descriptor.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new()
    }

    /// A level-2 block descriptor mapping `block` with memory type `attr`.
    #[must_use]
    pub const fn block(block: PhysicalPage<Size32M>, attr: MemoryAttribute) -> Self {
        Self::new()
            .with_type_bits(DescriptorKind::BLOCK)
            .with_attr_index(attr.index())
            .with_access_flag(true)
            .with_address_47_14(block.base().as_u64() >> 14)
    }

    /// A table descriptor pointing at the 16 KiB-aligned table `table`.
    #[must_use]
    pub const fn table(table: PhysicalPage<Size16K>) -> Self {
        Self::new()
            .with_type_bits(DescriptorKind::TABLE)
            .with_access_flag(true)
            .with_address_47_14(table.base().as_u64() >> 14)
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> DescriptorKind {
        DescriptorKind::from_bits(self.type_bits())
    }

    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.into_bits() == 0
    }

    /// The output address, whatever the descriptor type.
    #[inline]
    #[must_use]
    pub const fn address(self) -> PhysicalAddress {
        extract_address(self.into_bits())
    }

    /// If this is a block, the mapped 32 MiB region and its memory type.
    #[must_use]
    pub const fn as_block(self) -> Option<(PhysicalPage<Size32M>, Option<MemoryAttribute>)> {
        match self.kind() {
            DescriptorKind::Block => Some((
                PhysicalPage::from_addr(self.address()),
                MemoryAttribute::from_index(self.attr_index()),
            )),
            _ => None,
        }
    }

    /// If this is a table descriptor, the next-level table address.
    #[must_use]
    pub const fn as_table(self) -> Option<PhysicalPage<Size16K>> {
        match self.kind() {
            DescriptorKind::Table => Some(PhysicalPage::from_addr(self.address())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout() {
        let pa = PhysicalAddress::new(0x08_0000_0000);
        let d = Descriptor::block(PhysicalPage::from_addr(pa), MemoryAttribute::Normal);
        assert_eq!(d.into_bits(), 0x08_0000_0000 | (1 << 10) | 0b01);

        let zero = PhysicalPage::from_addr(PhysicalAddress::zero());
        let d = Descriptor::block(zero, MemoryAttribute::DeviceNgnre);
        assert_eq!(d.into_bits(), (1 << 10) | (2 << 2) | 0b01);
        assert_eq!(d.kind(), DescriptorKind::Block);
    }

    #[test]
    fn table_layout() {
        let pa = PhysicalAddress::new(0x4008_C000);
        let d = Descriptor::table(PhysicalPage::from_addr(pa));
        assert_eq!(d.into_bits(), 0x4008_C000 | (1 << 10) | 0b11);
        assert!(d.access_flag());
        assert_eq!(d.as_table().map(|t| t.base()), Some(pa));
        assert_eq!(d.as_block(), None);
    }

    #[test]
    fn zero_is_invalid() {
        assert!(Descriptor::zero().is_zero());
        assert_eq!(Descriptor::zero().kind(), DescriptorKind::Invalid);
        assert_eq!(Descriptor::from_bits(0b10).kind(), DescriptorKind::Invalid);
    }

    #[test]
    fn block_decodes() {
        let base = PhysicalAddress::new(0xf0_0200_0000);
        let d = Descriptor::block(PhysicalPage::from_addr(base), MemoryAttribute::DeviceNgnrne);
        let (page, attr) = d.as_block().expect("block");
        assert_eq!(page.base(), base);
        assert_eq!(attr, Some(MemoryAttribute::DeviceNgnrne));
    }
}
