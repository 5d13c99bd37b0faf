use bitfield_struct::bitfield;
use boot_memory_addresses::PhysicalAddress;

/// `TTBR0_EL2` — Translation Table Base Register 0 (EL2).
///
/// Holds the physical address of the initial-level translation table.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct Ttbr0El2 {
    /// Bit 0 — CnP: common not private.
    pub cnp: bool,

    /// Bits 1–47 — BADDR\[47:1\].
    #[bits(47)]
    baddr_47_1: u64,

    /// Bits 48–63.
    #[bits(16)]
    _bits_48_63: u16,
}

impl Ttbr0El2 {
    /// Create a `Ttbr0El2` value pointing at the table at `table`.
    ///
    /// The table must be aligned to its own size; for the two-entry level-0
    /// table used by the boot code any 16-byte alignment suffices, but the
    /// tables are granule aligned anyway.
    #[must_use]
    pub const fn from_table(table: PhysicalAddress) -> Self {
        debug_assert!(table.as_u64() & 1 == 0, "table base must be aligned");
        debug_assert!(table.as_u64() >> 48 == 0, "table base beyond 48 bits");
        Self::new().with_baddr_47_1(table.as_u64() >> 1)
    }

    /// Return the physical address of the table.
    #[must_use]
    pub const fn table(&self) -> PhysicalAddress {
        PhysicalAddress::new(self.baddr_47_1() << 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_address_round_trips() {
        let pa = PhysicalAddress::new(0x0000_0008_0123_4000);
        let ttbr = Ttbr0El2::from_table(pa);
        assert_eq!(ttbr.into_bits(), pa.as_u64());
        assert_eq!(ttbr.table(), pa);
        assert!(!ttbr.cnp());
    }
}
