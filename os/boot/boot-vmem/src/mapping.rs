//! Installing 32 MiB block mappings.

use crate::index::L2Index;
use crate::{BLOCK_SIZE, Descriptor, MemoryAttribute, PageTables};
use boot_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};
use core::fmt;

/// Which argument of a mapping request was rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MappingField {
    From,
    To,
    Size,
}

impl fmt::Display for MappingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::From => "from",
            Self::To => "to",
            Self::Size => "size",
        })
    }
}

/// Why a mapping could not be installed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("{field} is not a multiple of 32 MiB: {value:#x}")]
    Unaligned { field: MappingField, value: u64 },
    #[error("{0} is already mapped")]
    DuplicateMapping(VirtualAddress),
    #[error("no level-2 table left for {0}")]
    PoolExhausted(VirtualAddress),
}

const fn check_aligned(field: MappingField, value: u64) -> Result<(), MapError> {
    if value % BLOCK_SIZE == 0 {
        Ok(())
    } else {
        Err(MapError::Unaligned { field, value })
    }
}

impl PageTables {
    /// Map the single 32 MiB block at `from` to the block at `to`.
    ///
    /// # Errors
    /// - [`MapError::Unaligned`] if either address is not block aligned.
    /// - [`MapError::PoolExhausted`] if a new level-2 table is needed and
    ///   none is left.
    /// - [`MapError::DuplicateMapping`] if the block is already mapped; the
    ///   existing entry is left alone.
    pub fn add_single_mapping(
        &mut self,
        from: VirtualAddress,
        to: PhysicalAddress,
        attr: MemoryAttribute,
    ) -> Result<(), MapError> {
        check_aligned(MappingField::From, from.as_u64())?;
        check_aligned(MappingField::To, to.as_u64())?;

        let index = L2Index::from(from);
        let table = self.l2_table(from)?;
        if !table.l2_entry(index).is_zero() {
            return Err(MapError::DuplicateMapping(from));
        }

        table.set_l2_entry(index, Descriptor::block(PhysicalPage::from_addr(to), attr));
        Ok(())
    }

    /// Map `size` bytes at `from` to `to`, one 32 MiB block at a time.
    ///
    /// `size == 0` maps nothing. A failure part-way leaves the blocks mapped
    /// so far in place.
    ///
    /// # Errors
    /// - [`MapError::Unaligned`] if `from`, `to` or `size` (checked in that
    ///   order) is not a multiple of 32 MiB. Nothing is mapped.
    /// - Any error of [`add_single_mapping`](Self::add_single_mapping) for
    ///   the first block that fails.
    pub fn add_mapping(
        &mut self,
        from: VirtualAddress,
        to: PhysicalAddress,
        size: u64,
        attr: MemoryAttribute,
    ) -> Result<(), MapError> {
        check_aligned(MappingField::From, from.as_u64())?;
        check_aligned(MappingField::To, to.as_u64())?;
        check_aligned(MappingField::Size, size)?;

        let mut offset = 0;
        while offset < size {
            self.add_single_mapping(
                VirtualAddress::new(from.as_u64().wrapping_add(offset)),
                PhysicalAddress::new(to.as_u64().wrapping_add(offset)),
                attr,
            )?;
            offset += BLOCK_SIZE;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_L2_TABLES;

    fn tables() -> Box<PageTables> {
        let mut t = Box::new(PageTables::new());
        t.initialize();
        t
    }

    #[test]
    fn single_block_translates() {
        let mut t = tables();
        t.add_single_mapping(
            VirtualAddress::new(0x4000_0000),
            PhysicalAddress::new(0x0a_0000_0000),
            MemoryAttribute::Normal,
        )
        .expect("map");

        let tr = t.translate(VirtualAddress::new(0x4000_1234)).expect("translate");
        assert_eq!(tr.address, PhysicalAddress::new(0x0a_0000_1234));
        assert_eq!(tr.attribute, MemoryAttribute::Normal);
    }

    #[test]
    fn unaligned_size_is_rejected() {
        let mut t = tables();
        let err = t
            .add_mapping(
                VirtualAddress::zero(),
                PhysicalAddress::zero(),
                0x200_0001,
                MemoryAttribute::Normal,
            )
            .unwrap_err();
        assert_eq!(
            err,
            MapError::Unaligned {
                field: MappingField::Size,
                value: 0x200_0001
            }
        );
        assert_eq!(t.l2_tables_used(), 0);
    }

    #[test]
    fn alignment_is_checked_from_to_size() {
        let mut t = tables();
        let err = t
            .add_mapping(
                VirtualAddress::new(0x1000),
                PhysicalAddress::new(0x2000),
                0x3000,
                MemoryAttribute::Normal,
            )
            .unwrap_err();
        assert!(matches!(err, MapError::Unaligned { field: MappingField::From, .. }));

        let err = t
            .add_mapping(
                VirtualAddress::zero(),
                PhysicalAddress::new(0x2000),
                0x3000,
                MemoryAttribute::Normal,
            )
            .unwrap_err();
        assert!(matches!(err, MapError::Unaligned { field: MappingField::To, .. }));
    }

    #[test]
    fn zero_size_is_a_no_op() {
        let mut t = tables();
        t.add_mapping(
            VirtualAddress::new(0x0200_0000),
            PhysicalAddress::new(0x0400_0000),
            0,
            MemoryAttribute::DeviceNgnre,
        )
        .expect("no-op");
        assert_eq!(t.l2_tables_used(), 0);
        assert_eq!(t.mapped_blocks(), 0);
    }

    #[test]
    fn duplicates_are_rejected_and_leave_the_entry() {
        let mut t = tables();
        let va = VirtualAddress::new(0x0800_0000);
        t.add_single_mapping(va, PhysicalAddress::new(0x1000_0000), MemoryAttribute::Normal)
            .expect("first");
        let err = t
            .add_single_mapping(
                va,
                PhysicalAddress::new(0x2000_0000),
                MemoryAttribute::DeviceNgnrne,
            )
            .unwrap_err();
        assert_eq!(err, MapError::DuplicateMapping(va));

        let tr = t.translate(va).expect("still mapped");
        assert_eq!(tr.address, PhysicalAddress::new(0x1000_0000));
        assert_eq!(tr.attribute, MemoryAttribute::Normal);
    }

    #[test]
    fn multi_block_mapping_advances_in_lockstep() {
        let mut t = tables();
        t.add_mapping(
            VirtualAddress::new(0x20_0000_0000),
            PhysicalAddress::new(0x0200_0000),
            4 * BLOCK_SIZE,
            MemoryAttribute::DeviceNgnrne,
        )
        .expect("map");

        assert_eq!(t.mapped_blocks(), 4);
        for i in 0..4 {
            let tr = t
                .translate(VirtualAddress::new(0x20_0000_0000 + i * BLOCK_SIZE + 8))
                .expect("mapped");
            assert_eq!(tr.address.as_u64(), 0x0200_0000 + i * BLOCK_SIZE + 8);
        }
        assert_eq!(t.translate(VirtualAddress::new(0x20_0000_0000 + 4 * BLOCK_SIZE)), None);
    }

    #[test]
    fn partial_failure_keeps_earlier_blocks() {
        let mut t = tables();
        let taken = VirtualAddress::new(2 * BLOCK_SIZE);
        t.add_single_mapping(taken, PhysicalAddress::zero(), MemoryAttribute::Normal)
            .expect("pre-map");

        let err = t
            .add_mapping(
                VirtualAddress::zero(),
                PhysicalAddress::new(0x10_0000_0000),
                4 * BLOCK_SIZE,
                MemoryAttribute::Normal,
            )
            .unwrap_err();
        assert_eq!(err, MapError::DuplicateMapping(taken));
        assert!(t.translate(VirtualAddress::zero()).is_some());
        assert!(t.translate(VirtualAddress::new(BLOCK_SIZE)).is_some());
        assert!(t.translate(VirtualAddress::new(3 * BLOCK_SIZE)).is_none());
    }

    #[test]
    fn pool_exhausts_on_the_eleventh_l1_slot() {
        let mut t = tables();
        let l1_span = 1u64 << 36;
        for i in 0..MAX_L2_TABLES as u64 {
            t.add_single_mapping(
                VirtualAddress::new(i * l1_span),
                PhysicalAddress::zero(),
                MemoryAttribute::Normal,
            )
            .expect("within pool");
        }
        let eleventh = VirtualAddress::new(MAX_L2_TABLES as u64 * l1_span);
        assert_eq!(
            t.add_single_mapping(eleventh, PhysicalAddress::zero(), MemoryAttribute::Normal),
            Err(MapError::PoolExhausted(eleventh))
        );

        // Slots that already have a table keep working.
        t.add_single_mapping(
            VirtualAddress::new(BLOCK_SIZE),
            PhysicalAddress::zero(),
            MemoryAttribute::Normal,
        )
        .expect("existing table");
    }

    #[test]
    fn errors_render() {
        let err = MapError::Unaligned {
            field: MappingField::To,
            value: 0x1000,
        };
        assert_eq!(err.to_string(), "to is not a multiple of 32 MiB: 0x1000");
        assert_eq!(
            MapError::PoolExhausted(VirtualAddress::new(0x20_0000_0000)).to_string(),
            "no level-2 table left for 0x0000002000000000"
        );
    }
}
