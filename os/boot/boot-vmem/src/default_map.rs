//! The fixed boot memory map.

use crate::{MapError, MemoryAttribute, PageTables};
use boot_memory_addresses::{PhysicalAddress, VirtualAddress};
use core::fmt;

/// A contiguous range of virtual addresses mapped onto physical memory.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Region {
    pub virt: VirtualAddress,
    pub phys: PhysicalAddress,
    pub size: u64,
    pub attribute: MemoryAttribute,
}

impl Region {
    #[must_use]
    pub const fn new(virt: u64, phys: u64, size: u64, attribute: MemoryAttribute) -> Self {
        Self {
            virt: VirtualAddress::new(virt),
            phys: PhysicalAddress::new(phys),
            size,
            attribute,
        }
    }

    /// A region whose virtual and physical addresses coincide.
    #[must_use]
    pub const fn identity(base: u64, size: u64, attribute: MemoryAttribute) -> Self {
        Self::new(base, base, size, attribute)
    }

    /// One past the last physical byte.
    #[must_use]
    pub const fn physical_end(&self) -> u64 {
        self.phys.as_u64() + self.size
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} -> {} ({} MiB, {})",
            self.virt,
            VirtualAddress::new(self.virt.as_u64() + self.size),
            self.phys,
            self.size >> 20,
            self.attribute
        )
    }
}

/// MMIO, identity mapped and strongly ordered.
pub const MMIO: Region = Region::identity(0, 0x08_0000_0000, MemoryAttribute::DeviceNgnrne);

/// The same MMIO window again, with early write acknowledgement.
pub const MMIO_RELAXED: Region =
    Region::new(0xf0_0000_0000, 0, 0x08_0000_0000, MemoryAttribute::DeviceNgnre);

/// DRAM, identity mapped and cacheable.
pub const RAM: Region = Region::identity(0x08_0000_0000, 0x04_0000_0000, MemoryAttribute::Normal);

/// Everything [`PageTables::add_default_mappings`] installs, in order.
pub const DEFAULT_REGIONS: [Region; 3] = [MMIO, MMIO_RELAXED, RAM];

/// Highest `physical_end` over `regions`; zero for an empty slice.
#[must_use]
pub const fn physical_limit(regions: &[Region]) -> u64 {
    let mut limit = 0;
    let mut i = 0;
    while i < regions.len() {
        let end = regions[i].physical_end();
        if end > limit {
            limit = end;
        }
        i += 1;
    }
    limit
}

impl PageTables {
    /// Map one [`Region`].
    ///
    /// # Errors
    /// As [`add_mapping`](Self::add_mapping).
    pub fn map_region(&mut self, region: &Region) -> Result<(), MapError> {
        self.add_mapping(region.virt, region.phys, region.size, region.attribute)
    }

    /// Install [`DEFAULT_REGIONS`].
    ///
    /// # Errors
    /// Only if the arena already holds conflicting mappings.
    pub fn add_default_mappings(&mut self) -> Result<(), MapError> {
        for region in &DEFAULT_REGIONS {
            log::debug!("MMU: mapping {region}");
            self.map_region(region)?;
        }
        Ok(())
    }
}
