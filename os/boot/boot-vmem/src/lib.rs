//! # Boot translation tables (aarch64, EL2, 16 KiB granule)
//!
//! Builds the static three-level translation tables the firmware runs on:
//! a two-entry level-0 table, two level-1 tables and a small pool of level-2
//! tables whose entries map 32 MiB blocks.
//!
//! ## Layout
//!
//! - [`index`]: splitting a virtual address into [`L0Index`], [`L1Index`],
//!   [`L2Index`] and the block offset.
//! - [`Descriptor`]: the table / block descriptor bitfield.
//! - [`L0Table`], [`TranslationTable`]: aligned descriptor arrays.
//! - [`PageTables`]: the arena holding every table plus the level-2 bump
//!   allocator.
//! - [`PageTables::add_mapping`] and friends: the block mapping engine.
//! - [`DEFAULT_REGIONS`]: the fixed boot memory map.
//!
//! ## Example
//!
//! ```rust
//! # use boot_vmem::*;
//! # use boot_memory_addresses::{PhysicalAddress, VirtualAddress};
//! let mut tables = Box::new(PageTables::new());
//! tables.initialize();
//! tables.add_default_mappings()?;
//!
//! let t = tables.translate(VirtualAddress::new(0xf0_0000_0040)).unwrap();
//! assert_eq!(t.address, PhysicalAddress::new(0x40));
//! assert_eq!(t.attribute, MemoryAttribute::DeviceNgnre);
//! # Ok::<(), MapError>(())
//! ```
//!
//! Nothing here touches system registers or caches; after editing live
//! tables the caller owns the cache and TLB maintenance.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod attributes;
mod default_map;
mod descriptor;
pub mod index;
mod mapping;
mod page_tables;
mod table;

pub use crate::attributes::MemoryAttribute;
pub use crate::default_map::{DEFAULT_REGIONS, MMIO, MMIO_RELAXED, RAM, Region, physical_limit};
pub use crate::descriptor::{Descriptor, DescriptorKind};
pub use crate::index::{L0Index, L1Index, L2Index, extract_address};
pub use crate::mapping::{MapError, MappingField};
pub use crate::page_tables::{L1_TABLES, MAX_L2_TABLES, PageTables, Translation};
pub use crate::table::{L0Table, TranslationTable};

use boot_memory_addresses::{PageSize, Size32M};

/// Size of one level-2 block, the only mapping granularity.
pub const BLOCK_SIZE: u64 = Size32M::SIZE;
