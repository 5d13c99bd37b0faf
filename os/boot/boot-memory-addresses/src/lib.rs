//! # Virtual and Physical Memory Address Types (aarch64, 16 KiB granule)
//!
//! Strongly typed wrappers for raw memory addresses and block bases used by
//! the early-boot translation table code.
//!
//! ## Overview
//!
//! The types prevent mixing virtual and physical addresses at compile time
//! while remaining zero-cost wrappers around `u64` values:
//!
//! | Concept | Generic | Description |
//! |----------|----------|-------------|
//! | [`MemoryAddress`] | – | A raw 64-bit address, either physical or virtual. |
//! | [`MemoryPage<S>`] | [`S: PageSize`](PageSize) | An aligned base address of a region of size `S`. |
//! | [`MemoryAddressOffset<S>`] | [`S: PageSize`](PageSize) | An offset within a region of size `S`. |
//!
//! These are then wrapped to distinguish between virtual and physical spaces:
//!
//! | Wrapper | Meaning |
//! |----------|----------|
//! | [`VirtualAddress`] | Refers to translated memory (what the CPU issues). |
//! | [`PhysicalAddress`] / [`PhysicalPage<S>`] | Refer to physical memory or MMIO regions. |
//!
//! ## Sizes
//!
//! The firmware runs with the 16 KiB translation granule and only ever maps
//! 32 MiB blocks out of level-2 tables, so two marker types implement
//! [`PageSize`]:
//!
//! - [`Size16K`] — the translation granule; every table is aligned to it.
//! - [`Size32M`] — a level-2 block, the only mapping granularity.
//!
//! ```rust
//! # use boot_memory_addresses::*;
//! let va = VirtualAddress::new(0x08_0000_0001);
//! assert!(!va.is_aligned::<Size32M>());
//! assert_eq!(va.align_down::<Size32M>().as_u64(), 0x08_0000_0000);
//! assert_eq!(va.offset::<Size32M>().as_u64(), 1);
//!
//! let pa = PhysicalAddress::new(0x08_0200_0000);
//! let (page, off) = pa.split::<Size32M>();
//! assert_eq!(page.join(off), pa);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod memory_address;
mod memory_address_offset;
mod memory_page;
mod page_size;
mod physical_address;
mod virtual_address;

pub use crate::memory_address::MemoryAddress;
pub use crate::memory_address_offset::MemoryAddressOffset;
pub use crate::memory_page::MemoryPage;
pub use crate::page_size::{PageSize, Size16K, Size32M};
pub use crate::physical_address::{PhysicalAddress, PhysicalPage};
pub use crate::virtual_address::VirtualAddress;
