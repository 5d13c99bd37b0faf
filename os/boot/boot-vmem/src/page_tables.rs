//! # The boot translation table arena
//!
//! All tables live in one [`PageTables`] value:
//!
//! ```text
//! L0 (2 entries) ──► L1[0] (2048) ──► L2 pool (≤ 10 × 2048, bump allocated)
//!                └─► L1[1] (2048) ──┘
//! ```
//!
//! Descriptors hold the identity-mapped addresses of the tables they point
//! at, so once [`PageTables::initialize`] has run the arena must stay where
//! it is. Software walks never dereference those addresses; they are mapped
//! back to arena slots and bounds-checked.

use crate::index::{L1Index, split_indices};
use crate::{Descriptor, L0Index, L0Table, MapError, MemoryAttribute, TranslationTable};
use boot_memory_addresses::{PhysicalAddress, PhysicalPage, Size32M, VirtualAddress};

/// Number of level-1 tables (one per level-0 entry).
pub const L1_TABLES: usize = 2;

/// Capacity of the level-2 pool.
pub const MAX_L2_TABLES: usize = 10;

/// Result of a successful software table walk.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Translation {
    /// The 32 MiB block the address falls into.
    pub block: PhysicalPage<Size32M>,
    /// The translated address (block base plus the low 25 bits of the input).
    pub address: PhysicalAddress,
    /// Memory type of the block.
    pub attribute: MemoryAttribute,
}

/// Storage for every translation table the boot code will ever build.
///
/// `new()` is `const`, so firmware can keep the arena in a `static`; host
/// tests put it in a `Box`.
#[repr(C)]
pub struct PageTables {
    l0: L0Table,
    l1: [TranslationTable; L1_TABLES],
    l2: [TranslationTable; MAX_L2_TABLES],
    l2_used: usize,
}

impl PageTables {
    /// An all-zero arena. Call [`initialize`](Self::initialize) before mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            l0: L0Table::new(),
            l1: [const { TranslationTable::new() }; L1_TABLES],
            l2: [const { TranslationTable::new() }; MAX_L2_TABLES],
            l2_used: 0,
        }
    }

    /// Zero every table, forget all level-2 allocations and link both
    /// level-0 entries to their level-1 tables.
    ///
    /// Idempotent. Must not be called while the tables are live in `TTBR0_EL2`.
    pub fn initialize(&mut self) {
        self.l0.clear();
        for table in &mut self.l1 {
            table.clear();
        }
        for table in &mut self.l2 {
            table.clear();
        }
        self.l2_used = 0;

        for i in 0..L1_TABLES {
            #[allow(clippy::cast_possible_truncation)]
            let index = L0Index::new(i as u8);
            let link = Descriptor::table(self.l1[i].physical_page());
            self.l0.set(index, link);
        }
    }

    /// The level-1 table covering `va`.
    #[inline]
    #[must_use]
    pub fn l1_table(&self, va: VirtualAddress) -> &TranslationTable {
        &self.l1[L0Index::from(va).as_usize()]
    }

    /// The level-1 table covering `va`, mutably.
    #[inline]
    pub fn l1_table_mut(&mut self, va: VirtualAddress) -> &mut TranslationTable {
        &mut self.l1[L0Index::from(va).as_usize()]
    }

    /// The level-2 table covering `va`, allocating and linking one from the
    /// pool if the level-1 entry is still empty.
    ///
    /// # Errors
    /// [`MapError::PoolExhausted`] if a table is needed and all
    /// [`MAX_L2_TABLES`] are taken.
    ///
    /// # Panics
    /// If the level-1 entry is populated but does not point into this
    /// arena's level-2 pool, i.e. the arena was moved after
    /// [`initialize`](Self::initialize).
    pub fn l2_table(&mut self, va: VirtualAddress) -> Result<&mut TranslationTable, MapError> {
        let l1_index = L1Index::from(va);
        let entry = self.l1_table(va).l1_entry(l1_index);

        let slot = if entry.is_zero() {
            if self.l2_used == MAX_L2_TABLES {
                return Err(MapError::PoolExhausted(va));
            }
            let slot = self.l2_used;
            self.l2_used += 1;

            let link = Descriptor::table(self.l2[slot].physical_page());
            self.l1_table_mut(va).set_l1_entry(l1_index, link);
            log::trace!("MMU: L2 table {slot} linked for {va}");
            slot
        } else {
            let Some(slot) = entry.as_table().and_then(|t| self.l2_slot(t.base())) else {
                panic!("L1 entry {entry:?} for {va} is not a table in this arena");
            };
            slot
        };

        Ok(&mut self.l2[slot])
    }

    /// Walk the tables for `va` the way the hardware would.
    ///
    /// `None` if any level is invalid, a table descriptor points outside the
    /// arena, or the block names an attribute slot that is not programmed.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Option<Translation> {
        let (l0, l1, l2) = split_indices(va);

        let l1_table = self.l0.get(l0).as_table()?;
        let l1_slot = slot_of(&self.l1, l1_table.base())?;

        let l2_table = self.l1[l1_slot].l1_entry(l1).as_table()?;
        let l2_slot = self.l2_slot(l2_table.base())?;

        let (block, attribute) = self.l2[l2_slot].l2_entry(l2).as_block()?;
        Some(Translation {
            block,
            address: block.join(va.offset::<Size32M>()),
            attribute: attribute?,
        })
    }

    /// Physical address of the level-0 table, the value for `TTBR0_EL2`.
    #[inline]
    #[must_use]
    pub fn root_address(&self) -> PhysicalAddress {
        self.l0.physical_page().base()
    }

    /// Number of level-2 tables handed out since the last `initialize`.
    #[inline]
    #[must_use]
    pub const fn l2_tables_used(&self) -> usize {
        self.l2_used
    }

    /// Start and length of the arena, for cache maintenance.
    #[inline]
    #[must_use]
    pub fn table_memory(&self) -> (VirtualAddress, usize) {
        (VirtualAddress::from_ptr(self), size_of::<Self>())
    }

    /// Number of populated level-2 entries, i.e. mapped blocks.
    #[must_use]
    pub fn mapped_blocks(&self) -> usize {
        self.l2[..self.l2_used].iter().map(TranslationTable::populated).sum()
    }

    fn l2_slot(&self, table: PhysicalAddress) -> Option<usize> {
        slot_of(&self.l2[..self.l2_used], table)
    }
}

impl Default for PageTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the table in `tables` that starts at `address`.
fn slot_of(tables: &[TranslationTable], address: PhysicalAddress) -> Option<usize> {
    let base = PhysicalAddress::from_ptr(tables.as_ptr()).as_u64();
    let offset = address.as_u64().checked_sub(base)?;
    let stride = size_of::<TranslationTable>() as u64;
    if offset % stride != 0 {
        return None;
    }
    let slot = usize::try_from(offset / stride).ok()?;
    (slot < tables.len()).then_some(slot)
}
