//! # Early-boot MMU bring-up (aarch64, EL2)
//!
//! Ties the pieces together:
//!
//! 1. [`PageTables::initialize`] and [`PageTables::add_default_mappings`]
//!    build the tables,
//! 2. [`configure::configure_registers`] loads `MAIR_EL2`, `TCR_EL2` and
//!    `TTBR0_EL2` and invalidates the TLBs,
//! 3. [`configure::enable`] turns on translation and both caches.
//!
//! Failures are fatal: [`Mmu::init`] and [`Mmu::add_mapping`] panic with an
//! `MMU:`-prefixed message, and the firmware's panic handler halts. The
//! `try_` variants return the error instead.
//!
//! ```rust,ignore
//! static mut TABLES: PageTables = PageTables::new();
//!
//! // SAFETY: EL2, single core, nothing else touches the translation regime.
//! let cpu = unsafe { El2Cpu::new() };
//! let mut mmu = mmu_init(unsafe { &mut *core::ptr::addr_of_mut!(TABLES) }, cpu);
//! mmu.add_mapping(fb_va, fb_pa, fb_len, MemoryAttribute::DeviceNgnre);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod config;
pub mod configure;

pub use crate::config::{ConfigError, MmuConfig};
pub use boot_vmem::{MapError, MemoryAttribute, PageTables};

#[cfg(feature = "asm")]
#[cfg(target_arch = "aarch64")]
pub use boot_registers::El2Cpu;

use boot_cache::{CacheLineOp, range_op};
use boot_memory_addresses::{PhysicalAddress, VirtualAddress};
use boot_registers::{Barrier, Cpu};

/// Anything that stops the MMU from coming up.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MmuError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("translation is already enabled")]
    AlreadyEnabled,
}

/// The translation tables together with the core they are installed on.
pub struct Mmu<'t, C: Cpu> {
    tables: &'t mut PageTables,
    cpu: C,
    config: MmuConfig,
}

impl<'t, C: Cpu> Mmu<'t, C> {
    /// Pair `tables` with `cpu`. Nothing is touched until [`init`](Self::init).
    ///
    /// # Errors
    /// [`MmuError::Config`] if `config` does not validate.
    pub fn new(tables: &'t mut PageTables, cpu: C, config: MmuConfig) -> Result<Self, MmuError> {
        config.validate()?;
        Ok(Self { tables, cpu, config })
    }

    /// As [`new`](Self::new) with [`MmuConfig::DEFAULT`], which always validates.
    pub const fn with_default_config(tables: &'t mut PageTables, cpu: C) -> Self {
        Self {
            tables,
            cpu,
            config: MmuConfig::DEFAULT,
        }
    }

    /// Build the default tables, program the registers and enable
    /// translation and caches.
    ///
    /// The tables must not move afterwards: `TTBR0_EL2` and the table
    /// descriptors hold their addresses.
    ///
    /// # Errors
    /// - [`MmuError::AlreadyEnabled`] if `SCTLR_EL2.M` is set; the live
    ///   tables are not rewritten. Call [`shutdown`](Self::shutdown) first.
    /// - [`MmuError::Map`] if the default map cannot be installed; the
    ///   registers are left untouched in that case.
    pub fn try_init(&mut self) -> Result<(), MmuError> {
        if self.is_enabled() {
            return Err(MmuError::AlreadyEnabled);
        }

        log::info!("MMU: initializing page tables");
        self.tables.initialize();
        self.tables.add_default_mappings()?;
        log::debug!(
            "MMU: {} L2 tables, {} blocks mapped",
            self.tables.l2_tables_used(),
            self.tables.mapped_blocks()
        );

        configure::configure_registers(&mut self.cpu, self.tables.root_address(), &self.config);
        configure::enable(&mut self.cpu);
        Ok(())
    }

    /// [`try_init`](Self::try_init), fatal on error.
    ///
    /// # Panics
    /// If translation is already on or the tables cannot be built.
    pub fn init(&mut self) {
        if let Err(err) = self.try_init() {
            panic!("MMU: {err}");
        }
    }

    /// Disable translation and caches and flush the data caches.
    pub fn shutdown(&mut self) {
        configure::disable(&mut self.cpu);
    }

    /// Map `size` bytes at `from` onto `to`.
    ///
    /// If translation is already on, the table memory is cleaned to the
    /// point of coherency afterwards so the walker sees the new blocks.
    ///
    /// # Errors
    /// Any [`MapError`] from [`PageTables::add_mapping`]. Blocks mapped
    /// before the failure stay mapped, and are still made visible.
    pub fn try_add_mapping(
        &mut self,
        from: VirtualAddress,
        to: PhysicalAddress,
        size: u64,
        attr: MemoryAttribute,
    ) -> Result<(), MmuError> {
        log::debug!("MMU: mapping {from} -> {to} ({size:#x} bytes, {attr})");
        let result = self.tables.add_mapping(from, to, size, attr);
        if self.is_enabled() {
            self.publish_tables();
        }
        result.map_err(MmuError::from)
    }

    /// [`try_add_mapping`](Self::try_add_mapping), fatal on error.
    ///
    /// # Panics
    /// If the mapping is rejected.
    pub fn add_mapping(
        &mut self,
        from: VirtualAddress,
        to: PhysicalAddress,
        size: u64,
        attr: MemoryAttribute,
    ) {
        if let Err(err) = self.try_add_mapping(from, to, size, attr) {
            panic!("MMU: {err}");
        }
    }

    /// `SCTLR_EL2.M`.
    pub fn is_enabled(&mut self) -> bool {
        configure::is_enabled(&mut self.cpu)
    }

    #[must_use]
    pub fn tables(&self) -> &PageTables {
        &*self.tables
    }

    pub const fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    fn publish_tables(&mut self) {
        let (start, len) = self.tables.table_memory();
        range_op(&mut self.cpu, CacheLineOp::DcCvac, start, len);
        self.cpu.barrier(Barrier::DsbIshSt);
        self.cpu.barrier(Barrier::Isb);
    }
}

/// Bring up the MMU with [`MmuConfig::DEFAULT`] and the default memory map.
///
/// Returns the handle for later [`Mmu::add_mapping`] calls.
///
/// # Panics
/// If the tables cannot be built.
pub fn mmu_init<C: Cpu>(tables: &mut PageTables, cpu: C) -> Mmu<'_, C> {
    let mut mmu = Mmu::with_default_config(tables, cpu);
    mmu.init();
    mmu
}

/// Turn translation and caches off and flush the data caches.
pub fn mmu_shutdown<C: Cpu>(mut cpu: C) {
    configure::disable(&mut cpu);
}
