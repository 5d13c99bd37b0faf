//! # Typed `AArch64` System Registers
//!
//! Bitfield models of the system registers the early-boot MMU code touches,
//! plus the [`Cpu`] trait: the single seam through which register accesses,
//! barriers, TLB invalidation and cache maintenance instructions reach the
//! hardware.
//!
//! | Register | Type | Used for |
//! |----------|------|----------|
//! | `SCTLR_EL2` | [`SctlrEl2`] | MMU / data cache / instruction cache enable |
//! | `TCR_EL2` | [`TcrEl2`] | granule, physical address size, walk attributes |
//! | `MAIR_EL2` | [`MairEl2`] | the eight memory attribute slots |
//! | `TTBR0_EL2` | [`Ttbr0El2`] | root translation table address |
//! | `CLIDR_EL1` | [`ClidrEl1`] | cache hierarchy discovery |
//! | `CSSELR_EL1` | [`CsselrEl1`] | selects the cache described by `CCSIDR_EL1` |
//! | `CCSIDR_EL1` | [`CcsidrEl1`] | line size, associativity and sets of one cache |
//!
//! Two [`Cpu`] implementations exist:
//!
//! - [`El2Cpu`] issues the real instructions (`asm` feature, aarch64 only).
//! - [`RecordingCpu`] keeps a register file in memory and records every
//!   intrinsic as an [`Event`] (`recording` feature), so the MMU code can be
//!   exercised on the build host.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(any(test, feature = "recording"))]
extern crate alloc;

mod ccsidr_el1;
mod clidr_el1;
mod csselr_el1;
mod mair_el2;
mod ops;
mod sctlr_el2;
mod tcr_el2;
mod ttbr0_el2;

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
mod el2;

#[cfg(any(test, feature = "recording"))]
mod recording;

pub use crate::ccsidr_el1::CcsidrEl1;
pub use crate::clidr_el1::{CacheType, ClidrEl1};
pub use crate::csselr_el1::CsselrEl1;
pub use crate::mair_el2::MairEl2;
pub use crate::ops::{Barrier, CacheLineOp, SetWayOp};
pub use crate::sctlr_el2::SctlrEl2;
pub use crate::tcr_el2::{Cacheability, Granule, PhysicalAddressSize, Shareability, TcrEl2};
pub use crate::ttbr0_el2::Ttbr0El2;

#[cfg(all(feature = "asm", target_arch = "aarch64"))]
pub use crate::el2::El2Cpu;

#[cfg(any(test, feature = "recording"))]
pub use crate::recording::{Event, RecordingCpu};

use boot_memory_addresses::VirtualAddress;

/// Identifies a system register by its architectural name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SysReg {
    SctlrEl2,
    TcrEl2,
    MairEl2,
    Ttbr0El2,
    ClidrEl1,
    CsselrEl1,
    CcsidrEl1,
}

impl SysReg {
    /// Number of modelled registers.
    pub const COUNT: usize = 7;

    /// Architectural (assembler) name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SctlrEl2 => "SCTLR_EL2",
            Self::TcrEl2 => "TCR_EL2",
            Self::MairEl2 => "MAIR_EL2",
            Self::Ttbr0El2 => "TTBR0_EL2",
            Self::ClidrEl1 => "CLIDR_EL1",
            Self::CsselrEl1 => "CSSELR_EL1",
            Self::CcsidrEl1 => "CCSIDR_EL1",
        }
    }

    /// `CLIDR_EL1` and `CCSIDR_EL1` are read-only.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::ClidrEl1 | Self::CcsidrEl1)
    }

    /// Dense index in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A typed view of one system register.
pub trait SystemRegister: Copy {
    /// The register this type models.
    const ID: SysReg;

    fn from_raw(bits: u64) -> Self;

    fn into_raw(self) -> u64;
}

/// Marker for registers that may be written with `msr`.
pub trait WritableRegister: SystemRegister {}

/// The hardware intrinsics used by the boot MMU code.
///
/// Implementations execute (or record) exactly one instruction per call and
/// never insert barriers on their own; ordering is the caller's business.
///
/// The trait methods are safe: obtaining a value that reaches real hardware
/// ([`El2Cpu::new`]) is where the caller takes on the safety obligations.
pub trait Cpu {
    /// `mrs` of `reg`.
    fn read_raw(&mut self, reg: SysReg) -> u64;

    /// `msr` of `reg`. Only called with writable registers.
    fn write_raw(&mut self, reg: SysReg, value: u64);

    /// Execute one barrier instruction.
    fn barrier(&mut self, barrier: Barrier);

    /// `tlbi alle2is`: invalidate all EL2 TLB entries, inner shareable.
    fn tlb_invalidate_all(&mut self);

    /// One cache maintenance instruction for the line containing `address`.
    fn cache_line(&mut self, op: CacheLineOp, address: VirtualAddress);

    /// One set/way data cache maintenance instruction with the encoded operand.
    fn cache_set_way(&mut self, op: SetWayOp, operand: u64);

    /// Read a typed register.
    fn load<R: SystemRegister>(&mut self) -> R
    where
        Self: Sized,
    {
        R::from_raw(self.read_raw(R::ID))
    }

    /// Write a typed register.
    fn store<R: WritableRegister>(&mut self, value: R)
    where
        Self: Sized,
    {
        self.write_raw(R::ID, value.into_raw());
    }
}

impl<C: Cpu + ?Sized> Cpu for &mut C {
    #[inline]
    fn read_raw(&mut self, reg: SysReg) -> u64 {
        (**self).read_raw(reg)
    }

    #[inline]
    fn write_raw(&mut self, reg: SysReg, value: u64) {
        (**self).write_raw(reg, value);
    }

    #[inline]
    fn barrier(&mut self, barrier: Barrier) {
        (**self).barrier(barrier);
    }

    #[inline]
    fn tlb_invalidate_all(&mut self) {
        (**self).tlb_invalidate_all();
    }

    #[inline]
    fn cache_line(&mut self, op: CacheLineOp, address: VirtualAddress) {
        (**self).cache_line(op, address);
    }

    #[inline]
    fn cache_set_way(&mut self, op: SetWayOp, operand: u64) {
        (**self).cache_set_way(op, operand);
    }
}

macro_rules! system_register {
    ($ty:ty, $id:expr) => {
        impl $crate::SystemRegister for $ty {
            const ID: $crate::SysReg = $id;

            #[inline]
            fn from_raw(bits: u64) -> Self {
                Self::from_bits(bits)
            }

            #[inline]
            fn into_raw(self) -> u64 {
                self.into_bits()
            }
        }
    };
    ($ty:ty, $id:expr, writable) => {
        system_register!($ty, $id);
        impl $crate::WritableRegister for $ty {}
    };
}

system_register!(SctlrEl2, SysReg::SctlrEl2, writable);
system_register!(TcrEl2, SysReg::TcrEl2, writable);
system_register!(MairEl2, SysReg::MairEl2, writable);
system_register!(Ttbr0El2, SysReg::Ttbr0El2, writable);
system_register!(CsselrEl1, SysReg::CsselrEl1, writable);
system_register!(ClidrEl1, SysReg::ClidrEl1);
system_register!(CcsidrEl1, SysReg::CcsidrEl1);
