//! The real thing: `mrs`/`msr`, barriers, TLB and cache maintenance at EL2.

use crate::{Barrier, CacheLineOp, Cpu, SetWayOp, SysReg};
use boot_memory_addresses::VirtualAddress;
use core::arch::asm;

macro_rules! mrs {
    ($name:literal) => {{
        let value: u64;
        unsafe {
            asm!(
                concat!("mrs {}, ", $name),
                out(reg) value,
                options(nomem, nostack, preserves_flags)
            );
        }
        value
    }};
}

macro_rules! msr {
    ($name:literal, $value:expr) => {{
        let value: u64 = $value;
        unsafe {
            asm!(concat!("msr ", $name, ", {}"), in(reg) value, options(nostack, preserves_flags));
        }
    }};
}

macro_rules! by_address {
    ($insn:literal, $address:expr) => {{
        let address: u64 = $address;
        unsafe {
            asm!(concat!($insn, ", {}"), in(reg) address, options(nostack, preserves_flags));
        }
    }};
}

/// [`Cpu`] backed by the executing core, running at EL2.
#[derive(Debug)]
pub struct El2Cpu {
    _private: (),
}

impl El2Cpu {
    /// Create a handle to the executing core.
    ///
    /// # Safety
    /// The caller must be running at EL2 on an aarch64 core, single threaded,
    /// and must be the only party reprogramming the translation regime and
    /// caches while the handle is alive. Register writes issued through it
    /// change how every subsequent memory access is translated.
    #[must_use]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Cpu for El2Cpu {
    fn read_raw(&mut self, reg: SysReg) -> u64 {
        match reg {
            SysReg::SctlrEl2 => mrs!("sctlr_el2"),
            SysReg::TcrEl2 => mrs!("tcr_el2"),
            SysReg::MairEl2 => mrs!("mair_el2"),
            SysReg::Ttbr0El2 => mrs!("ttbr0_el2"),
            SysReg::ClidrEl1 => mrs!("clidr_el1"),
            SysReg::CsselrEl1 => mrs!("csselr_el1"),
            SysReg::CcsidrEl1 => mrs!("ccsidr_el1"),
        }
    }

    fn write_raw(&mut self, reg: SysReg, value: u64) {
        match reg {
            SysReg::SctlrEl2 => msr!("sctlr_el2", value),
            SysReg::TcrEl2 => msr!("tcr_el2", value),
            SysReg::MairEl2 => msr!("mair_el2", value),
            SysReg::Ttbr0El2 => msr!("ttbr0_el2", value),
            SysReg::CsselrEl1 => msr!("csselr_el1", value),
            SysReg::ClidrEl1 | SysReg::CcsidrEl1 => {
                debug_assert!(reg.is_writable(), "{} is read-only", reg.name());
            }
        }
    }

    fn barrier(&mut self, barrier: Barrier) {
        unsafe {
            match barrier {
                Barrier::DsbIshSt => asm!("dsb ishst", options(nostack, preserves_flags)),
                Barrier::DsbIsh => asm!("dsb ish", options(nostack, preserves_flags)),
                Barrier::DsbSy => asm!("dsb sy", options(nostack, preserves_flags)),
                Barrier::Isb => asm!("isb", options(nostack, preserves_flags)),
            }
        }
    }

    fn tlb_invalidate_all(&mut self) {
        unsafe {
            asm!("tlbi alle2is", options(nostack, preserves_flags));
        }
    }

    fn cache_line(&mut self, op: CacheLineOp, address: VirtualAddress) {
        let address = address.as_u64();
        match op {
            CacheLineOp::IcIvau => by_address!("ic ivau", address),
            CacheLineOp::DcIvac => by_address!("dc ivac", address),
            CacheLineOp::DcZva => by_address!("dc zva", address),
            CacheLineOp::DcCvac => by_address!("dc cvac", address),
            CacheLineOp::DcCvau => by_address!("dc cvau", address),
            CacheLineOp::DcCivac => by_address!("dc civac", address),
        }
    }

    fn cache_set_way(&mut self, op: SetWayOp, operand: u64) {
        match op {
            SetWayOp::Invalidate => by_address!("dc isw", operand),
            SetWayOp::CleanInvalidate => by_address!("dc cisw", operand),
            SetWayOp::Clean => by_address!("dc csw", operand),
        }
    }
}
