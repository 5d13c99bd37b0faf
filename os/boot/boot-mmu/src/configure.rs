//! Programming the EL2 translation regime.
//!
//! Every function here issues a fixed instruction sequence through a
//! [`Cpu`]; the order matters and is covered by the tests below.

use crate::MmuConfig;
use boot_cache::{SetWayOp, whole_cache_op};
use boot_memory_addresses::PhysicalAddress;
use boot_registers::{
    Barrier, Cacheability, Cpu, Granule, MairEl2, SctlrEl2, Shareability, TcrEl2, Ttbr0El2,
};
use boot_vmem::MemoryAttribute;

/// `MAIR_EL2` with one slot per [`MemoryAttribute`].
#[must_use]
pub const fn mair() -> MairEl2 {
    let mut mair = MairEl2::new();
    let mut i = 0;
    while i < MemoryAttribute::ALL.len() {
        let attr = MemoryAttribute::ALL[i];
        mair = mair.with_attr(attr.index(), attr.mair_encoding());
        i += 1;
    }
    mair
}

/// `TCR_EL2` for the 16 KiB granule and the configured physical address size.
#[must_use]
pub const fn tcr(config: &MmuConfig) -> TcrEl2 {
    let tcr = TcrEl2::new()
        .with_granule(Granule::Size16K)
        .with_physical_address_size(config.physical_address_size);

    if config.cacheable_table_walks {
        tcr.with_walk_attributes(Cacheability::WriteBackWriteAllocate, Shareability::InnerShareable)
            .with_input_address_bits(48)
    } else {
        tcr
    }
}

/// Load `MAIR_EL2`, `TCR_EL2` and `TTBR0_EL2`, then make the new regime
/// visible: `dsb ishst; tlbi alle2is; dsb ish; isb`.
pub fn configure_registers<C: Cpu>(cpu: &mut C, root: PhysicalAddress, config: &MmuConfig) {
    let mair = mair();
    let tcr = tcr(config);
    let ttbr = Ttbr0El2::from_table(root);

    log::debug!(
        "MMU: MAIR_EL2={:#018x} TCR_EL2={:#018x} TTBR0_EL2={root}",
        mair.into_bits(),
        tcr.into_bits()
    );

    cpu.store(mair);
    cpu.store(tcr);
    cpu.store(ttbr);

    cpu.barrier(Barrier::DsbIshSt);
    cpu.tlb_invalidate_all();
    cpu.barrier(Barrier::DsbIsh);
    cpu.barrier(Barrier::Isb);
}

/// Set `SCTLR_EL2.{I, C, M}`, preserving every other bit.
pub fn enable<C: Cpu>(cpu: &mut C) {
    cpu.barrier(Barrier::Isb);
    let before: SctlrEl2 = cpu.load();
    let after = before.with_translation_and_caches();
    cpu.store(after);
    cpu.barrier(Barrier::Isb);

    log::info!(
        "MMU: enabled, SCTLR_EL2 {:#010x} -> {:#010x}",
        before.into_bits(),
        after.into_bits()
    );
}

/// Clear `SCTLR_EL2.{I, C, M}`, then clean and invalidate the data caches by
/// set/way so nothing dirty outlives the cacheable mappings.
pub fn disable<C: Cpu>(cpu: &mut C) {
    cpu.barrier(Barrier::Isb);
    let before: SctlrEl2 = cpu.load();
    let after = before.without_translation_and_caches();
    cpu.store(after);
    cpu.barrier(Barrier::Isb);

    whole_cache_op(cpu, SetWayOp::CleanInvalidate);

    log::info!(
        "MMU: disabled, SCTLR_EL2 {:#010x} -> {:#010x}",
        before.into_bits(),
        after.into_bits()
    );
}

/// `SCTLR_EL2.M`.
pub fn is_enabled<C: Cpu>(cpu: &mut C) -> bool {
    cpu.load::<SctlrEl2>().m_mmu_enable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_registers::{Event, PhysicalAddressSize, RecordingCpu, SysReg};

    const SCTLR_RES1: u64 = 0x30C5_0830;

    #[test]
    fn mair_slots() {
        assert_eq!(mair().into_bits(), 0x04_00_ff);
    }

    #[test]
    fn default_tcr() {
        assert_eq!(tcr(&MmuConfig::DEFAULT).into_bits(), (0b10 << 14) | (0b010 << 16));
    }

    #[test]
    fn tcr_with_cacheable_walks() {
        let config = MmuConfig {
            physical_address_size: PhysicalAddressSize::Bits48,
            cacheable_table_walks: true,
        };
        assert_eq!(
            tcr(&config).into_bits(),
            (0b101 << 16) | (0b10 << 14) | (0b11 << 12) | (0b01 << 10) | (0b01 << 8) | 16
        );
    }

    #[test]
    fn registers_then_barriers_in_order() {
        let mut cpu = RecordingCpu::new();
        let root = PhysicalAddress::new(0x0008_0010_0000);
        configure_registers(&mut cpu, root, &MmuConfig::DEFAULT);

        assert_eq!(
            cpu.events(),
            [
                Event::Write(SysReg::MairEl2, 0x04_00_ff),
                Event::Write(SysReg::TcrEl2, (0b10 << 14) | (0b010 << 16)),
                Event::Write(SysReg::Ttbr0El2, root.as_u64()),
                Event::Barrier(Barrier::DsbIshSt),
                Event::TlbInvalidateAll,
                Event::Barrier(Barrier::DsbIsh),
                Event::Barrier(Barrier::Isb),
            ]
        );
    }

    #[test]
    fn enable_sets_three_bits() {
        let mut cpu = RecordingCpu::new().with_register(SysReg::SctlrEl2, SCTLR_RES1);
        assert!(!is_enabled(&mut cpu));
        cpu.clear_events();

        enable(&mut cpu);
        assert_eq!(
            cpu.take_events(),
            [
                Event::Barrier(Barrier::Isb),
                Event::Read(SysReg::SctlrEl2),
                Event::Write(SysReg::SctlrEl2, SCTLR_RES1 | 0x1005),
                Event::Barrier(Barrier::Isb),
            ]
        );
        assert!(is_enabled(&mut cpu));
    }

    #[test]
    fn disable_clears_bits_then_flushes() {
        let mut cpu = RecordingCpu::new().with_register(SysReg::SctlrEl2, SCTLR_RES1 | 0x1005);
        disable(&mut cpu);

        let events = cpu.take_events();
        assert_eq!(
            events[..4],
            [
                Event::Barrier(Barrier::Isb),
                Event::Read(SysReg::SctlrEl2),
                Event::Write(SysReg::SctlrEl2, SCTLR_RES1),
                Event::Barrier(Barrier::Isb),
            ]
        );
        // Whole-cache walk: CLIDR read, then the closing barriers.
        assert_eq!(events[4], Event::Read(SysReg::ClidrEl1));
        assert_eq!(
            events[events.len() - 2..],
            [Event::Barrier(Barrier::DsbSy), Event::Barrier(Barrier::Isb)]
        );
        assert!(!is_enabled(&mut cpu));
    }
}
