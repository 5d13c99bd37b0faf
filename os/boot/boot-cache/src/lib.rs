//! # Cache maintenance
//!
//! Two primitives, both driven through a [`Cpu`]:
//!
//! - [`range_op`] issues one by-address maintenance instruction per cache
//!   line of a virtual address range.
//! - [`whole_cache_op`] cleans and/or invalidates every data or unified cache
//!   up to the level of coherence by set/way, using the geometry the core
//!   reports in `CLIDR_EL1` / `CCSIDR_EL1`.
//!
//! Neither inserts barriers around the range walk; callers order the
//! maintenance against their own accesses.

#![cfg_attr(not(any(test, doctest)), no_std)]

use boot_memory_addresses::VirtualAddress;
use boot_registers::{Barrier, CcsidrEl1, ClidrEl1, Cpu, CsselrEl1};

pub use boot_registers::{CacheLineOp, SetWayOp};

/// Stride of [`range_op`]: the smallest data cache line of the supported cores.
pub const CACHE_LINE_SIZE: u64 = 64;

/// Issue `op` once per [`CACHE_LINE_SIZE`] line covering `[addr, addr + len)`.
///
/// The walk starts at `addr` itself and continues while the position is below
/// `addr + len`, so a length that is not a line multiple still reaches the
/// final partial line. `len == 0` issues nothing, and so does a range whose
/// end wraps past the top of the address space.
pub fn range_op<C: Cpu>(cpu: &mut C, op: CacheLineOp, addr: VirtualAddress, len: usize) {
    let start = addr.as_u64();
    let end = start.wrapping_add(len as u64);

    let mut position = start;
    while position < end {
        cpu.cache_line(op, VirtualAddress::new(position));
        position = match position.checked_add(CACHE_LINE_SIZE) {
            Some(next) => next,
            None => break,
        };
    }
}

/// Apply `op` to every set and way of every data or unified cache level up to
/// the level of coherence.
///
/// Each level is selected in `CSSELR_EL1` and followed by an `isb` before its
/// `CCSIDR_EL1` is read. A `dsb sy` follows each level; the whole walk ends
/// with `dsb sy; isb`.
pub fn whole_cache_op<C: Cpu>(cpu: &mut C, op: SetWayOp) {
    let clidr: ClidrEl1 = cpu.load();
    let loc = clidr.loc();

    for level in 1..=loc {
        let ty = clidr.cache_type(level);
        if !ty.has_data_cache() {
            continue;
        }

        cpu.store(CsselrEl1::data_or_unified(level));
        cpu.barrier(Barrier::Isb);
        let geometry: CcsidrEl1 = cpu.load();

        log::trace!(
            "cache L{level}: {} ways x {} sets x {} bytes, {op}",
            geometry.ways(),
            geometry.sets(),
            geometry.line_bytes()
        );

        for_each_set_way(&geometry, level, |operand| cpu.cache_set_way(op, operand));
        cpu.barrier(Barrier::DsbSy);
    }

    cpu.barrier(Barrier::DsbSy);
    cpu.barrier(Barrier::Isb);
}

/// Calls `f` with the set/way operand for every line of one cache level.
fn for_each_set_way(geometry: &CcsidrEl1, level: u8, mut f: impl FnMut(u64)) {
    let way_shift = 32 - log2_ceil(geometry.ways());
    let set_shift = geometry.line_shift();
    let level_bits = u64::from(level - 1) << 1;

    for way in 0..geometry.ways() {
        for set in 0..geometry.sets() {
            f(set_way_operand(way, way_shift, set, set_shift, level_bits));
        }
    }
}

/// `(way << way_shift) | (set << set_shift) | level_bits`
const fn set_way_operand(
    way: u32,
    way_shift: u32,
    set: u32,
    set_shift: u32,
    level_bits: u64,
) -> u64 {
    // A single-way cache has way_shift == 32 and way == 0.
    ((way as u64) << way_shift) | ((set as u64) << set_shift) | level_bits
}

/// Smallest `n` with `2^n >= value`; `0` for `value <= 1`.
const fn log2_ceil(value: u32) -> u32 {
    if value <= 1 {
        0
    } else {
        32 - (value - 1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boot_registers::{CacheType, Event, RecordingCpu};

    fn lines(cpu: &RecordingCpu) -> Vec<u64> {
        cpu.events()
            .iter()
            .map(|e| match e {
                Event::CacheLine(_, va) => va.as_u64(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect()
    }

    #[test]
    fn log2_ceil_rounds_up() {
        assert_eq!(log2_ceil(1), 0);
        assert_eq!(log2_ceil(2), 1);
        assert_eq!(log2_ceil(3), 2);
        assert_eq!(log2_ceil(4), 2);
        assert_eq!(log2_ceil(5), 3);
        assert_eq!(log2_ceil(16), 4);
    }

    #[test]
    fn range_covers_the_final_partial_line() {
        let mut cpu = RecordingCpu::new();
        range_op(&mut cpu, CacheLineOp::DcCvac, VirtualAddress::new(0x1000), 130);
        assert_eq!(lines(&cpu), [0x1000, 0x1040, 0x1080]);
    }

    #[test]
    fn zero_length_issues_nothing() {
        let mut cpu = RecordingCpu::new();
        range_op(&mut cpu, CacheLineOp::DcCivac, VirtualAddress::new(0x1000), 0);
        assert!(cpu.events().is_empty());
    }

    #[test]
    fn range_does_not_align_the_start() {
        let mut cpu = RecordingCpu::new();
        range_op(&mut cpu, CacheLineOp::IcIvau, VirtualAddress::new(0x1010), 64);
        assert_eq!(lines(&cpu), [0x1010]);
    }

    #[test]
    fn range_passes_the_operation_through() {
        let mut cpu = RecordingCpu::new();
        range_op(&mut cpu, CacheLineOp::DcZva, VirtualAddress::new(0), 1);
        assert_eq!(
            cpu.events(),
            [Event::CacheLine(CacheLineOp::DcZva, VirtualAddress::new(0))]
        );
    }

    #[test]
    fn wrapping_range_issues_nothing() {
        let mut cpu = RecordingCpu::new();
        range_op(&mut cpu, CacheLineOp::DcCvac, VirtualAddress::new(u64::MAX - 63), 4096);
        assert!(cpu.events().is_empty());
    }

    #[test]
    fn range_ending_just_below_the_top_stops_there() {
        let mut cpu = RecordingCpu::new();
        range_op(&mut cpu, CacheLineOp::DcCvac, VirtualAddress::new(u64::MAX - 127), 100);
        assert_eq!(lines(&cpu), [u64::MAX - 127, u64::MAX - 63]);
    }

    #[test]
    fn set_way_operands_for_a_small_cache() {
        let geometry = CcsidrEl1::from_geometry(64, 2, 2);
        let mut ops = Vec::new();
        for_each_set_way(&geometry, 2, |op| ops.push(op));
        assert_eq!(
            ops,
            [
                0b10,
                (1 << 6) | 0b10,
                (1 << 31) | 0b10,
                (1 << 31) | (1 << 6) | 0b10,
            ]
        );
    }

    #[test]
    fn non_power_of_two_ways_round_up() {
        let geometry = CcsidrEl1::from_geometry(64, 3, 1);
        let mut ops = Vec::new();
        for_each_set_way(&geometry, 1, |op| ops.push(op));
        assert_eq!(ops, [0, 1 << 30, 2 << 30]);
    }

    #[test]
    fn without_caches_only_the_final_barriers_remain() {
        let mut cpu = RecordingCpu::new();
        whole_cache_op(&mut cpu, SetWayOp::Clean);
        assert_eq!(
            cpu.events(),
            [
                Event::Read(boot_registers::SysReg::ClidrEl1),
                Event::Barrier(Barrier::DsbSy),
                Event::Barrier(Barrier::Isb),
            ]
        );
    }

    #[test]
    fn instruction_only_levels_are_skipped() {
        let mut cpu = RecordingCpu::new()
            .with_cache_level(1, CacheType::InstructionOnly, CcsidrEl1::from_geometry(64, 1, 1));
        whole_cache_op(&mut cpu, SetWayOp::Invalidate);
        assert!(!cpu
            .events()
            .iter()
            .any(|e| matches!(e, Event::SetWay(..))));
    }
}
