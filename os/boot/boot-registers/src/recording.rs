//! A [`Cpu`] that runs anywhere: registers live in memory and every
//! intrinsic is appended to an event log.

use crate::{
    Barrier, CacheLineOp, CacheType, CcsidrEl1, ClidrEl1, Cpu, CsselrEl1, SetWayOp, SysReg,
};
use alloc::vec::Vec;
use boot_memory_addresses::VirtualAddress;

/// One intrinsic as observed by [`RecordingCpu`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Read(SysReg),
    Write(SysReg, u64),
    Barrier(Barrier),
    TlbInvalidateAll,
    CacheLine(CacheLineOp, VirtualAddress),
    SetWay(SetWayOp, u64),
}

/// An in-memory register file with an instruction log.
///
/// `CCSIDR_EL1` is not stored directly; reading it returns the geometry
/// registered for the level currently selected in `CSSELR_EL1`, the way the
/// hardware does.
#[derive(Debug, Clone)]
pub struct RecordingCpu {
    registers: [u64; SysReg::COUNT],
    caches: [CcsidrEl1; ClidrEl1::MAX_LEVEL as usize],
    events: Vec<Event>,
}

impl Default for RecordingCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCpu {
    /// All registers zero, no caches, empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registers: [0; SysReg::COUNT],
            caches: [CcsidrEl1::new(); ClidrEl1::MAX_LEVEL as usize],
            events: Vec::new(),
        }
    }

    /// Preset a register without recording an event.
    #[must_use]
    pub fn with_register(mut self, reg: SysReg, value: u64) -> Self {
        self.registers[reg.index()] = value;
        self
    }

    /// Describe the cache at 1-based `level` and raise the level of
    /// coherence to include it.
    #[must_use]
    pub fn with_cache_level(mut self, level: u8, ty: CacheType, geometry: CcsidrEl1) -> Self {
        assert!((1..=ClidrEl1::MAX_LEVEL).contains(&level), "cache level out of range");
        let clidr = ClidrEl1::from_bits(self.registers[SysReg::ClidrEl1.index()]);
        let clidr = clidr.with_cache_type(level, ty);
        let clidr = clidr.with_loc(clidr.loc().max(level));
        self.registers[SysReg::ClidrEl1.index()] = clidr.into_bits();
        self.caches[usize::from(level - 1)] = geometry;
        self
    }

    /// Current value of `reg`, without recording an event.
    #[must_use]
    pub fn register(&self, reg: SysReg) -> u64 {
        match reg {
            SysReg::CcsidrEl1 => self.selected_cache().into_bits(),
            _ => self.registers[reg.index()],
        }
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the log.
    pub fn take_events(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.events)
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    fn selected_cache(&self) -> CcsidrEl1 {
        let selected = CsselrEl1::from_bits(self.registers[SysReg::CsselrEl1.index()]);
        self.caches
            .get(usize::from(selected.level()))
            .copied()
            .unwrap_or_default()
    }
}

impl Cpu for RecordingCpu {
    fn read_raw(&mut self, reg: SysReg) -> u64 {
        self.events.push(Event::Read(reg));
        self.register(reg)
    }

    fn write_raw(&mut self, reg: SysReg, value: u64) {
        assert!(reg.is_writable(), "write to read-only register {}", reg.name());
        self.events.push(Event::Write(reg, value));
        self.registers[reg.index()] = value;
    }

    fn barrier(&mut self, barrier: Barrier) {
        self.events.push(Event::Barrier(barrier));
    }

    fn tlb_invalidate_all(&mut self) {
        self.events.push(Event::TlbInvalidateAll);
    }

    fn cache_line(&mut self, op: CacheLineOp, address: VirtualAddress) {
        self.events.push(Event::CacheLine(op, address));
    }

    fn cache_set_way(&mut self, op: SetWayOp, operand: u64) {
        self.events.push(Event::SetWay(op, operand));
    }
}
