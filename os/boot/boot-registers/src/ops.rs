//! The instruction vocabulary behind [`Cpu`](crate::Cpu): barriers and cache
//! maintenance operations.

use core::fmt;

/// Barrier instructions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Barrier {
    /// `dsb ishst`: stores complete, inner shareable domain.
    DsbIshSt,
    /// `dsb ish`: all accesses complete, inner shareable domain.
    DsbIsh,
    /// `dsb sy`: all accesses complete, full system.
    DsbSy,
    /// `isb`: flush the pipeline; context changes take effect.
    Isb,
}

/// Cache maintenance by virtual address, one line per instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheLineOp {
    /// `ic ivau`: invalidate instruction cache to the point of unification.
    IcIvau,
    /// `dc ivac`: invalidate data cache to the point of coherency.
    DcIvac,
    /// `dc zva`: zero a block of memory.
    DcZva,
    /// `dc cvac`: clean data cache to the point of coherency.
    DcCvac,
    /// `dc cvau`: clean data cache to the point of unification.
    DcCvau,
    /// `dc civac`: clean and invalidate data cache to the point of coherency.
    DcCivac,
}

/// Data cache maintenance by set/way.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SetWayOp {
    /// `dc isw`: invalidate.
    Invalidate = 0,
    /// `dc cisw`: clean and invalidate.
    CleanInvalidate = 1,
    /// `dc csw`: clean.
    Clean = 2,
}

impl Barrier {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::DsbIshSt => "dsb ishst",
            Self::DsbIsh => "dsb ish",
            Self::DsbSy => "dsb sy",
            Self::Isb => "isb",
        }
    }
}

impl CacheLineOp {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::IcIvau => "ic ivau",
            Self::DcIvac => "dc ivac",
            Self::DcZva => "dc zva",
            Self::DcCvac => "dc cvac",
            Self::DcCvau => "dc cvau",
            Self::DcCivac => "dc civac",
        }
    }
}

impl SetWayOp {
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Invalidate => "dc isw",
            Self::CleanInvalidate => "dc cisw",
            Self::Clean => "dc csw",
        }
    }
}

impl fmt::Display for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for CacheLineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for SetWayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
