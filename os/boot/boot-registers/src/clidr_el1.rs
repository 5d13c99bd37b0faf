use bitfield_struct::bitfield;

/// `CLIDR_EL1` — Cache Level ID Register.
///
/// Identifies the type of cache at each of up to seven levels and the
/// levels of coherence and unification.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct ClidrEl1 {
    /// Bits 0–20 — Ctype1..Ctype7, three bits per level.
    #[bits(21)]
    ctypes: u32,

    /// Bits 21–23 — LoUIS: level of unification, inner shareable.
    #[bits(3)]
    pub louis: u8,

    /// Bits 24–26 — LoC: level of coherence.
    #[bits(3)]
    pub loc: u8,

    /// Bits 27–29 — LoUU: level of unification, uniprocessor.
    #[bits(3)]
    pub louu: u8,

    /// Bits 30–32 — ICB: inner cache boundary.
    #[bits(3)]
    pub icb: u8,

    /// Bits 33–63.
    #[bits(31)]
    _bits_33_63: u32,
}

/// Cache type at one level, as encoded in `CLIDR_EL1.Ctype<n>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheType {
    NoCache,
    InstructionOnly,
    DataOnly,
    Separate,
    Unified,
}

impl CacheType {
    #[must_use]
    pub const fn from_encoding(value: u8) -> Self {
        match value & 0b111 {
            0b001 => Self::InstructionOnly,
            0b010 => Self::DataOnly,
            0b011 => Self::Separate,
            0b100 => Self::Unified,
            _ => Self::NoCache,
        }
    }

    #[must_use]
    pub const fn encoding(self) -> u8 {
        match self {
            Self::NoCache => 0b000,
            Self::InstructionOnly => 0b001,
            Self::DataOnly => 0b010,
            Self::Separate => 0b011,
            Self::Unified => 0b100,
        }
    }

    /// `true` if set/way data cache maintenance applies to this level.
    #[must_use]
    pub const fn has_data_cache(self) -> bool {
        matches!(self, Self::DataOnly | Self::Separate | Self::Unified)
    }
}

impl ClidrEl1 {
    /// Highest cache level that can be described.
    pub const MAX_LEVEL: u8 = 7;

    /// Cache type at 1-based `level` (`1..=7`).
    #[must_use]
    pub const fn cache_type(self, level: u8) -> CacheType {
        debug_assert!(level >= 1 && level <= Self::MAX_LEVEL);
        let shift = 3 * (level.saturating_sub(1) as u32);
        CacheType::from_encoding(((self.ctypes() >> shift) & 0b111) as u8)
    }

    /// Return a copy with the cache type at 1-based `level` replaced.
    #[must_use]
    pub const fn with_cache_type(self, level: u8, ty: CacheType) -> Self {
        debug_assert!(level >= 1 && level <= Self::MAX_LEVEL);
        let shift = 3 * (level.saturating_sub(1) as u32);
        let ctypes = (self.ctypes() & !(0b111 << shift)) | ((ty.encoding() as u32) << shift);
        self.with_ctypes(ctypes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_levels() {
        // L1 separate I/D, L2 unified, LoC = 2.
        let clidr = ClidrEl1::from_bits(0b100_011 | (2 << 24));
        assert_eq!(clidr.cache_type(1), CacheType::Separate);
        assert_eq!(clidr.cache_type(2), CacheType::Unified);
        assert_eq!(clidr.cache_type(3), CacheType::NoCache);
        assert_eq!(clidr.loc(), 2);
    }

    #[test]
    fn with_cache_type_sets_only_that_level() {
        let clidr = ClidrEl1::new()
            .with_cache_type(1, CacheType::Separate)
            .with_cache_type(3, CacheType::Unified);
        assert_eq!(clidr.into_bits(), 0b100_000_011);
        assert!(clidr.cache_type(1).has_data_cache());
        assert!(!clidr.cache_type(2).has_data_cache());
        assert!(!CacheType::InstructionOnly.has_data_cache());
    }
}
