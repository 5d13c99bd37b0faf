use bitfield_struct::bitfield;

/// `CCSIDR_EL1` — Current Cache Size ID Register (32-bit format, without
/// `FEAT_CCIDX`).
///
/// Describes the cache selected by `CSSELR_EL1`. Every field is stored
/// biased; use the accessors below for the real geometry.
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct CcsidrEl1 {
    /// Bits 0–2 — LineSize: log2(bytes per line) - 4.
    #[bits(3)]
    pub line_size: u8,

    /// Bits 3–12 — Associativity: number of ways - 1.
    #[bits(10)]
    pub associativity: u16,

    /// Bits 13–27 — NumSets: number of sets - 1.
    #[bits(15)]
    pub num_sets: u16,

    /// Bits 28–31 — implementation defined / RES0.
    #[bits(4)]
    _bits_28_31: u8,

    /// Bits 32–63 — RES0.
    #[bits(32)]
    _res0_32_63: u32,
}

impl CcsidrEl1 {
    /// Build a description of a cache from its geometry.
    ///
    /// `line_bytes` must be a power of two in `16..=2048`.
    #[must_use]
    pub const fn from_geometry(line_bytes: u32, ways: u16, sets: u16) -> Self {
        debug_assert!(line_bytes.is_power_of_two() && line_bytes >= 16);
        debug_assert!(ways >= 1 && sets >= 1);
        Self::new()
            .with_line_size((line_bytes.trailing_zeros() - 4) as u8)
            .with_associativity(ways - 1)
            .with_num_sets(sets - 1)
    }

    /// log2 of the line length in bytes.
    #[must_use]
    pub const fn line_shift(self) -> u32 {
        self.line_size() as u32 + 4
    }

    /// Line length in bytes.
    #[must_use]
    pub const fn line_bytes(self) -> u32 {
        1 << self.line_shift()
    }

    /// Number of ways.
    #[must_use]
    pub const fn ways(self) -> u32 {
        self.associativity() as u32 + 1
    }

    /// Number of sets.
    #[must_use]
    pub const fn sets(self) -> u32 {
        self.num_sets() as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_is_unbiased() {
        let c = CcsidrEl1::from_geometry(64, 8, 256);
        assert_eq!(c.line_size(), 2);
        assert_eq!(c.associativity(), 7);
        assert_eq!(c.num_sets(), 255);
        assert_eq!(c.line_bytes(), 64);
        assert_eq!(c.line_shift(), 6);
        assert_eq!(c.ways(), 8);
        assert_eq!(c.sets(), 256);
    }
}
